//! The weighted letter bag a game draws its tiles from.

use crate::error::{EngineError, EngineResult};
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// The conventional English letter frequency table used as the
/// default distribution when a game does not supply its own.
/// Weights are relative, not percentages; only their ratios matter.
pub const DEFAULT_DISTRIBUTION: &[(char, u32)] = &[
    ('a', 8), ('b', 2), ('c', 3), ('d', 4), ('e', 13),
    ('f', 2), ('g', 2), ('h', 6), ('i', 7), ('j', 1),
    ('k', 1), ('l', 4), ('m', 2), ('n', 7), ('o', 8),
    ('p', 2), ('q', 1), ('r', 6), ('s', 6), ('t', 9),
    ('u', 3), ('v', 1), ('w', 2), ('x', 1), ('y', 2), ('z', 1),
];

/// A finite, shuffled multiset of letters a game draws from. Unlike a
/// classic Scrabble bag there is no fixed 27-tile distribution: the
/// bag is built from any weighted distribution and a target size.
#[derive(Debug, Clone, Default)]
pub struct LetterBag {
    letters: Vec<char>,
}
impl LetterBag {
    /// Builds a bag of exactly `letters_count` letters from
    /// `distribution`, a map of letter to relative weight. Every
    /// letter in `distribution` is seeded at least once, the
    /// remainder is filled proportionally to weight, and any letters
    /// still missing to reach `letters_count` are taken from the
    /// heaviest-weighted letters first. The result is shuffled once.
    ///
    /// Fails if `distribution` is empty, any weight is zero, or
    /// `letters_count` is smaller than the number of distinct letters.
    pub fn new(letters_count: usize, distribution: &HashMap<char, u32>) -> EngineResult<Self> {
        if distribution.is_empty() || distribution.values().any(|&w| w == 0) {
            return Err(EngineError::InvalidDistribution);
        }
        if letters_count < distribution.len() {
            return Err(EngineError::InvalidDistribution);
        }

        // Each letter occurs at least once.
        let mut letters: Vec<char> = distribution.keys().copied().collect();

        let remaining = letters_count - letters.len();
        let total_weight: u32 = distribution.values().sum();
        for (&letter, &weight) in distribution {
            let share = (remaining as f64 * weight as f64 / total_weight as f64).round() as usize;
            for _ in 0..share {
                letters.push(letter);
            }
        }

        let missing = letters_count.saturating_sub(letters.len());
        let mut by_weight: Vec<(char, u32)> = distribution.iter().map(|(&l, &w)| (l, w)).collect();
        by_weight.sort_by(|a, b| b.1.cmp(&a.1));
        for &(letter, _) in by_weight.iter().take(missing) {
            letters.push(letter);
        }

        letters.shuffle(&mut rand::thread_rng());

        Ok(Self { letters })
    }

    /// Builds a bag directly from an already-determined ordered list
    /// of letters, for example when replaying a `GameInit` event
    /// whose `letters` field is the full, already-shuffled bag.
    pub fn from_letters(letters: Vec<char>) -> Self {
        Self { letters }
    }

    /// The number of letters remaining in the bag.
    pub fn len(&self) -> usize {
        self.letters.len()
    }
    /// Whether the bag has no letters left.
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
    /// The letters currently in the bag, in draw order (front first).
    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    /// Draws up to `count` letters from the front of the bag,
    /// removing them. Returns fewer than `count` if the bag runs out.
    pub fn draw_many(&mut self, count: usize) -> Vec<char> {
        let take = count.min(self.letters.len());
        self.letters.drain(..take).collect()
    }

    /// Removes a single occurrence of `letter` from the bag.
    pub fn remove(&mut self, letter: char) -> EngineResult<()> {
        let idx = self
            .letters
            .iter()
            .position(|&c| c == letter)
            .ok_or(EngineError::LetterNotAvailable(letter))?;
        self.letters.remove(idx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distribution() -> HashMap<char, u32> {
        DEFAULT_DISTRIBUTION.iter().copied().collect()
    }

    #[test]
    fn every_letter_present_at_least_once() {
        let bag = LetterBag::new(200, &distribution()).unwrap();
        for (letter, _) in DEFAULT_DISTRIBUTION {
            assert!(bag.letters().contains(letter));
        }
    }

    #[test]
    fn exact_size() {
        let bag = LetterBag::new(150, &distribution()).unwrap();
        assert_eq!(bag.len(), 150);
    }

    #[test]
    fn too_small_for_alphabet_rejected() {
        assert!(LetterBag::new(5, &distribution()).is_err());
    }

    #[test]
    fn draw_many_drains_front_and_caps_at_remaining() {
        let mut bag = LetterBag::from_letters(vec!['a', 'b', 'c']);
        let drawn = bag.draw_many(2);
        assert_eq!(drawn, vec!['a', 'b']);
        assert_eq!(bag.len(), 1);

        let drawn = bag.draw_many(5);
        assert_eq!(drawn, vec!['c']);
        assert!(bag.is_empty());
    }

    #[test]
    fn remove_missing_letter_errors() {
        let mut bag = LetterBag::from_letters(vec!['a', 'b']);
        assert!(bag.remove('z').is_err());
        assert!(bag.remove('a').is_ok());
        assert_eq!(bag.len(), 1);
    }
}
