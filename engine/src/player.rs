//! A player's hand and score.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// The number of letters a player's hand holds once fulfilled.
pub const PLAYER_MAX_LETTERS: usize = 7;

/// A player's username, hand and running score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Player {
    /// The player's username, unique within a game.
    pub username: String,
    /// The player's current score. Never allowed to go negative.
    pub score: i64,
    /// The letters currently in the player's hand.
    pub letters: Vec<char>,
}
impl Player {
    /// Creates a new player with an empty hand and zero score.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            score: 0,
            letters: Vec::new(),
        }
    }

    /// Extends the hand with `letters`. Fails unless the resulting
    /// hand is exactly [`PLAYER_MAX_LETTERS`] letters.
    pub fn fulfil_letters(&mut self, letters: &[char]) -> EngineResult<()> {
        if self.letters.len() + letters.len() != PLAYER_MAX_LETTERS {
            return Err(EngineError::WrongRefillCount);
        }
        self.letters.extend(letters);
        Ok(())
    }

    /// Removes each of `letters` from the hand, one occurrence per
    /// entry. Fails if any letter is not present in the hand (checked
    /// against the hand as it stood before this call, not
    /// incrementally, so playing two of the same tile the hand holds
    /// twice succeeds).
    pub fn play_letters(&mut self, letters: &[char]) -> EngineResult<()> {
        let mut remaining = self.letters.clone();
        for &letter in letters {
            let idx = remaining
                .iter()
                .position(|&c| c == letter)
                .ok_or(EngineError::LetterNotAvailable(letter))?;
            remaining.remove(idx);
        }
        self.letters = remaining;
        Ok(())
    }

    /// Adds `delta` to the score. Fails if the result would be negative.
    pub fn add_score(&mut self, delta: i64) -> EngineResult<()> {
        if self.score + delta < 0 {
            return Err(EngineError::NotEnoughLetters);
        }
        self.score += delta;
        Ok(())
    }
}
