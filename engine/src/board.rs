//! Geometric data structures for words placed on the board: paths,
//! intersections, placement legality and scoring with bonus tiles.

use crate::{
    error::{EngineError, EngineResult},
    pos::{Direction, Pos},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The minimum board width accepted by [`BoardSettings`].
pub const MIN_BOARD_WIDTH: u32 = 3;
/// The minimum board height accepted by [`BoardSettings`].
pub const MIN_BOARD_HEIGHT: u32 = 3;

/// A board square whose word-score multiplier is greater than one.
/// Multiple bonuses covered by a single word sum additively rather
/// than multiplying, and are never consumed by being played on
/// (spec §4.1, §9 — a deliberate simplification from classic Scrabble).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bonus {
    /// Column of the bonus square.
    pub x: i64,
    /// Row of the bonus square.
    pub y: i64,
    /// The multiplier contributed when a word covers this square.
    /// Must be at least 1; only values greater than 1 are counted.
    pub multiplier: u32,
}
impl Bonus {
    /// The position of the bonus.
    pub fn pos(&self) -> Pos {
        Pos::new(self.x, self.y)
    }
}

/// The fixed parameters of a board: its dimensions, an optional word
/// placed at creation time, and the bonus squares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSettings {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// A word placed on the board before any player moves, if any.
    pub init_word: Option<BoardWord>,
    /// Bonus squares.
    #[serde(default)]
    pub bonuses: Vec<Bonus>,
}
impl BoardSettings {
    /// Validates the settings: dimensions meet the minimums, every
    /// bonus lies in-bounds, and the initial word (if any) fits on
    /// the board.
    pub fn validate(&self) -> EngineResult<()> {
        if self.width < MIN_BOARD_WIDTH || self.height < MIN_BOARD_HEIGHT {
            return Err(EngineError::OutOfBounds);
        }
        for bonus in &self.bonuses {
            if !bonus.pos().in_bounds(self.width, self.height) {
                return Err(EngineError::OutOfBounds);
            }
        }
        if let Some(word) = &self.init_word {
            for pos in word.path() {
                if !pos.in_bounds(self.width, self.height) {
                    return Err(EngineError::OutOfBounds);
                }
            }
        }
        Ok(())
    }
}

/// A single word placed (or proposed to be placed) on the board.
/// Flattens its start position into `start_x`/`start_y` on the wire,
/// matching the documented move-submission shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardWord {
    /// The letters of the word, left-to-right or top-to-bottom
    /// depending on `direction`. Must be non-empty.
    pub word: String,
    /// Column of the word's first letter.
    pub start_x: i64,
    /// Row of the word's first letter.
    pub start_y: i64,
    /// The direction the word reads in.
    pub direction: Direction,
}
impl BoardWord {
    /// Creates a new `BoardWord`.
    pub fn new(word: impl Into<String>, start: Pos, direction: Direction) -> Self {
        Self {
            word: word.into(),
            start_x: start.x,
            start_y: start.y,
            direction,
        }
    }
    /// The position of the word's first letter.
    pub fn start(&self) -> Pos {
        Pos::new(self.start_x, self.start_y)
    }
    /// The ordered sequence of positions the word occupies.
    pub fn path(&self) -> Vec<Pos> {
        let mut pos = self.start();
        let mut path = Vec::with_capacity(self.word.chars().count());
        for _ in self.word.chars() {
            path.push(pos);
            pos = pos.step(self.direction);
        }
        path
    }
    /// The letter this word places at `pos`, if `pos` lies on its path.
    pub fn letter_at(&self, pos: Pos) -> Option<char> {
        let start = self.start();
        let offset = match self.direction {
            Direction::Right => {
                if pos.y != start.y {
                    return None;
                }
                pos.x - start.x
            }
            Direction::Down => {
                if pos.x != start.x {
                    return None;
                }
                pos.y - start.y
            }
        };
        if offset < 0 {
            return None;
        }
        self.word.chars().nth(offset as usize)
    }
    /// Whether `self` and `other` share at least one position.
    pub fn intersects(&self, other: &BoardWord) -> EngineResult<bool> {
        Ok(!self.intersection(other)?.is_empty())
    }
    /// The set of positions shared by `self` and `other`. Fails if any
    /// shared position carries a different letter in each word.
    pub fn intersection(&self, other: &BoardWord) -> EngineResult<HashSet<Pos>> {
        self.validate_intersection(other)?;
        Ok(self.raw_intersection(other))
    }
    fn raw_intersection(&self, other: &BoardWord) -> HashSet<Pos> {
        let a: HashSet<Pos> = self.path().into_iter().collect();
        let b: HashSet<Pos> = other.path().into_iter().collect();
        a.intersection(&b).copied().collect()
    }
    /// Checks that every position shared with `other` carries the same
    /// letter in both words.
    pub fn validate_intersection(&self, other: &BoardWord) -> EngineResult<()> {
        for pos in self.raw_intersection(other) {
            if self.letter_at(pos) != other.letter_at(pos) {
                return Err(EngineError::WordIntersection(format!(
                    "words disagree on the letter at {pos}"
                )));
            }
        }
        Ok(())
    }
}

/// An ordered collection of [`BoardWord`]s with the invariant that any
/// two members sharing a position agree on its letter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardWords {
    /// The member words, in insertion order.
    pub words: Vec<BoardWord>,
}
impl BoardWords {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }
    /// Number of member words.
    pub fn len(&self) -> usize {
        self.words.len()
    }
    /// Whether the collection has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
    /// Iterates over the member words.
    pub fn iter(&self) -> impl Iterator<Item = &BoardWord> {
        self.words.iter()
    }
    /// Adds `word`, re-validating it against every existing member.
    pub fn add_word(&mut self, word: BoardWord) -> EngineResult<()> {
        for existing in &self.words {
            existing.validate_intersection(&word)?;
        }
        self.words.push(word);
        Ok(())
    }
    /// The letter at `pos`, agreeing across every member that covers it.
    pub fn letter_at(&self, pos: Pos) -> Option<char> {
        self.words.iter().find_map(|w| w.letter_at(pos))
    }
    /// The union of every member word's path.
    pub fn positions(&self) -> HashSet<Pos> {
        self.words.iter().flat_map(|w| w.path()).collect()
    }
    /// Whether `word` shares a position with any member.
    pub fn intersects(&self, word: &BoardWord) -> EngineResult<bool> {
        Ok(!self.intersection(word)?.is_empty())
    }
    /// The union, across every member, of positions shared with `word`.
    pub fn intersection(&self, word: &BoardWord) -> EngineResult<HashSet<Pos>> {
        let mut out = HashSet::new();
        for existing in &self.words {
            out.extend(existing.intersection(word)?);
        }
        Ok(out)
    }
}

/// The mutable board: settings plus the accumulated words and the
/// multiplier map derived from the settings' bonuses.
#[derive(Debug, Clone)]
pub struct Board {
    settings: BoardSettings,
    words: BoardWords,
    multipliers: HashMap<Pos, u32>,
}
impl Board {
    /// Builds a fresh board from `settings`, applying `init_word` if
    /// present. Fails if the settings are invalid.
    pub fn new(settings: BoardSettings) -> EngineResult<Self> {
        settings.validate()?;

        let mut multipliers = HashMap::new();
        for bonus in &settings.bonuses {
            multipliers.insert(bonus.pos(), bonus.multiplier);
        }

        let init_word = settings.init_word.clone();
        let mut board = Self {
            settings,
            words: BoardWords::new(),
            multipliers,
        };

        if let Some(word) = init_word {
            board.words.add_word(word)?;
        }

        Ok(board)
    }
    /// The board's settings.
    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }
    /// The words currently on the board.
    pub fn words(&self) -> &BoardWords {
        &self.words
    }
    /// The letter at `pos`, if any word covers it.
    pub fn letter_at(&self, pos: Pos) -> Option<char> {
        self.words.letter_at(pos)
    }

    /// Validates that `word` can be inserted on its own: in bounds,
    /// consistent with any existing letters it overlaps, and not
    /// wholly redundant (spec §4.1 rules 1-3).
    fn validate_single(&self, word: &BoardWord) -> EngineResult<()> {
        let mut has_new_letter = false;

        for pos in word.path() {
            if !pos.in_bounds(self.settings.width, self.settings.height) {
                return Err(EngineError::OutOfBounds);
            }

            match self.words.letter_at(pos) {
                Some(existing) => {
                    let new_letter = word.letter_at(pos);
                    if Some(existing) != new_letter {
                        return Err(EngineError::WordIntersection(format!(
                            "existing letter '{existing}' at {pos} conflicts with new word"
                        )));
                    }
                }
                None => has_new_letter = true,
            }
        }

        if !has_new_letter {
            return Err(EngineError::WordIntersection(
                "word consists purely of existing letters".into(),
            ));
        }

        Ok(())
    }

    /// The multiset of letters at positions `words` introduces that are
    /// not already on the board — what the moving player must spend.
    pub fn get_letters_to_insert_words(&self, words: &BoardWords) -> Vec<char> {
        let existing = self.words.positions();
        let mut new_positions: Vec<Pos> = words
            .positions()
            .into_iter()
            .filter(|p| !existing.contains(p))
            .collect();
        // Deterministic order makes the resulting letter multiset
        // reproducible for tests and logs.
        new_positions.sort();

        new_positions
            .into_iter()
            .filter_map(|p| words.letter_at(p))
            .collect()
    }

    /// The total word score contributed by placing `word`: its length
    /// times the sum of bonus multipliers (> 1) it covers, defaulting
    /// to 1 if it covers none.
    fn word_score(&self, word: &BoardWord) -> usize {
        let mut total_multiplier = 0u32;
        for pos in word.path() {
            if let Some(&m) = self.multipliers.get(&pos) {
                if m > 1 {
                    total_multiplier += m;
                }
            }
        }
        let total_multiplier = total_multiplier.max(1) as usize;
        word.word.chars().count() * total_multiplier
    }

    /// Inserts a single word, rule 4 included: it must intersect an
    /// existing word unless the board is currently empty.
    fn insert_word(&mut self, word: BoardWord) -> EngineResult<usize> {
        if !self.words.is_empty() && !self.words.intersects(&word)? {
            return Err(EngineError::MustIntersect);
        }

        self.validate_single(&word)?;
        let score = self.word_score(&word);
        self.words.add_word(word)?;

        Ok(score)
    }

    /// Places every word in `candidates` atomically (spec §4.1
    /// "insert_words"). If the board is empty, places the first
    /// candidate, then repeatedly places any remaining candidate that
    /// intersects the board so far; fails if some candidate never
    /// becomes reachable. Order among otherwise-eligible candidates
    /// does not affect the final state or total score.
    ///
    /// The whole placement is staged against a scratch clone of the
    /// board first; `self` is only updated once every candidate is
    /// confirmed placeable, so a rejected move never leaves partial
    /// words behind.
    pub fn insert_words(&mut self, candidates: &BoardWords) -> EngineResult<usize> {
        // All candidates must be pairwise letter-consistent on their
        // own intersections before any of them touch the board.
        for (i, a) in candidates.iter().enumerate() {
            for b in candidates.iter().skip(i + 1) {
                a.validate_intersection(b)?;
            }
        }

        let mut scratch = self.clone();
        let mut remaining: Vec<&BoardWord> = candidates.iter().collect();
        let mut total_score = 0;

        while let Some(idx) = scratch.next_placeable(&remaining) {
            let word = remaining.remove(idx);
            total_score += scratch.insert_word(word.clone())?;
        }

        if !remaining.is_empty() {
            return Err(EngineError::CannotOrderPlacement);
        }

        self.words = scratch.words;
        Ok(total_score)
    }

    /// Picks the index of the next candidate in `remaining` that can
    /// be placed given the board's current contents: any word if the
    /// board is empty, otherwise one that intersects the board.
    fn next_placeable(&self, remaining: &[&BoardWord]) -> Option<usize> {
        if remaining.is_empty() {
            return None;
        }
        if self.words.is_empty() {
            return Some(0);
        }
        remaining
            .iter()
            .position(|w| self.words.intersects(w).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str, x: i64, y: i64, dir: Direction) -> BoardWord {
        BoardWord::new(s, Pos::new(x, y), dir)
    }

    #[test]
    fn path_and_letter_at() {
        let w = word("cat", 2, 3, Direction::Right);
        assert_eq!(
            w.path(),
            vec![Pos::new(2, 3), Pos::new(3, 3), Pos::new(4, 3)]
        );
        assert_eq!(w.letter_at(Pos::new(3, 3)), Some('a'));
        assert_eq!(w.letter_at(Pos::new(5, 3)), None);
    }

    #[test]
    fn intersection_symmetry() {
        let a = word("cat", 0, 0, Direction::Right);
        let b = word("cob", 0, 0, Direction::Down);
        assert_eq!(a.intersects(&b).unwrap(), b.intersects(&a).unwrap());
        assert_eq!(a.intersection(&b).unwrap(), b.intersection(&a).unwrap());
    }

    #[test]
    fn conflicting_intersection_errors() {
        let a = word("cat", 0, 0, Direction::Right);
        let b = word("dog", 0, 0, Direction::Down); // shares (0,0): 'c' vs 'd'
        assert!(a.intersection(&b).is_err());
    }

    #[test]
    fn first_word_does_not_need_intersection() {
        let settings = BoardSettings {
            width: 10,
            height: 10,
            init_word: None,
            bonuses: vec![],
        };
        let mut board = Board::new(settings).unwrap();
        let score = board.insert_word(word("cat", 0, 0, Direction::Right)).unwrap();
        assert_eq!(score, 3);
    }

    #[test]
    fn touching_at_one_letter_is_accepted() {
        let settings = BoardSettings {
            width: 10,
            height: 10,
            init_word: None,
            bonuses: vec![],
        };
        let mut board = Board::new(settings).unwrap();
        board.insert_word(word("cat", 0, 0, Direction::Right)).unwrap();
        // "tan" starting at (2,0) going down shares only (2,0)='t'.
        let score = board.insert_word(word("tan", 2, 0, Direction::Down)).unwrap();
        assert_eq!(score, 3);
    }

    #[test]
    fn wholly_redundant_word_rejected() {
        let settings = BoardSettings {
            width: 10,
            height: 10,
            init_word: None,
            bonuses: vec![],
        };
        let mut board = Board::new(settings).unwrap();
        board.insert_word(word("cat", 0, 0, Direction::Right)).unwrap();
        assert!(board.insert_word(word("cat", 0, 0, Direction::Right)).is_err());
    }

    #[test]
    fn non_intersecting_second_word_rejected() {
        let settings = BoardSettings {
            width: 10,
            height: 10,
            init_word: None,
            bonuses: vec![],
        };
        let mut board = Board::new(settings).unwrap();
        board.insert_word(word("cat", 0, 0, Direction::Right)).unwrap();
        assert!(board.insert_word(word("dog", 5, 5, Direction::Right)).is_err());
    }

    #[test]
    fn bonuses_sum_and_do_not_consume() {
        let settings = BoardSettings {
            width: 100,
            height: 100,
            init_word: None,
            bonuses: vec![
                Bonus { x: 10, y: 10, multiplier: 2 },
                Bonus { x: 12, y: 10, multiplier: 3 },
            ],
        };
        let mut board = Board::new(settings).unwrap();

        // S2 from the spec.
        let score1 = board
            .insert_word(word("abacaba", 10, 10, Direction::Down))
            .unwrap();
        assert_eq!(score1, 7 * 2);

        let score2 = board
            .insert_word(word("abracadabra", 10, 10, Direction::Right))
            .unwrap();
        assert_eq!(score2, 11 * (2 + 3));

        // Playing through (10,10) again would still see the bonus
        // (not exercised as a move here, but the map itself is untouched).
        assert_eq!(board.multipliers.get(&Pos::new(10, 10)), Some(&2));
    }

    #[test]
    fn insert_words_atomic_opening() {
        // S1 from the spec: two separate single-word moves score 7 and 11.
        let settings = BoardSettings {
            width: 100,
            height: 100,
            init_word: None,
            bonuses: vec![],
        };
        let mut board = Board::new(settings).unwrap();
        let mut words = BoardWords::new();
        words.add_word(word("abacaba", 10, 10, Direction::Right)).unwrap();
        let score = board.insert_words(&words).unwrap();
        assert_eq!(score, 7);

        let mut words2 = BoardWords::new();
        words2.add_word(word("abracadabra", 10, 10, Direction::Down)).unwrap();
        let score2 = board.insert_words(&words2).unwrap();
        assert_eq!(score2, 11);
    }

    #[test]
    fn board_word_serializes_with_flat_start_fields() {
        let w = word("cat", 9, 10, Direction::Right);
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["start_x"], 9);
        assert_eq!(json["start_y"], 10);
        assert!(json.get("start").is_none());
    }

    #[test]
    fn insert_words_rejects_unorderable_batch_without_mutating_board() {
        // A and B intersect and would place fine; C never touches
        // either, so the whole batch must be rejected with the board
        // left exactly as it was.
        let settings = BoardSettings {
            width: 100,
            height: 100,
            init_word: None,
            bonuses: vec![],
        };
        let mut board = Board::new(settings).unwrap();

        let mut candidates = BoardWords::new();
        candidates.add_word(word("cat", 0, 0, Direction::Right)).unwrap();
        candidates.add_word(word("tan", 2, 0, Direction::Down)).unwrap();
        candidates.add_word(word("dog", 50, 50, Direction::Right)).unwrap();

        assert!(matches!(
            board.insert_words(&candidates),
            Err(EngineError::CannotOrderPlacement)
        ));
        assert!(board.words().is_empty());
        assert_eq!(board.letter_at(Pos::new(0, 0)), None);
    }

    #[test]
    fn get_letters_to_insert_excludes_existing() {
        let settings = BoardSettings {
            width: 10,
            height: 10,
            init_word: None,
            bonuses: vec![],
        };
        let mut board = Board::new(settings).unwrap();
        board.insert_word(word("cat", 0, 0, Direction::Right)).unwrap();

        let mut candidate = BoardWords::new();
        candidate.add_word(word("tan", 2, 0, Direction::Down)).unwrap();

        let mut letters = board.get_letters_to_insert_words(&candidate);
        letters.sort();
        // 't' at (2,0) is already on the board; 'a' and 'n' are new.
        assert_eq!(letters, vec!['a', 'n']);
    }
}
