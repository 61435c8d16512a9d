//! The error and result types for the engine.

use std::{error::Error, fmt};

/// The [`Result`] type for the engine.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// The error type produced by the board, letter bag, player and
/// reducer when a client-supplied value or event cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A bonus, word path or board settings field referred to a
    /// position outside the board.
    OutOfBounds,
    /// Two words (or a word and the existing board) disagree about
    /// the letter at a shared position.
    WordIntersection(String),
    /// A word was inserted that shares no position with any word
    /// already on the board (or, for the very first word, is
    /// already covered entirely by existing letters).
    MustIntersect,
    /// A multi-word placement could not be ordered so that every
    /// candidate eventually touches the board.
    CannotOrderPlacement,
    /// A letter was requested to be removed from a bag or hand that
    /// did not contain it.
    LetterNotAvailable(char),
    /// The letter bag does not contain enough letters for the request.
    NotEnoughLetters,
    /// `PlayerAddLetters` would not bring the hand to exactly
    /// [`crate::player::PLAYER_MAX_LETTERS`] letters.
    WrongRefillCount,
    /// An event's `game_id` does not match the state being folded.
    WrongGame,
    /// An event's `sequence` is not `last_sequence + 1`.
    OutOfSequence {
        /// The sequence number the reducer expected next.
        expected: u64,
        /// The sequence number the event actually carried.
        got: u64,
    },
    /// The event name was not recognised during load or dispatch.
    UnknownEvent,
    /// A `GameInit` was applied twice.
    AlreadyInitialised,
    /// An event was applied before the board exists.
    GameNotInitialised,
    /// `GameStart` named a player not present in the game.
    UnknownPlayer,
    /// A move or start was attempted before the game has a turn order.
    GameNotStarted,
    /// `PlayerMove` was submitted by a player whose turn it is not.
    NotYourTurn,
    /// The letter distribution for a new bag was empty or malformed.
    InvalidDistribution,
    /// No persisted events exist for the requested game id.
    GameNotFound,
    /// The event store could not read or write its backing file.
    Io(String),
    /// The persisted event list failed to parse or to replay cleanly.
    CorruptEventLog(String),
}

impl Error for EngineError {}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::OutOfBounds => write!(f, "position is outside the board"),
            EngineError::WordIntersection(msg) => write!(f, "word intersection error: {msg}"),
            EngineError::MustIntersect => {
                write!(f, "a new word must intersect an existing word on the board")
            }
            EngineError::CannotOrderPlacement => write!(
                f,
                "candidate words could not all be placed: some never touch the board"
            ),
            EngineError::LetterNotAvailable(c) => write!(f, "letter '{c}' is not available"),
            EngineError::NotEnoughLetters => write!(f, "not enough letters remain in the bag"),
            EngineError::WrongRefillCount => {
                write!(f, "refill would not bring the hand to exactly 7 letters")
            }
            EngineError::WrongGame => write!(f, "event belongs to a different game"),
            EngineError::OutOfSequence { expected, got } => {
                write!(f, "expected sequence {expected}, got {got}")
            }
            EngineError::UnknownEvent => write!(f, "unknown event name"),
            EngineError::AlreadyInitialised => write!(f, "game has already been initialised"),
            EngineError::GameNotInitialised => write!(f, "game has not been initialised"),
            EngineError::UnknownPlayer => write!(f, "unknown player"),
            EngineError::GameNotStarted => write!(f, "game has not started"),
            EngineError::NotYourTurn => write!(f, "it is not this player's turn"),
            EngineError::InvalidDistribution => write!(f, "letter distribution is invalid"),
            EngineError::GameNotFound => write!(f, "cannot find the game"),
            EngineError::Io(msg) => write!(f, "io error: {msg}"),
            EngineError::CorruptEventLog(msg) => write!(f, "corrupt event log: {msg}"),
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::CorruptEventLog(err.to_string())
    }
}
