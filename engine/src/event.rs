//! The wire-level event model: the envelope common to every event and
//! the four event variants a [`crate::game_state::GameState`] folds.

use crate::board::{BoardSettings, BoardWords};
use serde::{Deserialize, Serialize};

/// The full set of events a game's reducer understands, tagged by
/// `name` with the variant's fields nested under `params` — matching
/// the on-the-wire event schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", content = "params", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    /// Creates the board and the player roster. Must be the first
    /// event applied to a game, at sequence 1.
    GameInit(GameInitParams),
    /// Sets the turn pointer, starting the game.
    GameStart(GameStartParams),
    /// Draws letters from the pool into a player's hand.
    PlayerAddLetters(PlayerAddLettersParams),
    /// A player's placement (and optional exchange) for their turn.
    PlayerMove(PlayerMoveParams),
}

/// An event together with its envelope fields. Serializes with
/// `payload`'s tag/content flattened alongside `sequence`, `game_id`
/// and `timestamp`, producing
/// `{"name":..,"timestamp":..,"sequence":..,"game_id":..,"params":{..}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// The per-game sequence number, starting at 1 and contiguous.
    pub sequence: u64,
    /// The game this event belongs to.
    pub game_id: u64,
    /// Unix timestamp (seconds) the event was created.
    pub timestamp: i64,
    /// The tagged event body.
    #[serde(flatten)]
    pub payload: EventPayload,
}
impl Event {
    /// Builds a new event with the given envelope fields.
    pub fn new(sequence: u64, game_id: u64, timestamp: i64, payload: EventPayload) -> Self {
        Self {
            sequence,
            game_id,
            timestamp,
            payload,
        }
    }
}

/// Parameters for [`EventPayload::GameInit`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInitParams {
    /// Usernames in turn order.
    pub players: Vec<String>,
    /// The board's fixed settings.
    pub board_settings: BoardSettings,
    /// The full initial letter pool, already shuffled.
    pub letters: Vec<char>,
}

/// Parameters for [`EventPayload::GameStart`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStartParams {
    /// The player to move first; defaults to the first player in
    /// turn order when absent.
    pub player_to_start: Option<String>,
}

/// Parameters for [`EventPayload::PlayerAddLetters`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerAddLettersParams {
    /// The player receiving letters.
    pub player: String,
    /// The letters drawn from the pool, in draw order.
    pub letters: Vec<char>,
}

/// Parameters for [`EventPayload::PlayerMove`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerMoveParams {
    /// The player making the move.
    pub player: String,
    /// The candidate words placed this turn.
    pub words: BoardWords,
    /// Letters the player discards back to the pool this turn, in
    /// addition to whatever the placement consumed.
    #[serde(default)]
    pub exchange_letters: Vec<char>,
}
