//! The server engine: orchestrates game lifecycle commands, drives
//! the reducer, and emits the bookkeeping events (letter refills)
//! that keep a hand at exactly [`PLAYER_MAX_LETTERS`].

use crate::{
    error::{Error, Result},
    registry::{ConnectionKey, Registry},
};
use engine::{
    board::{Bonus, BoardSettings, BoardWord},
    event::{Event, EventPayload, GameInitParams, GameStartParams, PlayerAddLettersParams},
    game_state::GameState,
    letter_bag::{LetterBag, DEFAULT_DISTRIBUTION},
    player::PLAYER_MAX_LETTERS,
    pos::{Direction, Pos},
    store::EventStore,
};
use protocol::{EventMessage, EventStatus, WebsocketMessage};
use rand::Rng;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tokio::sync::Mutex;

/// Default board dimensions used by `start_game`, reflecting the
/// teacher's `start` command: a 20x20 board with corner/diagonal
/// bonuses mirrored across all four quadrants.
const BOARD_WIDTH: u32 = 20;
const BOARD_HEIGHT: u32 = 20;

/// One in-memory record for a single game: its folded state, the
/// events applied so far, and which usernames have ever joined.
struct GameRecord {
    state: GameState,
    events: Vec<Event>,
    players_connected: HashSet<String>,
}

/// Orchestrates every game on this process. One [`Mutex`] per game
/// means unrelated games never contend, matching the teacher's
/// `Arc<RwLock<LiveGame>>` per-game ownership shape.
pub struct ServerEngine {
    store: EventStore,
    games: Mutex<HashMap<u64, Arc<Mutex<GameRecord>>>>,
}
impl ServerEngine {
    /// Creates an engine persisting to `store`.
    pub fn new(store: EventStore) -> Self {
        Self {
            store,
            games: Mutex::new(HashMap::new()),
        }
    }

    /// Allocates a fresh game id and an empty in-memory record for it.
    /// Does not persist anything until the first event is applied.
    pub async fn init_new_game(&self) -> u64 {
        let game_id = rand::thread_rng().gen_range(1..1_000_000);
        let record = GameRecord {
            state: GameState::new(game_id),
            events: Vec::new(),
            players_connected: HashSet::new(),
        };
        self.games.lock().await.insert(game_id, Arc::new(Mutex::new(record)));
        game_id
    }

    /// Loads `game_id` from disk, replaying every persisted event.
    /// Aborts (and does not register the game) on the first event
    /// that fails to apply.
    pub async fn load_game(&self, game_id: u64) -> Result<()> {
        let events = self.store.load(game_id)?;
        let state = GameState::from_events(game_id, &events)?;
        let record = GameRecord {
            state,
            events,
            players_connected: HashSet::new(),
        };
        self.games.lock().await.insert(game_id, Arc::new(Mutex::new(record)));
        Ok(())
    }

    /// Whether `game_id` has an in-memory record (initialised or loaded).
    pub async fn is_known(&self, game_id: u64) -> bool {
        self.games.lock().await.contains_key(&game_id)
    }

    fn corner_bonuses(&self) -> Vec<Bonus> {
        let seed = [(5i64, 5i64, 3u32), (7, 7, 2)];
        let w = BOARD_WIDTH as i64;
        let h = BOARD_HEIGHT as i64;
        let mut bonuses = Vec::new();
        for &(x, y, multiplier) in &seed {
            bonuses.push(Bonus { x, y, multiplier });
            bonuses.push(Bonus { x, y: h - y, multiplier });
            bonuses.push(Bonus { x: w - x, y: h - y, multiplier });
            bonuses.push(Bonus { x: w - x, y, multiplier });
        }
        bonuses
    }

    /// Starts `game_id`: builds a fresh board and letter bag, deals
    /// every connected player a full hand, and emits `GameInit`, one
    /// `PlayerAddLetters` per player, then `GameStart`. Refuses if the
    /// game is unknown or already started.
    pub async fn start_game(
        &self,
        game_id: u64,
        players: Vec<String>,
        init_word: &str,
        registry: &Registry,
    ) -> Result<()> {
        let games = self.games.lock().await;
        let record = games.get(&game_id).ok_or(Error::GameNotJoinable)?.clone();
        drop(games);

        let mut record = record.lock().await;
        if record.state.board().is_some() {
            return Err(Error::Engine(engine::error::EngineError::AlreadyInitialised));
        }

        let start_x = (BOARD_WIDTH as i64 - init_word.chars().count() as i64) / 2;
        let start_y = BOARD_HEIGHT as i64 / 2;

        let distribution: HashMap<char, u32> = DEFAULT_DISTRIBUTION.iter().copied().collect();
        let letter_bag = LetterBag::new((BOARD_WIDTH * BOARD_HEIGHT) as usize, &distribution)?;
        let letters = letter_bag.letters().to_vec();

        let mut sequence = 1;
        let init_event = Event::new(
            sequence,
            game_id,
            now(),
            EventPayload::GameInit(GameInitParams {
                players: players.clone(),
                board_settings: BoardSettings {
                    width: BOARD_WIDTH,
                    height: BOARD_HEIGHT,
                    init_word: Some(BoardWord::new(init_word, Pos::new(start_x, start_y), Direction::Right)),
                    bonuses: self.corner_bonuses(),
                },
                letters,
            }),
        );
        self.apply_locked(&mut record, game_id, init_event, registry)?;
        sequence += 1;

        for player in &players {
            let hand: Vec<char> = record.state.pool().iter().take(PLAYER_MAX_LETTERS).copied().collect();
            let add_event = Event::new(
                sequence,
                game_id,
                now(),
                EventPayload::PlayerAddLetters(PlayerAddLettersParams {
                    player: player.clone(),
                    letters: hand,
                }),
            );
            self.apply_locked(&mut record, game_id, add_event, registry)?;
            sequence += 1;
        }

        let start_event = Event::new(
            sequence,
            game_id,
            now(),
            EventPayload::GameStart(GameStartParams {
                player_to_start: players.first().cloned(),
            }),
        );
        self.apply_locked(&mut record, game_id, start_event, registry)?;

        Ok(())
    }

    /// Handles a client-submitted `REQUESTED` event for `game_id`:
    /// validates and applies it via the reducer, persists and
    /// broadcasts on success, then (for a `PlayerMove`) tops the
    /// mover's hand back up to [`PLAYER_MAX_LETTERS`].
    ///
    /// A validation failure is logged and dropped; no `REJECTED`
    /// message is sent back (spec's open question, preserved as-is).
    pub async fn on_requested_event(&self, game_id: u64, event: Event, registry: &Registry) {
        let games = self.games.lock().await;
        let Some(record) = games.get(&game_id).cloned() else {
            log::warn!("event for unknown game {game_id}");
            return;
        };
        drop(games);

        let mut record = record.lock().await;

        let mover = match &event.payload {
            EventPayload::PlayerMove(params) => Some(params.player.clone()),
            _ => None,
        };

        if let Err(err) = self.apply_locked(&mut record, game_id, event, registry) {
            log::warn!("dropping invalid event for game {game_id}: {err}");
            return;
        }

        if let Some(username) = mover {
            self.refill(&mut record, game_id, &username, registry);
        }
    }

    fn refill(&self, record: &mut GameRecord, game_id: u64, username: &str, registry: &Registry) {
        let Ok(player) = record.state.get_player_state(username) else {
            return;
        };
        let missing = PLAYER_MAX_LETTERS.saturating_sub(player.letters.len());
        if missing == 0 {
            return;
        }

        let letters: Vec<char> = record.state.pool().iter().take(missing).copied().collect();
        if letters.is_empty() {
            return;
        }

        let sequence = record.state.latest_event_sequence() + 1;
        let event = Event::new(
            sequence,
            game_id,
            now(),
            EventPayload::PlayerAddLetters(PlayerAddLettersParams {
                player: username.to_string(),
                letters,
            }),
        );

        if let Err(err) = self.apply_locked(record, game_id, event, registry) {
            log::warn!("failed to apply refill for {username} in game {game_id}: {err}");
        }
    }

    /// Applies `event` against an already-locked record: the reducer,
    /// then persistence, then broadcast of the `APPROVED` wrapper.
    fn apply_locked(
        &self,
        record: &mut GameRecord,
        game_id: u64,
        event: Event,
        registry: &Registry,
    ) -> Result<()> {
        record.state.apply_event(&event)?;
        record.events.push(event.clone());
        self.store.save(game_id, &record.events)?;

        registry.publish_to_game(
            &WebsocketMessage::Event(EventMessage {
                event,
                status: EventStatus::Approved,
            }),
            game_id,
            None,
        );
        Ok(())
    }

    /// Called when `key` successfully authenticates into `game_id`.
    /// Rejects unknown games; otherwise replays the game's full
    /// persisted history to the joiner alone, in order, before
    /// `register` returns (so history always precedes live events).
    pub async fn on_new_connection(&self, key: &ConnectionKey, registry: &Registry) -> Result<()> {
        let (username, game_id) = key;
        let games = self.games.lock().await;
        let Some(record) = games.get(game_id).cloned() else {
            return Err(Error::GameNotJoinable);
        };
        drop(games);

        let mut record = record.lock().await;
        record.players_connected.insert(username.clone());

        for event in record.events.clone() {
            registry.send(
                key,
                &WebsocketMessage::Event(EventMessage {
                    event,
                    status: EventStatus::Approved,
                }),
            );
        }
        Ok(())
    }

    /// Called when `key` disconnects.
    pub async fn on_end_connection(&self, key: &ConnectionKey) {
        let (username, game_id) = key;
        let games = self.games.lock().await;
        if let Some(record) = games.get(game_id) {
            record.lock().await.players_connected.remove(username);
        }
    }
}

fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
