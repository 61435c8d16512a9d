//! The authoritative reducer: folds an ordered event stream into the
//! current state of one game.

use crate::{
    board::Board,
    error::{EngineError, EngineResult},
    event::{Event, EventPayload, GameInitParams, GameStartParams, PlayerAddLettersParams, PlayerMoveParams},
    player::{Player, PLAYER_MAX_LETTERS},
};

/// Score bonus added to a move that uses every letter in the hand.
pub const BONUS_FOR_ALL_LETTERS_USED: i64 = 50;

/// The state of one game: its board, players, turn pointer, letter
/// pool and the sequence of the last event applied. Built by folding
/// events one at a time via [`GameState::apply_event`] — never by
/// re-deriving from scratch mid-game.
#[derive(Debug, Clone)]
pub struct GameState {
    game_id: u64,
    players_order: Vec<String>,
    players_by_username: std::collections::HashMap<String, Player>,
    turn_idx: Option<usize>,
    pool: Vec<char>,
    board: Option<Board>,
    sequence: u64,
}
impl GameState {
    /// Creates an empty state for `game_id` with no events applied.
    pub fn new(game_id: u64) -> Self {
        Self {
            game_id,
            players_order: Vec::new(),
            players_by_username: std::collections::HashMap::new(),
            turn_idx: None,
            pool: Vec::new(),
            board: None,
            sequence: 0,
        }
    }

    /// Builds a state for `game_id` by folding `events` in order.
    /// Fails on the first event that does not apply.
    pub fn from_events(game_id: u64, events: &[Event]) -> EngineResult<Self> {
        let mut state = Self::new(game_id);
        for event in events {
            state.apply_event(event)?;
        }
        Ok(state)
    }

    /// The id of the game this state belongs to.
    pub fn game_id(&self) -> u64 {
        self.game_id
    }
    /// The sequence number of the last event successfully applied.
    pub fn latest_event_sequence(&self) -> u64 {
        self.sequence
    }
    /// The username of the player whose turn it is, if the game has started.
    pub fn player_to_move(&self) -> Option<&str> {
        self.turn_idx
            .map(|idx| self.players_order[idx].as_str())
    }
    /// Players in turn order.
    pub fn players_order(&self) -> &[String] {
        &self.players_order
    }
    /// The remaining, undealt letter pool, in draw order.
    pub fn pool(&self) -> &[char] {
        &self.pool
    }
    /// The board, if a `GameInit` has been applied.
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }
    /// Looks up a player's current state.
    pub fn get_player_state(&self, username: &str) -> EngineResult<&Player> {
        self.players_by_username
            .get(username)
            .ok_or(EngineError::UnknownPlayer)
    }

    /// Applies one event. On any failure the state is left exactly as
    /// it was before the call — handlers validate before mutating.
    pub fn apply_event(&mut self, event: &Event) -> EngineResult<()> {
        if event.game_id != self.game_id {
            return Err(EngineError::WrongGame);
        }
        if event.sequence != self.sequence + 1 {
            return Err(EngineError::OutOfSequence {
                expected: self.sequence + 1,
                got: event.sequence,
            });
        }

        match &event.payload {
            EventPayload::GameInit(params) => self.apply_game_init(params)?,
            EventPayload::GameStart(params) => self.apply_game_start(params)?,
            EventPayload::PlayerAddLetters(params) => self.apply_player_add_letters(params)?,
            EventPayload::PlayerMove(params) => self.apply_player_move(params)?,
        }

        self.sequence = event.sequence;
        Ok(())
    }

    fn apply_game_init(&mut self, params: &GameInitParams) -> EngineResult<()> {
        if self.board.is_some() {
            return Err(EngineError::AlreadyInitialised);
        }

        let board = Board::new(params.board_settings.clone())?;

        let mut players_order = Vec::with_capacity(params.players.len());
        let mut players_by_username = std::collections::HashMap::new();
        for username in &params.players {
            players_order.push(username.clone());
            players_by_username.insert(username.clone(), Player::new(username.clone()));
        }

        self.board = Some(board);
        self.players_order = players_order;
        self.players_by_username = players_by_username;
        self.pool = params.letters.clone();
        Ok(())
    }

    fn apply_game_start(&mut self, params: &GameStartParams) -> EngineResult<()> {
        self.require_board()?;

        let idx = match &params.player_to_start {
            None => 0,
            Some(username) => self
                .players_order
                .iter()
                .position(|u| u == username)
                .ok_or(EngineError::UnknownPlayer)?,
        };
        self.turn_idx = Some(idx);
        Ok(())
    }

    fn apply_player_add_letters(&mut self, params: &PlayerAddLettersParams) -> EngineResult<()> {
        self.require_board()?;
        if !self.players_by_username.contains_key(&params.player) {
            return Err(EngineError::UnknownPlayer);
        }

        // Validate the whole draw against the pool before touching
        // anything, so a bad letter leaves both pool and hand intact.
        let mut pool = self.pool.clone();
        for &letter in &params.letters {
            let idx = pool
                .iter()
                .position(|&c| c == letter)
                .ok_or(EngineError::LetterNotAvailable(letter))?;
            pool.remove(idx);
        }

        let player = self.players_by_username.get_mut(&params.player).unwrap();
        player.fulfil_letters(&params.letters)?;
        self.pool = pool;
        Ok(())
    }

    fn apply_player_move(&mut self, params: &PlayerMoveParams) -> EngineResult<()> {
        let board = self.board.as_ref().ok_or(EngineError::GameNotInitialised)?;
        let turn_idx = self.turn_idx.ok_or(EngineError::GameNotStarted)?;

        if self.players_order[turn_idx] != params.player {
            return Err(EngineError::NotYourTurn);
        }
        let player = self
            .players_by_username
            .get(&params.player)
            .ok_or(EngineError::UnknownPlayer)?;

        let played_letters = board.get_letters_to_insert_words(&params.words);

        let mut spent = played_letters.clone();
        spent.extend(&params.exchange_letters);
        // Validate the hand can cover the spend before mutating the board.
        let mut hand = player.letters.clone();
        for &letter in &spent {
            let idx = hand
                .iter()
                .position(|&c| c == letter)
                .ok_or(EngineError::LetterNotAvailable(letter))?;
            hand.remove(idx);
        }

        let board = self.board.as_mut().unwrap();
        let score = board.insert_words(&params.words)?;

        let mut bonus = 0;
        if played_letters.len() == PLAYER_MAX_LETTERS {
            bonus = BONUS_FOR_ALL_LETTERS_USED;
        }

        let player = self.players_by_username.get_mut(&params.player).unwrap();
        player.add_score(score as i64 + bonus)?;
        player.play_letters(&spent)?;

        self.turn_idx = Some((turn_idx + 1) % self.players_order.len());
        Ok(())
    }

    fn require_board(&self) -> EngineResult<()> {
        if self.board.is_none() {
            return Err(EngineError::GameNotInitialised);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardSettings, BoardWord, BoardWords};
    use crate::pos::{Direction, Pos};

    fn init_event(game_id: u64, players: &[&str], letters: Vec<char>) -> Event {
        Event::new(
            1,
            game_id,
            0,
            EventPayload::GameInit(GameInitParams {
                players: players.iter().map(|s| s.to_string()).collect(),
                board_settings: BoardSettings {
                    width: 100,
                    height: 100,
                    init_word: None,
                    bonuses: vec![],
                },
                letters,
            }),
        )
    }

    fn add_letters_event(seq: u64, game_id: u64, player: &str, letters: Vec<char>) -> Event {
        Event::new(
            seq,
            game_id,
            0,
            EventPayload::PlayerAddLetters(PlayerAddLettersParams {
                player: player.to_string(),
                letters,
            }),
        )
    }

    fn start_event(seq: u64, game_id: u64, player_to_start: Option<&str>) -> Event {
        Event::new(
            seq,
            game_id,
            0,
            EventPayload::GameStart(GameStartParams {
                player_to_start: player_to_start.map(|s| s.to_string()),
            }),
        )
    }

    fn move_event(seq: u64, game_id: u64, player: &str, word: &str, x: i64, y: i64, dir: Direction, exchange: Vec<char>) -> Event {
        let mut words = BoardWords::new();
        words.add_word(BoardWord::new(word, Pos::new(x, y), dir)).unwrap();
        Event::new(
            seq,
            game_id,
            0,
            EventPayload::PlayerMove(PlayerMoveParams {
                player: player.to_string(),
                words,
                exchange_letters: exchange,
            }),
        )
    }

    #[test]
    fn sequence_must_be_contiguous() {
        let mut state = GameState::new(1);
        let bad = Event::new(2, 1, 0, EventPayload::GameStart(GameStartParams::default()));
        assert!(matches!(
            state.apply_event(&bad),
            Err(EngineError::OutOfSequence { expected: 1, got: 2 })
        ));
        assert_eq!(state.latest_event_sequence(), 0);
    }

    #[test]
    fn wrong_game_id_rejected() {
        let mut state = GameState::new(1);
        let event = init_event(2, &["a"], vec!['a']);
        assert!(matches!(state.apply_event(&event), Err(EngineError::WrongGame)));
    }

    #[test]
    fn s1_two_word_opening() {
        let letters: Vec<char> = "abacabaabracadabra".chars().collect();
        let mut state = GameState::new(1);
        state.apply_event(&init_event(1, &["a", "b"], letters)).unwrap();
        state.apply_event(&add_letters_event(2, 1, "a", "abacaba".chars().collect())).unwrap();
        state.apply_event(&add_letters_event(3, 1, "b", "bracadab".chars().take(7).collect())).unwrap();
        state.apply_event(&start_event(4, 1, Some("a"))).unwrap();

        state
            .apply_event(&move_event(5, 1, "a", "abacaba", 10, 10, Direction::Right, vec![]))
            .unwrap();
        assert_eq!(state.get_player_state("a").unwrap().score, 7);
        assert_eq!(state.player_to_move(), Some("b"));
    }

    #[test]
    fn sequence_monotonicity_preserves_state_on_rejection() {
        let letters: Vec<char> = "abcdefg".chars().collect();
        let mut state = GameState::new(1);
        state.apply_event(&init_event(1, &["a"], letters)).unwrap();
        // apply a duplicate sequence=1 event: should fail, state unchanged
        let dup = init_event(1, &["a"], vec!['z']);
        assert!(state.apply_event(&dup).is_err());
        assert_eq!(state.latest_event_sequence(), 1);
        assert_eq!(state.pool(), &['a', 'b', 'c', 'd', 'e', 'f', 'g']);
    }

    #[test]
    fn not_your_turn_rejected() {
        let letters: Vec<char> = "abcdefghijklmn".chars().collect();
        let mut state = GameState::new(1);
        state.apply_event(&init_event(1, &["a", "b"], letters)).unwrap();
        state.apply_event(&add_letters_event(2, 1, "a", "abcdefg".chars().collect())).unwrap();
        state.apply_event(&add_letters_event(3, 1, "b", "hijklmn".chars().collect())).unwrap();
        state.apply_event(&start_event(4, 1, Some("a"))).unwrap();

        let bad_move = move_event(5, 1, "b", "hi", 0, 0, Direction::Right, vec![]);
        assert!(matches!(state.apply_event(&bad_move), Err(EngineError::NotYourTurn)));
    }

    #[test]
    fn add_letters_wrong_count_rejected() {
        let mut state = GameState::new(1);
        state.apply_event(&init_event(1, &["a"], vec!['x', 'y'])).unwrap();
        let bad = add_letters_event(2, 1, "a", vec!['x']);
        assert!(matches!(state.apply_event(&bad), Err(EngineError::WrongRefillCount)));
    }

    #[test]
    fn turn_rotation_modulo_players() {
        // Each move intersects the previous one at a matching letter:
        // "cat" -> "tan" (shared 't') -> "new" (shared 'n').
        let letters: Vec<char> = "catxxxxtanyyyynewzzzz".chars().collect();
        let mut state = GameState::new(1);
        state.apply_event(&init_event(1, &["a", "b", "c"], letters)).unwrap();
        state.apply_event(&add_letters_event(2, 1, "a", "catxxxx".chars().collect())).unwrap();
        state.apply_event(&add_letters_event(3, 1, "b", "tanyyyy".chars().collect())).unwrap();
        state.apply_event(&add_letters_event(4, 1, "c", "newzzzz".chars().collect())).unwrap();
        state.apply_event(&start_event(5, 1, Some("a"))).unwrap();

        state.apply_event(&move_event(6, 1, "a", "cat", 0, 0, Direction::Right, vec![])).unwrap();
        assert_eq!(state.player_to_move(), Some("b"));

        state.apply_event(&move_event(7, 1, "b", "tan", 2, 0, Direction::Down, vec![])).unwrap();
        assert_eq!(state.player_to_move(), Some("c"));

        state.apply_event(&move_event(8, 1, "c", "new", 2, 2, Direction::Right, vec![])).unwrap();
        assert_eq!(state.player_to_move(), Some("a"));
    }

    #[test]
    fn fold_is_deterministic() {
        let letters: Vec<char> = "abacabaabracadabra".chars().collect();
        let events = vec![
            init_event(1, &["a", "b"], letters),
            add_letters_event(2, 1, "a", "abacaba".chars().collect()),
            add_letters_event(3, 1, "b", "bracadab".chars().take(7).collect()),
            start_event(4, 1, Some("a")),
            move_event(5, 1, "a", "abacaba", 10, 10, Direction::Right, vec![]),
        ];

        let s1 = GameState::from_events(1, &events).unwrap();
        let s2 = GameState::from_events(1, &events).unwrap();
        assert_eq!(s1.latest_event_sequence(), s2.latest_event_sequence());
        assert_eq!(
            s1.get_player_state("a").unwrap().score,
            s2.get_player_state("a").unwrap().score
        );
        assert_eq!(s1.player_to_move(), s2.player_to_move());
        assert_eq!(s1.pool(), s2.pool());
    }

    #[test]
    fn all_letters_used_grants_bonus() {
        let letters: Vec<char> = "abacabaxyzxyzx".chars().collect();
        let mut state = GameState::new(1);
        state.apply_event(&init_event(1, &["a", "b"], letters)).unwrap();
        state.apply_event(&add_letters_event(2, 1, "a", "abacaba".chars().collect())).unwrap();
        state.apply_event(&add_letters_event(3, 1, "b", "xyzxyzx".chars().collect())).unwrap();
        state.apply_event(&start_event(4, 1, Some("a"))).unwrap();

        state.apply_event(&move_event(5, 1, "a", "abacaba", 10, 10, Direction::Right, vec![])).unwrap();
        assert_eq!(
            state.get_player_state("a").unwrap().score,
            7 + BONUS_FOR_ALL_LETTERS_USED
        );
    }
}
