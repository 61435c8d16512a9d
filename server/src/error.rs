//! Module for error handling.

use std::{error::Error as StdError, fmt};

/// The library result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The library error type.
#[derive(Debug)]
pub enum Error {
    /// The reducer or board rejected an event or move.
    Engine(engine::error::EngineError),
    /// An event file could not be read or written.
    Io(std::io::Error),
    /// A websocket frame could not be parsed as a [`protocol::WebsocketMessage`].
    MalformedFrame(serde_json::Error),
    /// The first frame received on a connection was not `AUTH_REQUEST`.
    ExpectedAuthRequest,
    /// A second connection authenticated with a `(username, game_id)`
    /// key already held by a live connection.
    DuplicateConnection,
    /// `on_new_conn` ran for a game that has not been initialised.
    GameNotJoinable,
}

impl StdError for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Engine(err) => write!(f, "{err}"),
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::MalformedFrame(err) => write!(f, "malformed websocket frame: {err}"),
            Error::ExpectedAuthRequest => write!(f, "expected AUTH_REQUEST as the first frame"),
            Error::DuplicateConnection => {
                write!(f, "a connection with this username and game id is already live")
            }
            Error::GameNotJoinable => write!(f, "game has not been initialised"),
        }
    }
}

impl From<engine::error::EngineError> for Error {
    fn from(err: engine::error::EngineError) -> Self {
        Self::Engine(err)
    }
}
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedFrame(err)
    }
}
