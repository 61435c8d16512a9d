//! Crate providing the wire message types the server and its clients
//! use to communicate over the websocket transport.

// Produce a compiler warning for missing documentation.
#![warn(missing_docs)]

pub mod message;

pub use message::{
    AuthRequest, AuthResponse, EndConnection, EventMessage, EventStatus, NewConnection,
    WebsocketMessage,
};
