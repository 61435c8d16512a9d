//! The websocket wire envelope: one `WebsocketMessage` per frame,
//! tagged by `type` with its payload nested under `payload`.

use engine::event::Event;
use serde::{Deserialize, Serialize};

/// Every frame exchanged over the websocket transport is exactly one
/// of these, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebsocketMessage {
    /// The client's first frame, authenticating into a game.
    AuthRequest(AuthRequest),
    /// The server's reply to an `AuthRequest`.
    AuthResponse(AuthResponse),
    /// Broadcast to a game's members when a new peer joins.
    NewConnection(NewConnection),
    /// Broadcast to a game's members when a peer leaves.
    EndConnection(EndConnection),
    /// A game event, proposed by a client or approved by the server.
    Event(EventMessage),
}

/// Payload of [`WebsocketMessage::AuthRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    /// The username authenticating.
    pub username: String,
    /// The game the connection wants to join.
    pub game_id: u64,
}

/// Payload of [`WebsocketMessage::AuthResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Whether authentication succeeded.
    pub ok: bool,
}

/// Payload of [`WebsocketMessage::NewConnection`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConnection {
    /// The username of the peer that joined.
    pub username: String,
}

/// Payload of [`WebsocketMessage::EndConnection`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndConnection {
    /// The username of the peer that left.
    pub username: String,
}

/// The lifecycle status of an event carried by an [`EventMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// A client proposes this event; the server has not yet validated it.
    Requested,
    /// The server validated and applied this event; it is now authoritative.
    Approved,
    /// The server rejected this event (see spec open question on wire shape).
    Rejected,
}

/// Payload of [`WebsocketMessage::Event`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    /// The event being proposed or confirmed.
    pub event: Event,
    /// Whether this is a client proposal or a server confirmation.
    pub status: EventStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_request_wire_shape() {
        let msg = WebsocketMessage::AuthRequest(AuthRequest {
            username: "alice".into(),
            game_id: 42,
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "AUTH_REQUEST");
        assert_eq!(json["payload"]["username"], "alice");
        assert_eq!(json["payload"]["game_id"], 42);
    }

    #[test]
    fn auth_response_wire_shape() {
        let msg = WebsocketMessage::AuthResponse(AuthResponse { ok: true });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "AUTH_RESPONSE");
        assert_eq!(json["payload"]["ok"], true);
    }

    #[test]
    fn event_message_round_trips() {
        use engine::event::{EventPayload, GameStartParams};

        let msg = WebsocketMessage::Event(EventMessage {
            event: Event::new(
                3,
                42,
                0,
                EventPayload::GameStart(GameStartParams {
                    player_to_start: Some("alice".into()),
                }),
            ),
            status: EventStatus::Approved,
        });

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"EVENT\""));
        assert!(json.contains("\"status\":\"APPROVED\""));

        let back: WebsocketMessage = serde_json::from_str(&json).unwrap();
        match back {
            WebsocketMessage::Event(em) => {
                assert_eq!(em.event.sequence, 3);
                assert_eq!(em.status, EventStatus::Approved);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn unknown_type_fails_to_parse() {
        let json = r#"{"type":"BOGUS","payload":{}}"#;
        assert!(serde_json::from_str::<WebsocketMessage>(json).is_err());
    }
}
