//! The websocket route: upgrades a connection, runs the auth
//! handshake, then forwards frames between the socket and the
//! registry/engine.

use crate::{engine::ServerEngine, error::Error, registry::Registry};
use futures::{SinkExt, StreamExt};
use protocol::WebsocketMessage;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::UnboundedReceiverStream;
use warp::{
    ws::{Message, WebSocket, Ws},
    Filter, Rejection, Reply,
};

/// Shared handles every connection task needs.
#[derive(Clone)]
pub struct Shared {
    /// The connection registry.
    pub registry: Arc<Mutex<Registry>>,
    /// The game engine.
    pub engine: Arc<ServerEngine>,
}

/// The combined websocket filter, mounted at `/ws`.
pub fn routes(shared: Shared) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let shared_filter = warp::any().map(move || shared.clone());

    warp::path("ws")
        .and(warp::ws())
        .and(shared_filter)
        .map(|ws: Ws, shared: Shared| {
            ws.on_upgrade(move |socket| on_upgrade(socket, shared));
            warp::reply()
        })
}

async fn on_upgrade(socket: WebSocket, shared: Shared) {
    let (mut conn_tx, mut conn_rx) = socket.split();

    let first = match conn_rx.next().await {
        Some(Ok(msg)) => msg,
        _ => {
            log::warn!("connection closed before AUTH_REQUEST");
            return;
        }
    };

    let key = match parse_frame(&first) {
        Ok(WebsocketMessage::AuthRequest(req)) => (req.username, req.game_id),
        _ => {
            log::warn!("{}", Error::ExpectedAuthRequest);
            return;
        }
    };

    let (outgoing, rx) = mpsc::unbounded_channel::<Message>();
    let (cancel_tx, mut cancel_rx) = mpsc::unbounded_channel::<()>();
    let mut rx = UnboundedReceiverStream::new(rx);

    tokio::spawn(async move {
        while let Some(msg) = rx.next().await {
            if conn_tx.send(msg).await.is_err() {
                break;
            }
        }
    });

    let game_known = shared.engine.is_known(key.1).await;
    let join_result = {
        let mut registry = shared.registry.lock().await;
        crate::registry::finish_registration(&mut registry, key.clone(), outgoing, cancel_tx, |_| {
            if game_known {
                Ok(())
            } else {
                Err(Error::GameNotJoinable)
            }
        })
    };

    if let Err(err) = join_result {
        log::warn!("registration for {:?} failed: {err}", key);
        return;
    }

    {
        let registry = shared.registry.lock().await;
        if let Err(err) = shared.engine.on_new_connection(&key, &registry).await {
            log::warn!("history replay for {:?} failed: {err}", key);
        }
    }

    loop {
        tokio::select! {
            frame = conn_rx.next() => {
                match frame {
                    Some(Ok(msg)) => {
                        if msg.is_close() {
                            break;
                        }
                        handle_frame(&msg, &key, &shared).await;
                    }
                    Some(Err(err)) => {
                        log::warn!("websocket error for {:?}: {err}", key);
                        break;
                    }
                    None => break,
                }
            }
            _ = cancel_rx.recv() => break,
        }
    }

    let mut registry = shared.registry.lock().await;
    crate::registry::finish_unregistration(&mut registry, &key);
    shared.engine.on_end_connection(&key).await;
}

async fn handle_frame(msg: &Message, key: &(String, u64), shared: &Shared) {
    let parsed = match parse_frame(msg) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::warn!("malformed frame from {:?}: {err}", key);
            return;
        }
    };

    match parsed {
        WebsocketMessage::Event(event_msg) => {
            let registry = shared.registry.lock().await;
            shared
                .engine
                .on_requested_event(key.1, event_msg.event, &registry)
                .await;
        }
        other => log::warn!("ignoring unexpected frame from {:?}: {other:?}", key),
    }
}

fn parse_frame(msg: &Message) -> Result<WebsocketMessage, Error> {
    let text = msg.to_str().map_err(|_| Error::ExpectedAuthRequest)?;
    Ok(serde_json::from_str(text)?)
}
