use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use huddle_core::SignalMessage;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::room::{ConnId, Occupant, RoomRegistry, encode};

pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(registry): State<RoomRegistry>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

async fn handle_socket(socket: WebSocket, registry: RoomRegistry) {
    let conn_id = ConnId::new();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    // The first frame has to be a join; this relay speaks nothing else
    // before one.
    let Some((room_id, username)) = await_join(&mut receiver).await else {
        return;
    };

    let player_id = match registry.join(
        &room_id,
        Occupant {
            id: conn_id,
            username: username.clone(),
            tx: tx.clone(),
        },
    ) {
        Ok(player_id) => player_id,
        Err(e) => {
            // a third joiner is refused by dropping the socket
            warn!(%room_id, %username, "join refused: {e}");
            return;
        }
    };
    info!(%room_id, %username, player_id, "occupant joined");

    if let Some(frame) = encode(&SignalMessage::Start { player_id }) {
        let _ = tx.send(frame);
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let registry = registry.clone();
        let room_id = room_id.clone();
        async move {
            while let Some(Ok(message)) = receiver.next().await {
                match message {
                    Message::Text(frame) => registry.forward(&room_id, conn_id, frame),
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    registry.leave(&room_id, conn_id);
    info!(%room_id, %username, "websocket disconnected");
}

async fn await_join(receiver: &mut SplitStream<WebSocket>) -> Option<(String, String)> {
    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<SignalMessage>(&text) {
                Ok(SignalMessage::Join { room_id, username }) => {
                    return Some((room_id, username));
                }
                Ok(other) => {
                    warn!(?other, "expected a join as the first frame");
                    return None;
                }
                Err(e) => {
                    warn!("invalid first frame: {e}");
                    return None;
                }
            },
            Message::Close(_) => return None,
            _ => {}
        }
    }
    None
}
