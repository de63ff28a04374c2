use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use periscope_core::{ClientFrame, ServerFrame};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::hub::{FrameSink, Hub};

/// FrameSink over the connection's outbound queue. Once the receiver is
/// gone the send fails and the frame is dropped.
struct QueueSink {
    tx: mpsc::UnboundedSender<ServerFrame>,
}

#[async_trait]
impl FrameSink for QueueSink {
    async fn deliver(&self, frame: ServerFrame) {
        let _ = self.tx.send(frame);
    }
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<Hub>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: Hub) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let client_id = hub.accept(Arc::new(QueueSink { tx })).await;
    info!("New WebSocket connection: {}", client_id);

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let json = match serde_json::to_string(&frame) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize outbound frame: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let hub = hub.clone();
        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientFrame>(&text) {
                        Ok(frame) => hub.handle_frame(client_id, frame).await,
                        Err(e) => warn!("Malformed frame from {}: {}", client_id, e),
                    },
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

    hub.closed(client_id).await;
    info!("WebSocket disconnected: {}", client_id);
}
