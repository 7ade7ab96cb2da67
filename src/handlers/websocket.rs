use futures_util::sink::SinkExt;
use futures_util::stream::StreamExt;
use log::{error, info, warn};
use tokio::sync::mpsc;
use uuid::Uuid;
use warp::ws::WebSocket;

use crate::core::message_handler::MessageHandler;
use crate::core::server::SharedGameServer;

// Handle a WebSocket connection
pub async fn handle_ws_client(ws: WebSocket, server: SharedGameServer) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (tx, rx) = mpsc::unbounded_channel();

    // Spawn a task to forward messages from our channel to the WebSocket
    tokio::task::spawn(async move {
        let mut rx = rx;
        while let Some(message) = rx.recv().await {
            if let Err(e) = ws_tx.send(message).await {
                error!("Failed to send WebSocket message: {}", e);
                break;
            }
        }
    });

    // Generate a unique client ID and register the send half
    let client_id = Uuid::new_v4().to_string();
    server.register_connection(client_id.clone(), tx).await;
    info!("Client connected: {}", client_id);

    let handler = MessageHandler::new(server.clone());

    // Handle incoming messages
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(msg) => {
                // Only process text messages
                if let Ok(text) = msg.to_str() {
                    if let Err(e) = handler.handle_client_message(&client_id, text).await {
                        warn!("Dropping frame from {}: {}", client_id, e);
                    }
                }
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
        }
    }

    // Client disconnected: clean up room membership and notify the
    // remaining room and lobby exactly as an explicit leave would
    if let Some(departure) = server.disconnect(&client_id).await {
        handler.emit_departure(departure).await;
    }
}
