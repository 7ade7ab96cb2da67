//! WebSocket connection management
//! Handles the send half of a client connection

use std::time::{Duration, Instant};

use log::warn;
use tokio::sync::mpsc;
use warp::ws::Message;

/// The send handle for a single WebSocket connection
pub struct Connection {
    pub id: String,
    pub sender: mpsc::UnboundedSender<Message>,
    pub connected_at: Instant,
}

impl Connection {
    /// Create a connection around an already-assigned id
    pub fn with_id(id: String, sender: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id,
            sender,
            connected_at: Instant::now(),
        }
    }

    /// Send a text message through this connection
    pub fn send_text(&self, text: &str) -> bool {
        match self.sender.send(Message::text(text)) {
            Ok(_) => true,
            Err(_) => {
                warn!("Failed to send message to client {}", self.id);
                false
            }
        }
    }

    /// How long this connection has been open
    pub fn connection_duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
