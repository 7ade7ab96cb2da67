use std::collections::HashMap;

use tokio::sync::mpsc;
use warp::ws::Message as WsMessage;

use crate::core::connection::Connection;
use crate::core::message_types::ServerMessage;

// Session-side record for a connected player
#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub room_id: Option<String>,
    pub ready_for_rematch: bool,
}

impl Player {
    pub fn new(name: String) -> Self {
        Self {
            name,
            room_id: None,
            ready_for_rematch: false,
        }
    }
}

// Manages client connections and their player records
pub struct SessionManager {
    connections: HashMap<String, Connection>,
    players: HashMap<String, Player>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
            players: HashMap::new(),
        }
    }

    // Register a new client connection
    pub fn register(&mut self, id: String, sender: mpsc::UnboundedSender<WsMessage>) {
        let connection = Connection::with_id(id.clone(), sender);
        self.connections.insert(id, connection);
    }

    // Remove a client connection together with its player record
    pub fn unregister(&mut self, id: &str) -> Option<Connection> {
        self.players.remove(id);
        self.connections.remove(id)
    }

    // Create or overwrite the player record for a connection
    pub fn enter_lobby(&mut self, id: &str, name: String) {
        self.players.insert(id.to_string(), Player::new(name));
    }

    // Bind a connection to a room, creating the player record if the
    // caller skipped the lobby. A fresh binding is never rematch-ready.
    pub fn bind_room(&mut self, id: &str, name: String, room_id: String) {
        let player = self
            .players
            .entry(id.to_string())
            .or_insert_with(|| Player::new(String::new()));
        player.name = name;
        player.room_id = Some(room_id);
        player.ready_for_rematch = false;
    }

    // Clear a connection's room binding
    pub fn unbind_room(&mut self, id: &str) {
        if let Some(player) = self.players.get_mut(id) {
            player.room_id = None;
            player.ready_for_rematch = false;
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    // Serialize and send an event to a single connection
    pub fn send_to(&self, id: &str, message: &ServerMessage) -> bool {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(_) => return false,
        };
        match self.connections.get(id) {
            Some(connection) => connection.send_text(&text),
            None => false,
        }
    }

    // Broadcast an event to every connected client
    pub fn broadcast_all(&self, message: &ServerMessage) -> usize {
        let text = serde_json::to_string(message).unwrap_or_default();
        let mut success_count = 0;

        for connection in self.connections.values() {
            if connection.send_text(&text) {
                success_count += 1;
            }
        }

        success_count
    }

    // Get current clients count
    pub fn client_count(&self) -> usize {
        self.connections.len()
    }
}
