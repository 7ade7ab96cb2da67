//! Integrated coordinator for sessions and rooms

use std::sync::Arc;

use log::{debug, info};
use tokio::sync::{mpsc, RwLock};
use warp::ws::Message as WsMessage;

use crate::core::message_types::{RoomStateSnapshot, RoomSummary, ServerMessage};
use crate::core::room::{RoomManager, RoomStatus, ROOM_CAPACITY};
use crate::core::session::SessionManager;
use crate::error::{NoughtsError, Result};

/// Combined registries behind one lock. Every state-mutating operation
/// takes the write lock exactly once for its whole mutation, so inbound
/// events keep the run-to-completion semantics of a single-threaded
/// event loop: two moves on one room can never interleave, and seat
/// changes stay paired with the player-record binding.
struct Directory {
    sessions: SessionManager,
    rooms: RoomManager,
}

/// What happened to a room when a player left or disconnected
pub struct Departure {
    pub room_id: String,
    pub was_public: bool,
    /// Present while the room still exists (it kept a player)
    pub snapshot: Option<RoomStateSnapshot>,
}

/// Outcome of a rematch request
pub enum RematchOutcome {
    /// Both seats agreed; the room was reset
    Restarted(RoomStateSnapshot),
    /// The caller is now ready, the peer has not agreed yet
    Pending,
    /// Precondition failed: unknown room, game not finished, or caller
    /// not seated
    Ignored,
}

/// Process-scoped coordinator owning the session and room registries
pub struct GameServer {
    directory: RwLock<Directory>,
}

impl GameServer {
    pub fn new() -> Self {
        Self {
            directory: RwLock::new(Directory {
                sessions: SessionManager::new(),
                rooms: RoomManager::new(),
            }),
        }
    }

    /// Register the send half of a new connection
    pub async fn register_connection(&self, id: String, sender: mpsc::UnboundedSender<WsMessage>) {
        let mut dir = self.directory.write().await;
        dir.sessions.register(id, sender);
        info!("Current connections: {}", dir.sessions.client_count());
    }

    /// Create or overwrite the caller's player record and return the
    /// current public listing for them
    pub async fn join_lobby(&self, conn_id: &str, name: String) -> Vec<RoomSummary> {
        let mut dir = self.directory.write().await;
        dir.sessions.enter_lobby(conn_id, name);
        dir.rooms.list_public_waiting()
    }

    /// Create a room with the caller in the first seat
    pub async fn create_room(
        &self,
        conn_id: &str,
        name: String,
        is_public: bool,
    ) -> (String, RoomStateSnapshot) {
        let mut guard = self.directory.write().await;
        let dir = &mut *guard;

        let room = dir.rooms.create_room(is_public);
        room.add_player(conn_id.to_string(), name.clone());
        let room_id = room.id.clone();
        let snapshot = room.state_snapshot();

        dir.sessions.bind_room(conn_id, name, room_id.clone());
        info!("Room {} created by {} (public: {})", room_id, conn_id, is_public);
        (room_id, snapshot)
    }

    /// Seat the caller in an existing room. Only rooms that are still
    /// waiting and have a free seat accept joins.
    pub async fn join_room(
        &self,
        conn_id: &str,
        room_id: &str,
        name: String,
    ) -> Result<(RoomStateSnapshot, bool)> {
        let mut guard = self.directory.write().await;
        let dir = &mut *guard;

        let room = dir.rooms.get_mut(room_id).ok_or(NoughtsError::RoomNotFound)?;
        if room.is_full() {
            return Err(NoughtsError::RoomFull);
        }
        if room.status != RoomStatus::Waiting {
            return Err(NoughtsError::GameInProgress);
        }

        room.add_player(conn_id.to_string(), name.clone());
        let snapshot = room.state_snapshot();
        let is_public = room.is_public;

        dir.sessions.bind_room(conn_id, name, room_id.to_string());
        info!("Client {} joined room {}", conn_id, room_id);
        Ok((snapshot, is_public))
    }

    /// Apply a move. `None` means the move was rejected and nothing may
    /// be broadcast.
    pub async fn make_move(
        &self,
        conn_id: &str,
        room_id: &str,
        index: usize,
    ) -> Option<RoomStateSnapshot> {
        let mut dir = self.directory.write().await;
        let room = dir.rooms.get_mut(room_id)?;
        if !room.make_move(index, conn_id) {
            debug!(
                "Rejected move by {} in room {} (index {})",
                conn_id, room_id, index
            );
            return None;
        }
        Some(room.state_snapshot())
    }

    /// Record a rematch request; the room resets only once both seated
    /// players have asked since the last reset
    pub async fn request_rematch(&self, conn_id: &str, room_id: &str) -> RematchOutcome {
        let mut guard = self.directory.write().await;
        let dir = &mut *guard;

        let room = match dir.rooms.get_mut(room_id) {
            Some(room) => room,
            None => return RematchOutcome::Ignored,
        };
        if room.status != RoomStatus::Finished || room.seat(conn_id).is_none() {
            return RematchOutcome::Ignored;
        }

        if let Some(player) = dir.sessions.player_mut(conn_id) {
            player.ready_for_rematch = true;
        }

        let mut ready = 0;
        for seat in &room.players {
            match dir.sessions.player(&seat.connection_id) {
                Some(player) if player.ready_for_rematch => ready += 1,
                _ => {}
            }
        }
        if room.player_count() < ROOM_CAPACITY || ready < ROOM_CAPACITY {
            return RematchOutcome::Pending;
        }

        room.reset();
        for seat in &room.players {
            if let Some(player) = dir.sessions.player_mut(&seat.connection_id) {
                player.ready_for_rematch = false;
            }
        }
        info!("Room {} restarted for a rematch", room_id);
        RematchOutcome::Restarted(room.state_snapshot())
    }

    /// Remove the caller from their room, deleting the room if it ends
    /// up empty. `None` when the caller was not bound to a room.
    pub async fn leave_room(&self, conn_id: &str) -> Option<Departure> {
        let mut guard = self.directory.write().await;
        guard.remove_from_room(conn_id)
    }

    /// Disconnect cleanup: the same room effects as leave-room, plus
    /// removal of the player record and the connection itself
    pub async fn disconnect(&self, conn_id: &str) -> Option<Departure> {
        let mut guard = self.directory.write().await;
        let departure = guard.remove_from_room(conn_id);

        if let Some(connection) = guard.sessions.unregister(conn_id) {
            info!(
                "Client disconnected: {} (was connected {:?})",
                conn_id,
                connection.connection_duration()
            );
        }
        info!("Current connections: {}", guard.sessions.client_count());
        departure
    }

    /// Send one event to a single connection
    pub async fn send_to(&self, conn_id: &str, message: &ServerMessage) -> bool {
        let dir = self.directory.read().await;
        dir.sessions.send_to(conn_id, message)
    }

    /// Broadcast an event to every member of a room, optionally skipping
    /// one connection
    pub async fn broadcast_to_room(
        &self,
        room_id: &str,
        message: &ServerMessage,
        exclude: Option<&str>,
    ) -> usize {
        let dir = self.directory.read().await;
        let room = match dir.rooms.get(room_id) {
            Some(room) => room,
            None => return 0,
        };

        let mut sent = 0;
        for seat in &room.players {
            if exclude == Some(seat.connection_id.as_str()) {
                continue;
            }
            if dir.sessions.send_to(&seat.connection_id, message) {
                sent += 1;
            }
        }
        sent
    }

    /// Broadcast an event to every connection on the server
    pub async fn broadcast_all(&self, message: &ServerMessage) -> usize {
        let dir = self.directory.read().await;
        dir.sessions.broadcast_all(message)
    }

    /// Fresh public-waiting listing, for lobby broadcasts
    pub async fn public_rooms(&self) -> Vec<RoomSummary> {
        let dir = self.directory.read().await;
        dir.rooms.list_public_waiting()
    }

    /// Get connection count
    pub async fn connection_count(&self) -> usize {
        let dir = self.directory.read().await;
        dir.sessions.client_count()
    }

    /// Get live room count
    pub async fn room_count(&self) -> usize {
        let dir = self.directory.read().await;
        dir.rooms.room_count()
    }
}

impl Directory {
    // Shared removal path for leave-room and disconnect
    fn remove_from_room(&mut self, conn_id: &str) -> Option<Departure> {
        let room_id = self.sessions.player(conn_id).and_then(|p| p.room_id.clone())?;
        self.sessions.unbind_room(conn_id);

        let (was_public, snapshot) = {
            let room = self.rooms.get_mut(&room_id)?;
            if !room.remove_player(conn_id) {
                return None;
            }
            let snapshot = if room.is_empty() {
                None
            } else {
                Some(room.state_snapshot())
            };
            (room.is_public, snapshot)
        };

        if snapshot.is_none() {
            self.rooms.remove(&room_id);
            info!("Room {} deleted (last player left)", room_id);
        }

        Some(Departure {
            room_id,
            was_public,
            snapshot,
        })
    }
}

// Shared reference to the game server
pub type SharedGameServer = Arc<GameServer>;
