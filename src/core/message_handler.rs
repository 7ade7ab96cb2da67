//! Event router: translates inbound client events into directory
//! operations and emits the resulting state to affected connections

use log::debug;

use crate::core::message_types::{ClientMessage, ServerMessage};
use crate::core::server::{Departure, RematchOutcome, SharedGameServer};
use crate::error::{NoughtsError, Result};

/// Handles incoming client events and routes them to the game server
pub struct MessageHandler {
    server: SharedGameServer,
}

impl MessageHandler {
    /// Create a new message handler
    pub fn new(server: SharedGameServer) -> Self {
        Self { server }
    }

    /// Process one inbound text frame from a connection. Only a frame
    /// that fails to parse is an error; every rejected action is handled
    /// inside its event and never propagates.
    pub async fn handle_client_message(&self, sender_id: &str, message_text: &str) -> Result<()> {
        let client_message: ClientMessage = serde_json::from_str(message_text)
            .map_err(|e| NoughtsError::MessageParseError(format!("Invalid JSON: {}", e)))?;

        match client_message {
            ClientMessage::JoinLobby { name } => self.handle_join_lobby(sender_id, name).await,

            ClientMessage::CreateRoom { is_public, name } => {
                self.handle_create_room(sender_id, name, is_public).await
            }

            ClientMessage::JoinRoom { room_id, name } => {
                self.handle_join_room(sender_id, &room_id, name).await
            }

            ClientMessage::MakeMove { room_id, index } => {
                self.handle_make_move(sender_id, &room_id, index).await
            }

            ClientMessage::RequestRematch { room_id } => {
                self.handle_request_rematch(sender_id, &room_id).await
            }

            ClientMessage::LeaveRoom => self.handle_leave_room(sender_id).await,
        }

        Ok(())
    }

    /// Handle lobby entry
    async fn handle_join_lobby(&self, sender_id: &str, name: String) {
        let rooms = self.server.join_lobby(sender_id, name).await;
        self.server
            .send_to(sender_id, &ServerMessage::PublicRooms { rooms })
            .await;
    }

    /// Handle room creation
    async fn handle_create_room(&self, sender_id: &str, name: String, is_public: bool) {
        let (room_id, snapshot) = self.server.create_room(sender_id, name, is_public).await;

        self.server
            .send_to(
                sender_id,
                &ServerMessage::RoomCreated {
                    room_id: room_id.clone(),
                },
            )
            .await;
        if is_public {
            self.broadcast_public_rooms().await;
        }
        self.server
            .broadcast_to_room(&room_id, &ServerMessage::RoomState(snapshot), None)
            .await;
    }

    /// Handle join room request
    async fn handle_join_room(&self, sender_id: &str, room_id: &str, name: String) {
        match self.server.join_room(sender_id, room_id, name).await {
            Ok((snapshot, is_public)) => {
                self.server
                    .send_to(
                        sender_id,
                        &ServerMessage::RoomJoined {
                            room_id: room_id.to_string(),
                        },
                    )
                    .await;
                self.server
                    .broadcast_to_room(room_id, &ServerMessage::RoomState(snapshot), None)
                    .await;
                if is_public {
                    self.broadcast_public_rooms().await;
                }
            }
            Err(e) => {
                debug!("Join rejected for {} on room {}: {}", sender_id, room_id, e);
                self.server
                    .send_to(
                        sender_id,
                        &ServerMessage::Error {
                            message: e.to_string(),
                        },
                    )
                    .await;
            }
        }
    }

    /// Handle a move. Rejected moves stay silent: clients render moves
    /// optimistically and may race for the same cell, so the absence of
    /// a state broadcast is the rejection signal.
    async fn handle_make_move(&self, sender_id: &str, room_id: &str, index: usize) {
        if let Some(snapshot) = self.server.make_move(sender_id, room_id, index).await {
            self.server
                .broadcast_to_room(room_id, &ServerMessage::RoomState(snapshot), None)
                .await;
        }
    }

    /// Handle a rematch request
    async fn handle_request_rematch(&self, sender_id: &str, room_id: &str) {
        match self.server.request_rematch(sender_id, room_id).await {
            RematchOutcome::Restarted(snapshot) => {
                self.server
                    .broadcast_to_room(room_id, &ServerMessage::RoomState(snapshot), None)
                    .await;
            }
            RematchOutcome::Pending => {
                self.server
                    .broadcast_to_room(room_id, &ServerMessage::RematchRequested, Some(sender_id))
                    .await;
            }
            RematchOutcome::Ignored => {
                debug!("Rematch request ignored for {} on room {}", sender_id, room_id);
            }
        }
    }

    /// Handle an explicit room departure
    async fn handle_leave_room(&self, sender_id: &str) {
        if let Some(departure) = self.server.leave_room(sender_id).await {
            self.emit_departure(departure).await;
        }
    }

    /// Broadcasts shared by leave-room and disconnect: the surviving
    /// room gets a fresh state, and the lobby a refreshed listing when
    /// a public room changed
    pub async fn emit_departure(&self, departure: Departure) {
        if let Some(snapshot) = departure.snapshot {
            self.server
                .broadcast_to_room(
                    &departure.room_id,
                    &ServerMessage::RoomState(snapshot),
                    None,
                )
                .await;
            if departure.was_public {
                self.broadcast_public_rooms().await;
            }
        }
    }

    /// Push the current public-waiting listing to every connection
    async fn broadcast_public_rooms(&self) {
        let rooms = self.server.public_rooms().await;
        self.server
            .broadcast_all(&ServerMessage::PublicRooms { rooms })
            .await;
    }
}
