//! Typed wire contract for lobby and game events
//!
//! Event names and payload field names must stay byte-for-byte stable;
//! connected clients match on them.

use serde::{Deserialize, Serialize};

use crate::core::board::{Board, Mark};
use crate::core::room::RoomStatus;

/// Client-to-server events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Enter the lobby under a display name
    #[serde(rename = "join-lobby")]
    JoinLobby { name: String },

    /// Create a room and take its first seat
    #[serde(rename = "create-room")]
    CreateRoom {
        #[serde(rename = "isPublic")]
        is_public: bool,
        name: String,
    },

    /// Join an existing room by id
    #[serde(rename = "join-room")]
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: String,
        name: String,
    },

    /// Place a mark at a cell index
    #[serde(rename = "make-move")]
    MakeMove {
        #[serde(rename = "roomId")]
        room_id: String,
        index: usize,
    },

    /// Ask for a rematch after a finished game
    #[serde(rename = "request-rematch")]
    RequestRematch {
        #[serde(rename = "roomId")]
        room_id: String,
    },

    /// Leave the current room
    #[serde(rename = "leave-room")]
    LeaveRoom,
}

/// Server-to-client events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Current listing of public rooms waiting for an opponent
    #[serde(rename = "public-rooms")]
    PublicRooms { rooms: Vec<RoomSummary> },

    /// Room created; the caller holds the first seat
    #[serde(rename = "room-created")]
    RoomCreated {
        #[serde(rename = "roomId")]
        room_id: String,
    },

    /// The caller was seated in an existing room
    #[serde(rename = "room-joined")]
    RoomJoined {
        #[serde(rename = "roomId")]
        room_id: String,
    },

    /// Authoritative room state, sent after every state-affecting event
    #[serde(rename = "room-state")]
    RoomState(RoomStateSnapshot),

    /// The opponent asked for a rematch
    #[serde(rename = "rematch-requested")]
    RematchRequested,

    /// A lobby action was rejected
    #[serde(rename = "error")]
    Error { message: String },
}

/// Lobby listing projection of a room. Board content never appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: String,
    #[serde(rename = "isPublic")]
    pub is_public: bool,
    #[serde(rename = "playerCount")]
    pub player_count: usize,
    pub status: RoomStatus,
}

/// Canonical room-state payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomStateSnapshot {
    pub board: Board,
    #[serde(rename = "currentPlayer")]
    pub current_player: Mark,
    pub status: RoomStatus,
    pub winner: Option<Mark>,
    pub players: Vec<PlayerState>,
    #[serde(rename = "isDraw")]
    pub is_draw: bool,
}

/// Per-player slice of the room-state payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub name: String,
    pub symbol: Mark,
    #[serde(rename = "isCurrentPlayer")]
    pub is_current_player: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_events_parse_by_wire_name() {
        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"join-lobby","name":"alice"}"#).unwrap();
        assert!(matches!(parsed, ClientMessage::JoinLobby { ref name } if name == "alice"));

        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"create-room","isPublic":true,"name":"alice"}"#)
                .unwrap();
        assert!(matches!(parsed, ClientMessage::CreateRoom { is_public: true, .. }));

        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"join-room","roomId":"AB12CD","name":"bob"}"#).unwrap();
        assert!(matches!(parsed, ClientMessage::JoinRoom { ref room_id, .. } if room_id == "AB12CD"));

        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"make-move","roomId":"AB12CD","index":4}"#).unwrap();
        assert!(matches!(parsed, ClientMessage::MakeMove { index: 4, .. }));

        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"request-rematch","roomId":"AB12CD"}"#).unwrap();
        assert!(matches!(parsed, ClientMessage::RequestRematch { .. }));

        let parsed: ClientMessage = serde_json::from_str(r#"{"type":"leave-room"}"#).unwrap();
        assert!(matches!(parsed, ClientMessage::LeaveRoom));
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"spectate"}"#).is_err());
    }

    #[test]
    fn test_room_state_wire_shape() {
        let snapshot = RoomStateSnapshot {
            board: [
                Some(Mark::X),
                None,
                None,
                None,
                Some(Mark::O),
                None,
                None,
                None,
                None,
            ],
            current_player: Mark::X,
            status: RoomStatus::Playing,
            winner: None,
            players: vec![
                PlayerState {
                    name: "alice".to_string(),
                    symbol: Mark::X,
                    is_current_player: true,
                },
                PlayerState {
                    name: "bob".to_string(),
                    symbol: Mark::O,
                    is_current_player: false,
                },
            ],
            is_draw: false,
        };

        let value = serde_json::to_value(ServerMessage::RoomState(snapshot)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "room-state",
                "board": ["X", null, null, null, "O", null, null, null, null],
                "currentPlayer": "X",
                "status": "playing",
                "winner": null,
                "players": [
                    {"name": "alice", "symbol": "X", "isCurrentPlayer": true},
                    {"name": "bob", "symbol": "O", "isCurrentPlayer": false},
                ],
                "isDraw": false,
            })
        );
    }

    #[test]
    fn test_public_rooms_wire_shape() {
        let message = ServerMessage::PublicRooms {
            rooms: vec![RoomSummary {
                id: "AB12CD".to_string(),
                is_public: true,
                player_count: 1,
                status: RoomStatus::Waiting,
            }],
        };
        let value = serde_json::to_value(message).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "public-rooms",
                "rooms": [
                    {"id": "AB12CD", "isPublic": true, "playerCount": 1, "status": "waiting"},
                ],
            })
        );
    }

    #[test]
    fn test_rematch_requested_is_bare() {
        let value = serde_json::to_value(ServerMessage::RematchRequested).unwrap();
        assert_eq!(value, json!({"type": "rematch-requested"}));
    }
}
