use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_CELLS, ROOM_ID_ALPHABET, ROOM_ID_LEN};
use crate::core::board::{self, Board, Mark};
use crate::core::message_types::{PlayerState, RoomStateSnapshot, RoomSummary};

/// Maximum number of seats in a room
pub const ROOM_CAPACITY: usize = 2;

/// Lifecycle of a game room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// A seat inside a room. Holds the connection id as a reference to the
/// session-side player record, never ownership; the record can die first.
#[derive(Debug, Clone)]
pub struct PlayerSeat {
    pub connection_id: String,
    pub name: String,
    pub mark: Mark,
}

/// One game session: board, turn tracking and up to two seated players
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub is_public: bool,
    pub board: Board,
    pub current_turn: Mark,
    pub status: RoomStatus,
    pub winner: Option<Mark>,
    pub moves: u8,
    /// Seat order is join order; removal is the only reordering
    pub players: Vec<PlayerSeat>,
}

impl Room {
    pub fn new(id: String, is_public: bool) -> Self {
        Self {
            id,
            is_public,
            board: board::empty_board(),
            current_turn: Mark::X,
            status: RoomStatus::Waiting,
            winner: None,
            moves: 0,
            players: Vec::with_capacity(ROOM_CAPACITY),
        }
    }

    /// Seat a player. The first seat taken gets X and the second O,
    /// decided by the list length at call time, not by any history
    /// across resets. Fails without effect when the room is full.
    /// Filling the second seat starts the game.
    pub fn add_player(&mut self, connection_id: String, name: String) -> bool {
        if self.players.len() >= ROOM_CAPACITY {
            return false;
        }
        let mark = if self.players.is_empty() { Mark::X } else { Mark::O };
        self.players.push(PlayerSeat {
            connection_id,
            name,
            mark,
        });
        if self.players.len() == ROOM_CAPACITY {
            self.status = RoomStatus::Playing;
        }
        true
    }

    /// Unseat a player by connection id. An emptied room resets fully
    /// back to waiting; a room that keeps one player is left exactly as
    /// it was, board and status included.
    pub fn remove_player(&mut self, connection_id: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|seat| seat.connection_id != connection_id);
        if self.players.len() == before {
            return false;
        }
        if self.players.is_empty() {
            self.reset();
        }
        true
    }

    /// The seat held by a connection, if any
    pub fn seat(&self, connection_id: &str) -> Option<&PlayerSeat> {
        self.players
            .iter()
            .find(|seat| seat.connection_id == connection_id)
    }

    /// Apply a move for the given connection. Returns false without
    /// touching the board on any rule violation: room not in play, caller
    /// not seated, out-of-turn mark, or an unplayable cell.
    pub fn make_move(&mut self, index: usize, connection_id: &str) -> bool {
        if self.status != RoomStatus::Playing {
            return false;
        }
        let mark = match self.seat(connection_id) {
            Some(seat) => seat.mark,
            None => return false,
        };
        if mark != self.current_turn {
            return false;
        }
        let next = match board::apply_move(&self.board, index, mark) {
            Some(next) => next,
            None => return false,
        };
        self.board = next;
        self.moves += 1;
        self.winner = board::check_winner(&self.board);
        if self.winner.is_some() || self.moves as usize == BOARD_CELLS {
            self.status = RoomStatus::Finished;
        } else {
            self.current_turn = self.current_turn.other();
        }
        true
    }

    /// Clear the game back to a fresh board: turn X, no winner, no moves.
    /// Playing with a full table, waiting otherwise.
    pub fn reset(&mut self) {
        self.board = board::empty_board();
        self.current_turn = Mark::X;
        self.winner = None;
        self.moves = 0;
        self.status = if self.players.len() == ROOM_CAPACITY {
            RoomStatus::Playing
        } else {
            RoomStatus::Waiting
        };
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= ROOM_CAPACITY
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Lobby-facing projection; never includes board content
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            is_public: self.is_public,
            player_count: self.players.len(),
            status: self.status,
        }
    }

    /// The canonical room-state payload, computed fresh on every call
    pub fn state_snapshot(&self) -> RoomStateSnapshot {
        RoomStateSnapshot {
            board: self.board,
            current_player: self.current_turn,
            status: self.status,
            winner: self.winner,
            players: self
                .players
                .iter()
                .map(|seat| PlayerState {
                    name: seat.name.clone(),
                    symbol: seat.mark,
                    is_current_player: seat.mark == self.current_turn,
                })
                .collect(),
            is_draw: board::is_draw(&self.board, self.moves),
        }
    }
}

/// Registry of all live rooms
pub struct RoomManager {
    rooms: HashMap<String, Room>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    /// Generate a short shareable room id, retrying until it is not held
    /// by a live room
    pub fn generate_room_id(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let id: String = (0..ROOM_ID_LEN)
                .map(|_| ROOM_ID_ALPHABET[rng.gen_range(0..ROOM_ID_ALPHABET.len())] as char)
                .collect();
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }

    /// Create a room and return a mutable handle to it
    pub fn create_room(&mut self, is_public: bool) -> &mut Room {
        let id = self.generate_room_id();
        self.rooms
            .entry(id.clone())
            .or_insert_with(|| Room::new(id, is_public))
    }

    pub fn get(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &str) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    /// Delete a room outright
    pub fn remove(&mut self, room_id: &str) -> Option<Room> {
        self.rooms.remove(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Every public room still waiting for an opponent
    pub fn list_public_waiting(&self) -> Vec<RoomSummary> {
        self.rooms
            .values()
            .filter(|room| room.is_public && room.status == RoomStatus::Waiting)
            .map(Room::summary)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_match_wire_format() {
        let manager = RoomManager::new();
        for _ in 0..100 {
            let id = manager.generate_room_id();
            assert_eq!(id.len(), ROOM_ID_LEN);
            assert!(id
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_create_room_registers_unique_ids() {
        let mut manager = RoomManager::new();
        let first = manager.create_room(true).id.clone();
        let second = manager.create_room(true).id.clone();
        assert_ne!(first, second);
        assert_eq!(manager.room_count(), 2);
        assert!(manager.get(&first).is_some());
    }

    #[test]
    fn test_public_waiting_listing_excludes_private_and_started() {
        let mut manager = RoomManager::new();
        let public_id = manager.create_room(true).id.clone();
        manager.create_room(false);

        let started = manager.create_room(true);
        started.add_player("a".to_string(), "alice".to_string());
        started.add_player("b".to_string(), "bob".to_string());

        let listing = manager.list_public_waiting();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].id, public_id);
        assert_eq!(listing[0].status, RoomStatus::Waiting);
    }
}
