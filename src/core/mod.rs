//! Core functionality for the matchmaking server

pub mod board;
pub mod connection;
pub mod message_handler;
pub mod message_types;
pub mod room;
pub mod server;
pub mod session;

// Re-export main components for convenience
pub use board::{Board, Mark};
pub use connection::Connection;
pub use message_handler::MessageHandler;
pub use message_types::{ClientMessage, ServerMessage};
pub use room::{Room, RoomManager, RoomStatus};
pub use server::{GameServer, SharedGameServer};
pub use session::{Player, SessionManager};
