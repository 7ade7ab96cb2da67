use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum NoughtsError {
    // Session errors
    SessionNotFound(String),

    // Connection errors
    ConnectionError(String),
    ConnectionClosed,

    // Message errors
    MessageParseError(String),

    // Room errors
    RoomNotFound,
    RoomFull,
    GameInProgress,

    // Configuration errors
    ConfigError(String),
}

impl fmt::Display for NoughtsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionNotFound(id) => write!(f, "Session not found: {}", id),
            Self::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            Self::ConnectionClosed => write!(f, "Connection closed unexpectedly"),
            Self::MessageParseError(msg) => write!(f, "Message parse error: {}", msg),
            // The room variants double as client-facing error payloads,
            // so their wording is part of the wire contract.
            Self::RoomNotFound => write!(f, "Room not found"),
            Self::RoomFull => write!(f, "Room is full"),
            Self::GameInProgress => write!(f, "Game already in progress"),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for NoughtsError {}

// Generic result type for the crate
pub type Result<T> = std::result::Result<T, NoughtsError>;
