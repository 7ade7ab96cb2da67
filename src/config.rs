//! Server configuration module
//! Handles runtime parameters for the matchmaking server

use std::env;

use crate::constants::{DEFAULT_ALLOWED_ORIGIN, DEFAULT_HOST, DEFAULT_PORT};
use crate::error::{NoughtsError, Result};

/// Server configuration parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to reach the server, comma-separated in the
    /// environment
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables if available
    pub fn from_env() -> Result<Self> {
        let host = env::var("NOUGHTS_HOST").unwrap_or(DEFAULT_HOST.to_string());

        let port = env::var("NOUGHTS_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let allowed_origins = Self::parse_origins(
            &env::var("NOUGHTS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGIN.to_string()),
        );

        if allowed_origins.is_empty() {
            return Err(NoughtsError::ConfigError(
                "NOUGHTS_ALLOWED_ORIGINS must name at least one origin".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            allowed_origins,
        })
    }

    fn parse_origins(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_splits_and_trims() {
        let origins =
            ServerConfig::parse_origins("http://localhost:3000, https://play.example.com ,");
        assert_eq!(
            origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://play.example.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_origins_empty_input() {
        assert!(ServerConfig::parse_origins(" , ").is_empty());
    }
}
