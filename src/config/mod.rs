//! Configuration module - environment variable parsing

mod game;

pub use game::GameConfig;

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::game::snapshot::SnapshotFormat;

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Human-readable or JSON log lines
    pub log_format: LogFormat,

    /// Allowed client origins for CORS (comma-separated); permissive when unset
    pub client_origin: Option<String>,

    /// Wire shape of per-tick game state broadcasts
    pub snapshot_format: SnapshotFormat,

    /// Gameplay tunables
    pub game: GameConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        };

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") | Err(_) => LogFormat::Pretty,
            Ok(_) => return Err(ConfigError::Invalid("LOG_FORMAT")),
        };

        let snapshot_format = match env::var("SNAPSHOT_FORMAT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("SNAPSHOT_FORMAT"))?,
            Err(_) => SnapshotFormat::default(),
        };

        let mut game = GameConfig::default();
        if let Some(cap) = parse_optional::<usize>("MAX_PLAYERS_PER_ROOM")? {
            if cap == 0 {
                return Err(ConfigError::Invalid("MAX_PLAYERS_PER_ROOM"));
            }
            game.max_players_per_room = cap;
        }

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format,
            client_origin: env::var("CLIENT_ORIGIN").ok().filter(|s| !s.trim().is_empty()),
            snapshot_format,
            game,
        })
    }
}

fn parse_optional<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
