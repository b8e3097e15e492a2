use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::ServerError;

/// Runtime settings. Every flag can also come from the environment.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about)]
pub struct ServerConfig {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = crate::constants::DEFAULT_PORT)]
    pub port: u16,
    #[arg(long, env = "SPAWN_INTERVAL_MS", default_value_t = crate::constants::SPAWN_INTERVAL_MS)]
    pub spawn_interval_ms: u64,
    #[arg(long, env = "SPAWN_SEED")]
    pub spawn_seed: Option<u64>,
    #[arg(long, env = "PLAY_AREA_WIDTH", default_value_t = crate::constants::PLAY_AREA_WIDTH)]
    pub play_area_width: i64,
    #[arg(long, env = "PLAY_AREA_HEIGHT", default_value_t = crate::constants::PLAY_AREA_HEIGHT)]
    pub play_area_height: i64,
    #[arg(long, env = "COLLECTIBLE_MIN_VALUE", default_value_t = crate::constants::COLLECTIBLE_MIN_VALUE)]
    pub collectible_min_value: u64,
    #[arg(long, env = "COLLECTIBLE_MAX_VALUE", default_value_t = crate::constants::COLLECTIBLE_MAX_VALUE)]
    pub collectible_max_value: u64,
    /// Keep players inside the play area instead of letting them roam freely.
    #[arg(long, env = "CLAMP_TO_PLAY_AREA")]
    pub clamp_to_play_area: bool,
    #[arg(long, env = "CLIENT_QUEUE_CAPACITY", default_value_t = crate::constants::CLIENT_QUEUE_CAPACITY)]
    pub client_queue_capacity: usize,
    /// Consecutive frames a client may miss on a full queue before it is
    /// disconnected.
    #[arg(long, env = "MAX_DROPPED_FRAMES", default_value_t = crate::constants::MAX_DROPPED_FRAMES)]
    pub max_dropped_frames: u32,
    #[arg(long, env = "HEARTBEAT_INTERVAL_MS", default_value_t = crate::constants::HEARTBEAT_INTERVAL_MS)]
    pub heartbeat_interval_ms: u64,
    /// A client silent for longer than this (not even answering pings) is
    /// disconnected.
    #[arg(long, env = "CLIENT_TIMEOUT_MS", default_value_t = crate::constants::CLIENT_TIMEOUT_MS)]
    pub client_timeout_ms: u64,
    /// Directory holding `index.html`, served at `/` and under `/public`.
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
    /// Fallback filter when `RUST_LOG` is unset.
    #[arg(long, env = "LOG_FILTER", default_value = "info")]
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: crate::constants::DEFAULT_PORT,
            spawn_interval_ms: crate::constants::SPAWN_INTERVAL_MS,
            spawn_seed: None,
            play_area_width: crate::constants::PLAY_AREA_WIDTH,
            play_area_height: crate::constants::PLAY_AREA_HEIGHT,
            collectible_min_value: crate::constants::COLLECTIBLE_MIN_VALUE,
            collectible_max_value: crate::constants::COLLECTIBLE_MAX_VALUE,
            clamp_to_play_area: false,
            client_queue_capacity: crate::constants::CLIENT_QUEUE_CAPACITY,
            max_dropped_frames: crate::constants::MAX_DROPPED_FRAMES,
            heartbeat_interval_ms: crate::constants::HEARTBEAT_INTERVAL_MS,
            client_timeout_ms: crate::constants::CLIENT_TIMEOUT_MS,
            static_dir: None,
            log_filter: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.spawn_interval_ms == 0 {
            return Err(ServerError::InvalidConfig(
                "spawn interval must be positive".to_string(),
            ));
        }
        if self.play_area_width <= 0 || self.play_area_height <= 0 {
            return Err(ServerError::InvalidConfig(format!(
                "play area {}x{} is empty",
                self.play_area_width, self.play_area_height
            )));
        }
        if self.collectible_min_value == 0
            || self.collectible_min_value > self.collectible_max_value
        {
            return Err(ServerError::InvalidConfig(format!(
                "collectible value range {}..={} is invalid",
                self.collectible_min_value, self.collectible_max_value
            )));
        }
        if self.client_queue_capacity == 0 {
            return Err(ServerError::InvalidConfig(
                "client queue capacity must be positive".to_string(),
            ));
        }
        if self.heartbeat_interval_ms == 0 || self.client_timeout_ms <= self.heartbeat_interval_ms {
            return Err(ServerError::InvalidConfig(format!(
                "client timeout {}ms must exceed heartbeat interval {}ms",
                self.client_timeout_ms, self.heartbeat_interval_ms
            )));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_game() {
        let config = ServerConfig::try_parse_from(["server"]).expect("defaults should parse");
        assert_eq!(config.spawn_interval(), Duration::from_secs(10));
        assert_eq!((config.play_area_width, config.play_area_height), (600, 400));
        assert_eq!(
            (config.collectible_min_value, config.collectible_max_value),
            (1, 10)
        );
        assert!(!config.clamp_to_play_area);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "server",
            "--port",
            "4100",
            "--host",
            "127.0.0.1",
            "--spawn-seed",
            "9",
            "--clamp-to-play-area",
        ])
        .expect("flags should parse");
        assert_eq!(config.bind_addr(), "127.0.0.1:4100");
        assert_eq!(config.spawn_seed, Some(9));
        assert!(config.clamp_to_play_area);
    }

    #[test]
    fn validate_rejects_degenerate_settings() {
        let cases = [
            ServerConfig {
                spawn_interval_ms: 0,
                ..ServerConfig::default()
            },
            ServerConfig {
                play_area_width: 0,
                ..ServerConfig::default()
            },
            ServerConfig {
                collectible_min_value: 5,
                collectible_max_value: 2,
                ..ServerConfig::default()
            },
            ServerConfig {
                collectible_min_value: 0,
                ..ServerConfig::default()
            },
            ServerConfig {
                client_queue_capacity: 0,
                ..ServerConfig::default()
            },
            ServerConfig {
                heartbeat_interval_ms: 0,
                ..ServerConfig::default()
            },
            ServerConfig {
                heartbeat_interval_ms: 5_000,
                client_timeout_ms: 5_000,
                ..ServerConfig::default()
            },
        ];
        for config in cases {
            assert!(matches!(
                config.validate(),
                Err(ServerError::InvalidConfig(_))
            ));
        }
    }
}
