//! Process-level configuration for the desktop binary.
//!
//! Study preferences (theme, daily goal, ...) live in the database as
//! [`Settings`](crate::models::Settings); this only covers where data lives and
//! how the process starts.

use log::warn;
use std::path::PathBuf;

pub const ENV_DATABASE: &str = "KOREAN_SRS_DB";
pub const ENV_QUEUE_LIMIT: &str = "KOREAN_SRS_QUEUE_LIMIT";
pub const ENV_SEED: &str = "KOREAN_SRS_SEED";
pub const ENV_LOG: &str = "RUST_LOG";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// SQLite file holding decks, cards, settings and review logs
    pub database_path: PathBuf,
    /// Maximum number of cards pulled into one review session
    pub queue_limit: usize,
    /// Insert the starter Korean decks when the database has no cards
    pub seed_on_empty: bool,
    /// env_logger filter used when RUST_LOG is not set
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("korean_srs.sqlite3"),
            queue_limit: 100,
            seed_on_empty: true,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATABASE).filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(ENV_QUEUE_LIMIT) {
            match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => config.queue_limit = limit,
                _ => warn!(
                    "Ignoring {}={:?}, expected a positive integer",
                    ENV_QUEUE_LIMIT, raw
                ),
            }
        }

        if let Some(raw) = lookup(ENV_SEED) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.seed_on_empty = true,
                "0" | "false" | "no" | "off" => config.seed_on_empty = false,
                _ => warn!("Ignoring {}={:?}, expected true/false", ENV_SEED, raw),
            }
        }

        if let Some(filter) = lookup(ENV_LOG).filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }

        config
    }
}
