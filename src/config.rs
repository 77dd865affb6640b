use crate::ledger::parse_date_key;
use chrono::NaiveDate;
use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";

/// Startup settings, read once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    /// Enables the fake-day and clear-history routes.
    pub debug: bool,
    /// Pins "today" to a fixed date instead of the local clock.
    pub fixed_today: Option<NaiveDate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            debug: false,
            fixed_today: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            match port.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => warn!("invalid PORT {port:?}, using {DEFAULT_PORT}"),
            }
        }
        if let Some(path) = lookup("APP_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }
        if let Some(flag) = lookup("WATER_TRACKER_DEBUG") {
            config.debug = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(date) = lookup("WATER_TRACKER_TODAY") {
            config.fixed_today = parse_date_key(&date);
            if config.fixed_today.is_none() {
                warn!("ignoring WATER_TRACKER_TODAY {date:?}, expected YYYY-MM-DD");
            }
        }

        config
    }
}
