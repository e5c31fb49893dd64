//! Process configuration read from the environment.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults.
//! - Malformed values are errors, never silently replaced.
//! - The admin secret is read verbatim; an unset or empty value disables reset.

use log::info;
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use votebox_core::{default_log_level, AdminSecret};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_PATH: &str = "votebox.sqlite3";
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "https://semana-tecnica-votos.netlify.app",
    "http://localhost:5173",
    "http://127.0.0.1:5173",
];

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid {key} value `{value}`"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub seed_path: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub cors_origins: Vec<String>,
    pub admin_secret: AdminSecret,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from any key lookup; `load` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: raw,
            })?,
            None => {
                info!("event=config_default module=config key=PORT value={DEFAULT_PORT}");
                DEFAULT_PORT
            }
        };

        let cors_origins = match var("VOTEBOX_CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            port,
            db_path: var("VOTEBOX_DB_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from),
            seed_path: var("VOTEBOX_SEED_PATH").map(PathBuf::from),
            log_level: var("VOTEBOX_LOG_LEVEL")
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: var("VOTEBOX_LOG_DIR"),
            cors_origins,
            // Not trimmed: the comparison is exact.
            admin_secret: lookup("ADMIN_SECRET").map_or_else(AdminSecret::disabled, AdminSecret::new),
        })
    }
}
