//! Application configuration read from the environment.
//!
//! Unparseable values fall back to their defaults with a warning. An unknown
//! storage backend or classification policy stops startup.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use bp_tracker_data::database::DatabaseConfig;
use bp_tracker_domain::entities::Capabilities;
use bp_tracker_domain::services::tracker::DEFAULT_DISPLAY_OFFSET_MINUTES;
use bp_tracker_domain::services::{ClassificationPolicy, TrackerOptions};
use chrono::FixedOffset;
use thiserror::Error;
use tracing::{info, warn};

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default print hook delay in milliseconds
pub const DEFAULT_PRINT_DELAY_MS: u64 = 250;

/// Configuration errors that stop startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown storage backend: {0} (expected sqlite or memory)")]
    UnknownStorageBackend(String),

    #[error("Unknown classification policy: {0} (expected legacy or guideline)")]
    UnknownPolicy(String),
}

/// Where readings and settings are persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::UnknownStorageBackend(other.to_string())),
        }
    }
}

/// Everything the binary needs to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub storage: StorageBackend,
    pub database: DatabaseConfig,
    pub tracker: TrackerOptions,
}

impl AppConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_var(&lookup, "PORT").unwrap_or(DEFAULT_PORT);

        let storage = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => StorageBackend::default(),
        };

        let policy = match lookup("BP_CLASSIFICATION_POLICY") {
            Some(raw) => raw
                .parse::<ClassificationPolicy>()
                .map_err(|_| ConfigError::UnknownPolicy(raw.trim().to_string()))?,
            None => ClassificationPolicy::default(),
        };
        if policy == ClassificationPolicy::Guideline {
            info!("Guideline classification policy enabled");
        }

        let offset_minutes =
            parse_var(&lookup, "DISPLAY_UTC_OFFSET_MINUTES").unwrap_or(DEFAULT_DISPLAY_OFFSET_MINUTES);
        let defaults = TrackerOptions::default();
        let display_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                warn!("Display offset of {} minutes is out of range, using default", offset_minutes);
                defaults.display_offset
            });

        let capabilities = Capabilities {
            show_charts: parse_flag(&lookup, "BP_SHOW_CHARTS").unwrap_or(true),
            show_medication_flag: parse_flag(&lookup, "BP_SHOW_MEDICATION").unwrap_or(true),
        };

        let print_delay = Duration::from_millis(
            parse_var(&lookup, "REPORT_PRINT_DELAY_MS").unwrap_or(DEFAULT_PRINT_DELAY_MS),
        );

        Ok(Self {
            port,
            storage,
            database: DatabaseConfig::from_lookup(&lookup),
            tracker: TrackerOptions {
                capabilities,
                policy,
                display_offset,
                print_delay,
            },
        })
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {}", name, raw);
            None
        }
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<bool> {
    let raw = lookup(name)?;
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => {
            warn!("Ignoring invalid value for {}: {}", name, raw);
            None
        }
    }
}
