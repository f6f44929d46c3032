//! Core configuration.
//!
//! Loaded from JSON by the host app. Every field has a default, so `{}` is a
//! complete configuration.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{DbError, DbResult};
use crate::geo::WatchOptions;
use crate::models::{default_registry, ClinicRecord};
use crate::status::OpeningHours;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// What a listing does when one stored record cannot be decoded.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecodeErrorPolicy {
    /// Log the record and leave it out
    #[default]
    Skip,
    /// Fail the whole read
    Abort,
}

impl DecodeErrorPolicy {
    /// Turn a decode failure into `Ok(None)` under [`DecodeErrorPolicy::Skip`].
    ///
    /// Other errors always propagate.
    pub fn apply<T>(&self, result: DbResult<T>) -> DbResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(DbError::Decode { key, source }) if *self == DecodeErrorPolicy::Skip => {
                tracing::warn!(key = %key, error = %source, "Skipping corrupt record");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Refresh intervals of the recurring pollers, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollIntervals {
    /// SOS inbox rescan
    pub sos_inbox_ms: u64,
    /// Clinic hours clock
    pub clock_ms: u64,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            sos_inbox_ms: 5_000,
            clock_ms: 1_000,
        }
    }
}

impl PollIntervals {
    pub fn sos_inbox(&self) -> Duration {
        Duration::from_millis(self.sos_inbox_ms)
    }

    pub fn clock(&self) -> Duration {
        Duration::from_millis(self.clock_ms)
    }
}

/// Top-level configuration for the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoreConfig {
    pub on_decode_error: DecodeErrorPolicy,
    /// How many history entries the patient view shows
    pub history_limit: usize,
    pub poll: PollIntervals,
    pub location_watch: WatchOptions,
    pub hours: OpeningHours,
    /// Static clinic registry, in display order
    pub clinics: Vec<ClinicRecord>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            on_decode_error: DecodeErrorPolicy::default(),
            history_limit: 7,
            poll: PollIntervals::default(),
            location_watch: WatchOptions::default(),
            hours: OpeningHours::default(),
            clinics: default_registry(),
        }
    }
}

impl CoreConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: CoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.clinics.is_empty() {
            return Err(ConfigError::Invalid("clinic registry is empty".into()));
        }

        let mut seen = HashSet::new();
        for clinic in &self.clinics {
            if !seen.insert(clinic.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate clinic id: {}",
                    clinic.id
                )));
            }
            if !clinic.coordinates().is_valid() {
                return Err(ConfigError::Invalid(format!(
                    "clinic {} has invalid coordinates",
                    clinic.id
                )));
            }
        }

        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be positive".into()));
        }

        let intervals = [
            ("poll.sos_inbox_ms", self.poll.sos_inbox_ms),
            ("poll.clock_ms", self.poll.clock_ms),
            ("location_watch.time_interval_ms", self.location_watch.time_interval_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }

        self.hours.validate().map_err(ConfigError::Invalid)?;

        Ok(())
    }
}
