//! Runtime configuration.
//!
//! Loaded from JSON; every field has a default so partial files work.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::parse_clock_time;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Organisation details printed at the top of every report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Letterhead {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl Default for Letterhead {
    fn default() -> Self {
        Self {
            name: "General Hospital".into(),
            address: "P.O. Box 1, Accra".into(),
            phone: "+233 30 000 0000".into(),
            email: "records@generalhospital.org".into(),
        }
    }
}

/// Prefixes for generated human-readable IDs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IdPrefixes {
    pub patient: String,
    pub staff: String,
    pub bed: String,
    pub attendance: String,
    pub invoice: String,
    pub sale: String,
}

impl Default for IdPrefixes {
    fn default() -> Self {
        Self {
            patient: "GH".into(),
            staff: "STF".into(),
            bed: "BED".into(),
            attendance: "ATT".into(),
            invoice: "INV".into(),
            sale: "SAL".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmrConfig {
    pub organization: Letterhead,
    /// Default rows per page on list screens
    pub page_size: usize,
    pub id_prefixes: IdPrefixes,
    /// Shift start as `HH:MM`; check-ins after start + grace are Late
    pub shift_start: String,
    pub late_grace_minutes: u32,
    /// Simulated latency before add/update/delete actions settle
    pub action_latency_ms: u64,
    /// How long a print surface stays up before it is torn down
    pub print_teardown_ms: u64,
}

impl Default for EmrConfig {
    fn default() -> Self {
        Self {
            organization: Letterhead::default(),
            page_size: crate::view::DEFAULT_PAGE_SIZE,
            id_prefixes: IdPrefixes::default(),
            shift_start: "08:00".into(),
            late_grace_minutes: 0,
            action_latency_ms: 500,
            print_teardown_ms: 1000,
        }
    }
}

impl EmrConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be greater than 0".into()));
        }
        if parse_clock_time(&self.shift_start).is_none() {
            return Err(ConfigError::Invalid(format!(
                "shift_start must be HH:MM, got {:?}",
                self.shift_start
            )));
        }
        let prefixes = &self.id_prefixes;
        for (name, prefix) in [
            ("patient", &prefixes.patient),
            ("staff", &prefixes.staff),
            ("bed", &prefixes.bed),
            ("attendance", &prefixes.attendance),
            ("invoice", &prefixes.invoice),
            ("sale", &prefixes.sale),
        ] {
            if prefix.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} id prefix is empty", name)));
            }
        }
        if prefixes.attendance == "ABS" {
            // Reserved for synthetic absent records
            return Err(ConfigError::Invalid("attendance id prefix ABS is reserved".into()));
        }
        Ok(())
    }

    /// Parsed shift start (08:00 if the stored value is invalid).
    pub fn shift_start_time(&self) -> NaiveTime {
        parse_clock_time(&self.shift_start)
            .unwrap_or_else(|| NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN))
    }

    pub fn action_latency(&self) -> Duration {
        Duration::from_millis(self.action_latency_ms)
    }

    pub fn print_teardown(&self) -> Duration {
        Duration::from_millis(self.print_teardown_ms)
    }
}
