//! # Sequencing Configuration

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::algorithms::DEFAULT_EXPIRING_DAYS;
use crate::domain::{DEFAULT_VALIDITY_YEARS, DEFAULT_WARNING_THRESHOLD, MAX_VALIDITY_YEARS};

/// Default bounded wait for a sequence row lock, in milliseconds.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 50;

/// Sequencing service configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencingConfig {
    /// Longest wait for a row lock before failing with `LockConflict`.
    pub lock_timeout_ms: u64,

    /// Validity used when a document type carries none (`validity_years == 0`).
    pub default_validity_years: u32,

    /// Warning threshold for sequences created without one.
    pub default_warning_threshold: u64,

    /// Look-ahead for expiring-soon alerts.
    pub expiring_alert_days: i64,
}

impl Default for SequencingConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            default_validity_years: DEFAULT_VALIDITY_YEARS,
            default_warning_threshold: DEFAULT_WARNING_THRESHOLD,
            expiring_alert_days: DEFAULT_EXPIRING_DAYS,
        }
    }
}

impl SequencingConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NCF_LOCK_TIMEOUT_MS` (default: 50)
    /// - `NCF_DEFAULT_VALIDITY_YEARS` (default: 2)
    /// - `NCF_DEFAULT_WARNING_THRESHOLD` (default: 50)
    /// - `NCF_EXPIRING_ALERT_DAYS` (default: 30)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            lock_timeout_ms: env_or("NCF_LOCK_TIMEOUT_MS", defaults.lock_timeout_ms),
            default_validity_years: env_or(
                "NCF_DEFAULT_VALIDITY_YEARS",
                defaults.default_validity_years,
            )
            .clamp(1, MAX_VALIDITY_YEARS),
            default_warning_threshold: env_or(
                "NCF_DEFAULT_WARNING_THRESHOLD",
                defaults.default_warning_threshold,
            ),
            expiring_alert_days: env_or("NCF_EXPIRING_ALERT_DAYS", defaults.expiring_alert_days),
        }
    }

    /// Create a config for testing: short lock wait so conflict tests run fast.
    pub fn for_testing() -> Self {
        Self {
            lock_timeout_ms: 10,
            ..Self::default()
        }
    }

    /// Row lock wait as a [`Duration`].
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
