//! Session lifecycle configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Session lifecycle configuration
///
/// Controls how long session records live in the store and how many
/// sessions a single user may hold before the oldest are evicted.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session record TTL in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum concurrent sessions per user
    #[serde(default = "default_max_sessions")]
    pub max_sessions_per_user: u64,

    /// Default client-facing session timeout in minutes
    #[serde(default = "default_timeout_minutes")]
    pub default_timeout_minutes: u32,

    /// Minimum accepted session timeout in minutes
    #[serde(default = "default_min_timeout_minutes")]
    pub min_timeout_minutes: u32,

    /// Maximum accepted session timeout in minutes
    #[serde(default = "default_max_timeout_minutes")]
    pub max_timeout_minutes: u32,
}

impl SessionConfig {
    /// Get the session TTL as a Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ttl_secs == 0 {
            return Err(ValidationError::InvalidSessionTtl);
        }
        if self.max_sessions_per_user == 0 {
            return Err(ValidationError::InvalidMaxSessions);
        }
        if self.min_timeout_minutes > self.max_timeout_minutes
            || self.default_timeout_minutes < self.min_timeout_minutes
            || self.default_timeout_minutes > self.max_timeout_minutes
        {
            return Err(ValidationError::InvalidTimeoutBounds);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_sessions_per_user: default_max_sessions(),
            default_timeout_minutes: default_timeout_minutes(),
            min_timeout_minutes: default_min_timeout_minutes(),
            max_timeout_minutes: default_max_timeout_minutes(),
        }
    }
}

// 7 days
fn default_ttl_secs() -> u64 {
    604_800
}

fn default_max_sessions() -> u64 {
    50
}

// 3 hours
fn default_timeout_minutes() -> u32 {
    180
}

fn default_min_timeout_minutes() -> u32 {
    60
}

// 8 hours
fn default_max_timeout_minutes() -> u32 {
    480
}
