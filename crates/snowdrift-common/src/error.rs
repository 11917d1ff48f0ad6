//! Error types for Snowdrift.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type for Snowdrift operations.
#[derive(Debug, Error)]
pub enum SnowdriftError {
    /// Launch was refused
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a throw request is refused by the projectile manager.
///
/// A rejected launch is not fatal; the caller decides whether to retry or
/// drop the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LaunchError {
    /// The launch cooldown since the last accepted throw has not elapsed.
    #[error("launch cooldown active, {}ms remaining", remaining.as_millis())]
    CooldownActive {
        /// Time left until the next launch is accepted
        remaining: Duration,
    },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Config could not be serialized
    #[error("Failed to serialize config: {0}")]
    Serialize(String),
}

/// Result type alias for Snowdrift operations.
pub type SnowdriftResult<T> = Result<T, SnowdriftError>;
