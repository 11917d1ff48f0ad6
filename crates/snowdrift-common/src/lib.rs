//! # Snowdrift Common
//!
//! Common types shared by the Snowdrift crates:
//! - ID types (ProjectileId, ObstacleId)
//! - Error taxonomy
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_projectile_id_sequence() {
        let first = ProjectileId::FIRST;
        let second = first.next();
        assert_ne!(first, second);
        assert_eq!(second.raw(), 2);
        assert!(first.is_valid());
        assert!(!ProjectileId::NULL.is_valid());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(ProjectileId::from_raw(7).to_string(), "snowball#7");
        assert_eq!(ObstacleId::new(3).to_string(), "obstacle#3");
    }

    #[test]
    fn test_launch_error_message() {
        let err = LaunchError::CooldownActive {
            remaining: Duration::from_millis(150),
        };
        assert_eq!(err.to_string(), "launch cooldown active, 150ms remaining");

        let top: SnowdriftError = err.into();
        assert!(matches!(top, SnowdriftError::Launch(_)));
    }
}
