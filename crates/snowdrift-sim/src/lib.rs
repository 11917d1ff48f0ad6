//! # Snowdrift Sim
//!
//! Hand-rolled snowball simulation, independent of any rigid-body engine.
//!
//! This crate provides:
//! - Throw shaping (aim + power → initial velocity with a controlled arc)
//! - Fixed-step integration with gravity and speed-proportional drag
//! - Ray-based obstacle collision through an injected [`WorldQuery`]
//! - Ground impact / bounce policy and lifetime expiry
//! - A manager that enforces the launch cooldown and emits impact events
//!
//! ## Driving the simulation
//!
//! The host calls [`ProjectileManager::tick`] once per frame with the measured
//! wall-clock delta. Stepping is single-threaded and synchronous; there are no
//! background threads and no I/O.
//!
//! ```
//! use glam::Vec3;
//! use snowdrift_sim::prelude::*;
//!
//! let mut manager = ProjectileManager::new().with_seed(7);
//! let mut scene = ObstacleField::new();
//! scene.insert_tree(Vec3::new(0.0, 0.0, -30.0), 0.5, 8.0);
//!
//! let id = manager
//!     .launch(LaunchRequest::new(Vec3::new(0.0, 1.5, 0.0), Vec3::NEG_Z, 0.5))
//!     .expect("no cooldown on the first throw");
//!
//! let events = manager.tick(1.0 / 60.0, &scene);
//! assert!(events.is_empty());
//! assert!(manager.trail(id).is_some());
//! ```
//!
//! [`WorldQuery`]: world_query::WorldQuery
//! [`ProjectileManager::tick`]: manager::ProjectileManager::tick

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod events;
pub mod integrator;
pub mod launcher;
pub mod manager;
pub mod obstacles;
pub mod projectile;
pub mod world_query;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::events::*;
    pub use crate::integrator::*;
    pub use crate::launcher::*;
    pub use crate::manager::*;
    pub use crate::obstacles::*;
    pub use crate::projectile::*;
    pub use crate::world_query::*;
}

pub use prelude::*;
