//! # Snowdrift Engine
//!
//! Headless host for the snowball simulation.
//!
//! This crate ties together:
//! - Config: `snowdrift.toml` loading, saving and validation
//! - Timing: per-frame wall-clock deltas (measured or synthesized)
//! - Driver: a scripted session that throws, ticks and listens for impacts

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod driver;
pub mod timing;

pub use config::{EngineConfig, ThrowSpec, TreeSpec};
pub use driver::{HeadlessDriver, SessionReport};
pub use timing::FrameTiming;
