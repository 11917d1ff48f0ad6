//! Engine configuration.
//!
//! Holds the simulation tuning plus the headless session setup (frame rate,
//! scene trees, scripted throws). Configuration can be loaded from and saved
//! to a toml file.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use snowdrift_common::{ConfigError, SnowdriftResult};
use snowdrift_sim::config::SimConfig;
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "snowdrift.toml";

/// Environment variable overriding the config path.
const CONFIG_ENV: &str = "SNOWDRIFT_CONFIG";

/// A tree placed in the scene at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    /// Trunk base position
    pub base: Vec3,
    /// Trunk radius
    pub radius: f32,
    /// Trunk height
    pub height: f32,
}

/// A throw fired by the headless driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrowSpec {
    /// Session time at which to throw (seconds)
    pub at: f32,
    /// Aim direction
    pub aim: Vec3,
    /// Throw power
    pub power: f32,
}

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Session ===
    /// Simulated frames per second
    pub frame_rate: u32,
    /// Max fraction of a frame by which synthetic deltas vary
    pub frame_jitter: f32,
    /// Pace frames against the wall clock
    pub realtime: bool,
    /// Session length in seconds
    pub session_seconds: f32,
    /// RNG seed (None = random)
    pub seed: Option<u64>,
    /// Impact event bus capacity
    pub event_capacity: usize,

    // === Player ===
    /// Throw origin
    pub player_position: Vec3,
    /// Camera forward used as the aim fallback
    pub camera_forward: Vec3,

    // === Scene ===
    /// Trees placed at startup
    pub trees: Vec<TreeSpec>,
    /// Scripted throws
    pub throws: Vec<ThrowSpec>,

    // === Simulation ===
    /// Snowball tuning
    pub sim: SimConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            frame_jitter: 0.25,
            realtime: false,
            session_seconds: 15.0,
            seed: None,
            event_capacity: 256,

            player_position: Vec3::new(0.0, 1.5, 0.0),
            camera_forward: Vec3::NEG_Z,

            trees: vec![
                TreeSpec {
                    base: Vec3::new(0.0, 0.0, -14.0),
                    radius: 0.6,
                    height: 9.0,
                },
                TreeSpec {
                    base: Vec3::new(6.0, 0.0, -25.0),
                    radius: 0.8,
                    height: 12.0,
                },
            ],
            throws: vec![
                ThrowSpec {
                    at: 0.1,
                    aim: Vec3::new(0.0, 0.1, -1.0),
                    power: 0.3,
                },
                // Inside the cooldown of the first throw.
                ThrowSpec {
                    at: 0.15,
                    aim: Vec3::new(0.0, 0.1, -1.0),
                    power: 0.3,
                },
                ThrowSpec {
                    at: 1.0,
                    aim: Vec3::new(1.0, 0.4, 0.0),
                    power: 0.6,
                },
                ThrowSpec {
                    at: 2.0,
                    aim: Vec3::Y,
                    power: 0.1,
                },
                ThrowSpec {
                    at: 3.0,
                    aim: Vec3::new(0.0, -0.6, -1.0),
                    power: 0.2,
                },
            ],

            sim: SimConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default file location.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::read(path) {
            Ok(mut config) => {
                config.validate();
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    fn read(path: &Path) -> SnowdriftResult<Self> {
        let mut contents = String::new();
        fs::File::open(path)?.read_to_string(&mut contents)?;
        let config = Self::from_toml(&contents)?;
        Ok(config)
    }

    /// Parse configuration from toml text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to toml text.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Save configuration to the default file location.
    pub fn save(&self) -> io::Result<()> {
        self.save_to(Self::config_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = self
            .to_toml()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the configuration file path.
    fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from)
    }

    /// Validate and clamp configuration values to sensible ranges.
    ///
    /// Non-finite numbers fall back to their defaults; trees and throws with
    /// non-finite values are dropped.
    pub fn validate(&mut self) {
        let defaults = Self::default();
        if !self.frame_jitter.is_finite() {
            self.frame_jitter = defaults.frame_jitter;
        }
        if !self.session_seconds.is_finite() {
            self.session_seconds = defaults.session_seconds;
        }
        if !self.player_position.is_finite() {
            self.player_position = defaults.player_position;
        }
        if !self.camera_forward.is_finite() {
            self.camera_forward = defaults.camera_forward;
        }

        self.frame_rate = self.frame_rate.clamp(10, 480);
        self.frame_jitter = self.frame_jitter.clamp(0.0, 0.9);
        self.session_seconds = self.session_seconds.clamp(0.1, 600.0);
        self.event_capacity = self.event_capacity.clamp(1, 65_536);

        self.trees
            .retain(|t| t.base.is_finite() && t.radius.is_finite() && t.height.is_finite());
        for tree in &mut self.trees {
            tree.radius = tree.radius.clamp(0.05, 10.0);
            tree.height = tree.height.clamp(0.1, 100.0);
        }
        self.throws
            .retain(|t| t.at.is_finite() && t.power.is_finite() && t.aim.is_finite());
        for throw in &mut self.throws {
            throw.at = throw.at.max(0.0);
            throw.power = throw.power.max(0.0);
        }
        self.throws.sort_by(|a, b| a.at.total_cmp(&b.at));

        self.sim.validate();
    }
}
