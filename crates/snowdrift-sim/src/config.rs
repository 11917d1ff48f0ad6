//! Tunable constants for the snowball simulation.
//!
//! Every number the launcher, integrator and manager use lives here so a host
//! can override it from its own config file. Defaults reproduce the stock
//! snowball feel.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Parameters that shape the initial velocity of a throw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchTuning {
    /// Speed at zero power (world units/second)
    pub min_speed: f32,
    /// Speed at a scaled power of 1.0 (world units/second)
    pub max_speed: f32,
    /// Powers at or below this value are treated as normalized input
    pub normalized_power_ceiling: f32,
    /// Multiplier applied to normalized power
    pub normalized_power_scale: f32,
    /// Vertical lift before the power curve is applied
    pub base_lift: f32,
    /// Power curve offset (lift fraction at zero power)
    pub power_curve_base: f32,
    /// Power curve gain per unit of scaled power
    pub power_curve_gain: f32,
    /// Vertical velocity added per unit of vertical aim
    pub vertical_aim_gain: f32,
    /// Vertical aim below which the throw counts as aimed downward
    pub downward_aim_threshold: f32,
    /// How fast lift fades as the aim tilts further down
    pub downward_lift_falloff: f32,
    /// Maximum random jitter on x/z
    pub jitter_horizontal: f32,
    /// Maximum random jitter on y
    pub jitter_vertical: f32,
}

impl Default for LaunchTuning {
    fn default() -> Self {
        Self {
            min_speed: 20.0,
            max_speed: 100.0,
            normalized_power_ceiling: 1.0,
            normalized_power_scale: 3.0,
            base_lift: 12.0,
            power_curve_base: 0.4,
            power_curve_gain: 0.6,
            vertical_aim_gain: 25.0,
            downward_aim_threshold: -0.3,
            downward_lift_falloff: 2.0,
            jitter_horizontal: 0.25,
            jitter_vertical: 0.15,
        }
    }
}

impl LaunchTuning {
    /// Returns a copy with jitter disabled (repeatable throws).
    #[must_use]
    pub fn without_jitter(mut self) -> Self {
        self.jitter_horizontal = 0.0;
        self.jitter_vertical = 0.0;
        self
    }
}

/// Parameters for the fixed-step projectile integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorTuning {
    /// Fixed sub-step size in seconds
    pub fixed_step: f32,
    /// Smallest wall-clock delta accepted per step call (seconds)
    pub min_delta: f32,
    /// Largest wall-clock delta accepted per step call (seconds)
    pub max_delta: f32,
    /// Downward acceleration (world units/second^2)
    pub gravity: f32,
    /// Speed-proportional damping coefficient
    pub drag: f32,
    /// Height of the ground plane the projectile is clamped to
    pub ground_height: f32,
    /// Downward speed above which a floor crossing is a terminal impact
    pub impact_speed: f32,
    /// Fraction of vertical speed kept after a bounce
    pub bounce_restitution: f32,
    /// Fraction of lateral speed kept after a bounce
    pub bounce_friction: f32,
    /// Obstacle hits closer than this many step lengths count as impacts
    pub obstacle_lookahead: f32,
    /// Maximum number of trail samples kept
    pub trail_capacity: usize,
    /// Simulated time between trail samples (milliseconds)
    pub trail_interval_ms: u32,
    /// Projectile lifetime (milliseconds)
    pub lifetime_ms: u64,
    /// Carry the sub-step remainder into the next step call
    pub accumulate_remainder: bool,
}

impl Default for IntegratorTuning {
    fn default() -> Self {
        Self {
            fixed_step: 1.0 / 60.0,
            min_delta: 0.001,
            max_delta: 0.05,
            gravity: 25.0,
            drag: 0.003,
            ground_height: 0.2,
            impact_speed: 0.5,
            bounce_restitution: 0.2,
            bounce_friction: 0.7,
            obstacle_lookahead: 2.0,
            trail_capacity: 8,
            trail_interval_ms: 15,
            lifetime_ms: 12_000,
            accumulate_remainder: false,
        }
    }
}

impl IntegratorTuning {
    /// Projectile lifetime as a duration.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }

    /// Trail sampling interval in seconds.
    #[must_use]
    pub fn trail_interval(&self) -> f32 {
        self.trail_interval_ms as f32 / 1000.0
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Launch shaping
    pub launch: LaunchTuning,
    /// Integration and collision
    pub integrator: IntegratorTuning,
    /// Minimum time between accepted launches (milliseconds)
    pub launch_cooldown_ms: u64,
    /// Emit an event when a projectile expires mid-air
    pub emit_expiry_events: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            launch: LaunchTuning::default(),
            integrator: IntegratorTuning::default(),
            launch_cooldown_ms: 200,
            emit_expiry_events: false,
        }
    }
}

impl SimConfig {
    /// Launch cooldown as a duration.
    #[must_use]
    pub fn launch_cooldown(&self) -> Duration {
        Duration::from_millis(self.launch_cooldown_ms)
    }

    /// Validate and clamp configuration values to sensible ranges.
    ///
    /// Non-finite values (toml accepts `nan` and `inf`) are reset to their
    /// defaults first.
    pub fn validate(&mut self) {
        self.reset_non_finite();

        let launch = &mut self.launch;
        launch.min_speed = launch.min_speed.clamp(0.0, 1000.0);
        launch.max_speed = launch.max_speed.clamp(launch.min_speed, 1000.0);
        launch.normalized_power_ceiling = launch.normalized_power_ceiling.clamp(0.0, 10.0);
        launch.normalized_power_scale = launch.normalized_power_scale.clamp(0.0, 10.0);
        launch.jitter_horizontal = launch.jitter_horizontal.clamp(0.0, 5.0);
        launch.jitter_vertical = launch.jitter_vertical.clamp(0.0, 5.0);

        let integrator = &mut self.integrator;
        integrator.fixed_step = integrator.fixed_step.clamp(1.0 / 1000.0, 0.1);
        integrator.min_delta = integrator.min_delta.clamp(0.0001, 0.1);
        integrator.max_delta = integrator.max_delta.clamp(integrator.min_delta, 0.5);
        integrator.gravity = integrator.gravity.clamp(0.0, 500.0);
        integrator.drag = integrator.drag.clamp(0.0, 1.0);
        integrator.impact_speed = integrator.impact_speed.max(0.0);
        integrator.bounce_restitution = integrator.bounce_restitution.clamp(0.0, 1.0);
        integrator.bounce_friction = integrator.bounce_friction.clamp(0.0, 1.0);
        integrator.obstacle_lookahead = integrator.obstacle_lookahead.clamp(0.0, 16.0);
        integrator.trail_capacity = integrator.trail_capacity.clamp(1, 256);
        integrator.lifetime_ms = integrator.lifetime_ms.clamp(100, 600_000);

        self.launch_cooldown_ms = self.launch_cooldown_ms.min(10_000);
    }

    fn reset_non_finite(&mut self) {
        let d = LaunchTuning::default();
        let l = &mut self.launch;
        for (value, fallback) in [
            (&mut l.min_speed, d.min_speed),
            (&mut l.max_speed, d.max_speed),
            (&mut l.normalized_power_ceiling, d.normalized_power_ceiling),
            (&mut l.normalized_power_scale, d.normalized_power_scale),
            (&mut l.base_lift, d.base_lift),
            (&mut l.power_curve_base, d.power_curve_base),
            (&mut l.power_curve_gain, d.power_curve_gain),
            (&mut l.vertical_aim_gain, d.vertical_aim_gain),
            (&mut l.downward_aim_threshold, d.downward_aim_threshold),
            (&mut l.downward_lift_falloff, d.downward_lift_falloff),
            (&mut l.jitter_horizontal, d.jitter_horizontal),
            (&mut l.jitter_vertical, d.jitter_vertical),
        ] {
            finite_or(value, fallback);
        }

        let d = IntegratorTuning::default();
        let i = &mut self.integrator;
        for (value, fallback) in [
            (&mut i.fixed_step, d.fixed_step),
            (&mut i.min_delta, d.min_delta),
            (&mut i.max_delta, d.max_delta),
            (&mut i.gravity, d.gravity),
            (&mut i.drag, d.drag),
            (&mut i.ground_height, d.ground_height),
            (&mut i.impact_speed, d.impact_speed),
            (&mut i.bounce_restitution, d.bounce_restitution),
            (&mut i.bounce_friction, d.bounce_friction),
            (&mut i.obstacle_lookahead, d.obstacle_lookahead),
        ] {
            finite_or(value, fallback);
        }
    }
}

fn finite_or(value: &mut f32, fallback: f32) {
    if !value.is_finite() {
        *value = fallback;
    }
}
