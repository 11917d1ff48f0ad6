//! Fixed-step snowball integration.
//!
//! Each call to [`Integrator::step`] turns one wall-clock frame delta into a
//! whole number of fixed sub-steps. Every sub-step runs, in order:
//!
//! 1. an obstacle lookahead ray along this step's travel,
//! 2. gravity,
//! 3. speed-proportional drag,
//! 4. position integration,
//! 5. the ground check (terminal impact or bounce),
//! 6. trail sampling.
//!
//! The first terminal outcome ends the call, so a projectile can register at
//! most one impact per step, always the earliest in simulated time.

use std::time::Duration;

use glam::Vec3;
use tracing::trace;

use crate::config::IntegratorTuning;
use crate::projectile::Projectile;
use crate::world_query::{TagFilter, WorldQuery};

/// Guards `floor(delta / step)` against f32 rounding at exact multiples.
const STEP_EPSILON: f32 = 1e-4;

/// Result of stepping a projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Still flying.
    Continuing,
    /// Hit a collidable obstacle at the given point.
    ObstacleImpact(Vec3),
    /// Hit the ground at the given point.
    GroundImpact(Vec3),
    /// Lifetime ran out.
    Expired,
}

impl StepOutcome {
    /// Check if the projectile's life is over.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continuing)
    }

    /// Impact point, for impacts.
    #[must_use]
    pub const fn impact_point(&self) -> Option<Vec3> {
        match self {
            Self::ObstacleImpact(point) | Self::GroundImpact(point) => Some(*point),
            Self::Continuing | Self::Expired => None,
        }
    }
}

/// Advances projectiles through time.
#[derive(Debug, Clone, Default)]
pub struct Integrator {
    tuning: IntegratorTuning,
}

impl Integrator {
    /// Create an integrator with the given tuning.
    #[must_use]
    pub fn new(tuning: IntegratorTuning) -> Self {
        Self { tuning }
    }

    /// Current tuning.
    #[must_use]
    pub const fn tuning(&self) -> &IntegratorTuning {
        &self.tuning
    }

    /// Clamp a raw frame delta into the accepted range.
    ///
    /// NaN is treated as the minimum delta.
    #[must_use]
    pub fn clamp_delta(&self, wall_dt: f32) -> f32 {
        if wall_dt.is_nan() {
            return self.tuning.min_delta;
        }
        wall_dt.clamp(self.tuning.min_delta, self.tuning.max_delta)
    }

    /// Number of whole fixed steps that fit in `delta` seconds.
    #[must_use]
    pub fn sub_steps(&self, delta: f32) -> u32 {
        (delta / self.tuning.fixed_step + STEP_EPSILON).floor().max(0.0) as u32
    }

    /// Advance `projectile` by one frame of `wall_dt` seconds ending at clock
    /// time `now`.
    pub fn step<Q>(
        &self,
        projectile: &mut Projectile,
        now: Duration,
        wall_dt: f32,
        query: &Q,
    ) -> StepOutcome
    where
        Q: WorldQuery + ?Sized,
    {
        if projectile.age(now) > self.tuning.lifetime() {
            return StepOutcome::Expired;
        }
        projectile.last_step_time = now;

        let h = self.tuning.fixed_step;
        let delta = self.clamp_delta(wall_dt);
        let steps = if self.tuning.accumulate_remainder {
            let available = delta + projectile.carry;
            let steps = self.sub_steps(available);
            projectile.carry = (available - steps as f32 * h).clamp(0.0, h);
            steps
        } else {
            self.sub_steps(delta)
        };

        for _ in 0..steps {
            if let Some(outcome) = self.sub_step(projectile, h, query) {
                return outcome;
            }
        }

        StepOutcome::Continuing
    }

    /// One fixed step; returns a terminal outcome if one occurred.
    fn sub_step<Q>(&self, projectile: &mut Projectile, h: f32, query: &Q) -> Option<StepOutcome>
    where
        Q: WorldQuery + ?Sized,
    {
        let t = &self.tuning;

        // Obstacle lookahead, before any motion is applied.
        let travel = projectile.velocity * h;
        let travel_len = travel.length();
        if travel_len > f32::EPSILON {
            if let Some(hit) = query.raycast(projectile.position, travel, TagFilter::Collidable) {
                if hit.distance < t.obstacle_lookahead * travel_len {
                    let point = if hit.point.is_finite() {
                        hit.point
                    } else {
                        projectile.position
                    };
                    return Some(StepOutcome::ObstacleImpact(point));
                }
            }
        }

        projectile.velocity.y -= t.gravity * h;

        let speed = projectile.velocity.length();
        if speed > 0.0 {
            projectile.velocity *= (1.0 - t.drag * speed * h).max(0.0);
        }

        let previous_y = projectile.position.y;
        projectile.position += projectile.velocity * h;
        projectile.sim_time += h;

        if projectile.position.y < t.ground_height {
            projectile.position.y = t.ground_height;

            if projectile.velocity.y < -t.impact_speed && previous_y > t.ground_height {
                return Some(StepOutcome::GroundImpact(projectile.position));
            }
            if projectile.velocity.y < 0.0 {
                self.bounce(projectile);
            }
        }

        if projectile.sim_time - projectile.last_trail_sample + f32::EPSILON >= t.trail_interval() {
            projectile.record_trail(t.trail_capacity);
        }

        None
    }

    /// Reflect and damp a weak ground contact.
    fn bounce(&self, projectile: &mut Projectile) {
        let t = &self.tuning;
        let v = &mut projectile.velocity;
        v.y = -v.y * t.bounce_restitution;
        v.x *= t.bounce_friction;
        v.z *= t.bounce_friction;
        projectile.bounces += 1;
        trace!(id = %projectile.id(), vy = projectile.velocity.y, "snowball bounced");
    }
}
