//! The simulated snowball.
//!
//! A [`Projectile`] is plain data: position, velocity, timestamps and a small
//! trail buffer for rendering. Motion state is only ever mutated by the
//! [`Integrator`](crate::integrator::Integrator).

use std::collections::VecDeque;
use std::time::Duration;

use glam::Vec3;
use snowdrift_common::ProjectileId;

/// A snowball in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    id: ProjectileId,
    pub(crate) position: Vec3,
    pub(crate) velocity: Vec3,
    origin: Vec3,
    spawn_time: Duration,
    pub(crate) last_step_time: Duration,
    /// Simulated seconds integrated so far.
    pub(crate) sim_time: f32,
    /// Simulated time of the most recent trail sample.
    pub(crate) last_trail_sample: f32,
    /// Unsimulated time carried between step calls (seconds).
    pub(crate) carry: f32,
    pub(crate) bounces: u32,
    trail: VecDeque<Vec3>,
}

impl Projectile {
    /// Create a projectile at `position` moving with `velocity`.
    ///
    /// The spawn position is recorded as the first trail sample.
    #[must_use]
    pub fn new(id: ProjectileId, position: Vec3, velocity: Vec3, spawn_time: Duration) -> Self {
        let mut trail = VecDeque::with_capacity(8);
        trail.push_back(position);
        Self {
            id,
            position,
            velocity,
            origin: position,
            spawn_time,
            last_step_time: spawn_time,
            sim_time: 0.0,
            last_trail_sample: 0.0,
            carry: 0.0,
            bounces: 0,
            trail,
        }
    }

    /// Projectile ID.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Current speed.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Launch position.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Straight-line distance from the launch position.
    #[must_use]
    pub fn distance_from_origin(&self) -> f32 {
        self.position.distance(self.origin)
    }

    /// Clock time at which the projectile was launched.
    #[must_use]
    pub const fn spawn_time(&self) -> Duration {
        self.spawn_time
    }

    /// Clock time of the last step call.
    #[must_use]
    pub const fn last_step_time(&self) -> Duration {
        self.last_step_time
    }

    /// Age at clock time `now`.
    #[must_use]
    pub fn age(&self, now: Duration) -> Duration {
        now.saturating_sub(self.spawn_time)
    }

    /// Simulated flight time in seconds.
    #[must_use]
    pub const fn sim_time(&self) -> f32 {
        self.sim_time
    }

    /// Number of non-terminal ground bounces so far.
    #[must_use]
    pub const fn bounces(&self) -> u32 {
        self.bounces
    }

    /// Recent positions, oldest first.
    pub fn trail(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.trail.iter().copied()
    }

    /// Number of trail samples held.
    #[must_use]
    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Append a trail sample, evicting the oldest beyond `capacity`.
    pub(crate) fn record_trail(&mut self, capacity: usize) {
        self.trail.push_back(self.position);
        while self.trail.len() > capacity {
            self.trail.pop_front();
        }
        self.last_trail_sample = self.sim_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projectile() -> Projectile {
        Projectile::new(
            ProjectileId::FIRST,
            Vec3::new(0.0, 1.5, 0.0),
            Vec3::new(3.0, 4.0, 0.0),
            Duration::from_millis(500),
        )
    }

    #[test]
    fn test_projectile_creation() {
        let proj = projectile();
        assert_eq!(proj.position(), Vec3::new(0.0, 1.5, 0.0));
        assert_eq!(proj.origin(), proj.position());
        assert_eq!(proj.last_step_time(), proj.spawn_time());
        assert!((proj.speed() - 5.0).abs() < 1e-6);
        assert_eq!(proj.trail_len(), 1);
        assert_eq!(proj.bounces(), 0);
    }

    #[test]
    fn test_projectile_age() {
        let proj = projectile();
        assert_eq!(proj.age(Duration::from_millis(1500)), Duration::from_secs(1));
        assert_eq!(proj.age(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_trail_evicts_oldest() {
        let mut proj = projectile();
        for i in 0..12 {
            proj.position = Vec3::new(i as f32, 1.0, 0.0);
            proj.record_trail(8);
        }

        assert_eq!(proj.trail_len(), 8);
        let xs: Vec<f32> = proj.trail().map(|p| p.x).collect();
        assert_eq!(xs, vec![4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn test_distance_from_origin() {
        let mut proj = projectile();
        proj.position += Vec3::new(3.0, 0.0, 4.0);
        assert!((proj.distance_from_origin() - 5.0).abs() < 1e-5);
    }
}
