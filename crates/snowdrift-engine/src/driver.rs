//! Headless session driver.
//!
//! Plays the role of the host game loop: builds the scene from config, fires
//! scripted throws on the simulation clock, ticks the manager once per frame
//! and consumes impact events from the bus the way an audio/VFX listener
//! would.

use std::collections::VecDeque;

use snowdrift_common::LaunchError;
use snowdrift_sim::events::{EventBus, ImpactKind, ProjectileEvent};
use snowdrift_sim::launcher::LaunchRequest;
use snowdrift_sim::manager::ProjectileManager;
use snowdrift_sim::obstacles::ObstacleField;
use tracing::{debug, info};

use crate::config::{EngineConfig, ThrowSpec};
use crate::timing::FrameTiming;

/// Totals collected over one headless session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Frames simulated
    pub frames: u64,
    /// Throws accepted by the manager
    pub launched: u32,
    /// Throws rejected by the cooldown
    pub rejected: u32,
    /// Snowballs that hit the ground
    pub ground_impacts: u32,
    /// Snowballs that hit an obstacle
    pub obstacle_impacts: u32,
    /// Snowballs that timed out (only counted with expiry events on)
    pub expired: u32,
    /// Events received through the bus
    pub bus_delivered: u32,
    /// Snowballs still in flight when the session ended
    pub live_at_end: usize,
}

impl SessionReport {
    /// Every terminal event seen during the session.
    #[must_use]
    pub fn finished(&self) -> u32 {
        self.ground_impacts + self.obstacle_impacts + self.expired
    }

    fn record(&mut self, event: &ProjectileEvent) {
        match event.impact_kind() {
            Some(ImpactKind::Ground) => self.ground_impacts += 1,
            Some(ImpactKind::Obstacle) => self.obstacle_impacts += 1,
            None => self.expired += 1,
        }
    }
}

/// Drives a [`ProjectileManager`] through a scripted session.
#[derive(Debug)]
pub struct HeadlessDriver {
    manager: ProjectileManager,
    scene: ObstacleField,
    bus: EventBus,
    timing: FrameTiming,
    throws: VecDeque<ThrowSpec>,
    player_position: glam::Vec3,
    camera_forward: glam::Vec3,
    session_seconds: f32,
}

impl HeadlessDriver {
    /// Build a driver from configuration.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
        let bus = EventBus::new(config.event_capacity);

        let manager = ProjectileManager::from_config(&config.sim)
            .with_seed(seed)
            .with_event_sender(bus.sender());

        let mut scene = ObstacleField::new();
        for tree in &config.trees {
            scene.insert_tree(tree.base, tree.radius, tree.height);
        }

        let timing = FrameTiming::new(config.frame_rate)
            .with_realtime(config.realtime)
            .with_jitter(config.frame_jitter, seed);

        let mut throws: Vec<ThrowSpec> = config.throws.clone();
        throws.sort_by(|a, b| a.at.total_cmp(&b.at));

        debug!(
            seed,
            trees = scene.len(),
            throws = throws.len(),
            "headless driver ready"
        );

        Self {
            manager,
            scene,
            bus,
            timing,
            throws: throws.into(),
            player_position: config.player_position,
            camera_forward: config.camera_forward,
            session_seconds: config.session_seconds,
        }
    }

    /// The simulated scene.
    #[must_use]
    pub fn scene(&self) -> &ObstacleField {
        &self.scene
    }

    /// The projectile manager.
    #[must_use]
    pub fn manager(&self) -> &ProjectileManager {
        &self.manager
    }

    /// Run frames until the session length has elapsed on the sim clock.
    pub fn run(&mut self) -> SessionReport {
        let mut report = SessionReport::default();
        self.timing.reset();

        info!(
            seconds = self.session_seconds,
            fps = self.timing.target_fps(),
            "session started"
        );

        while self.manager.now().as_secs_f32() < self.session_seconds {
            self.frame(&mut report);
            self.timing.sleep_remainder();
        }

        report.live_at_end = self.manager.len();
        info!(
            frames = report.frames,
            launched = report.launched,
            rejected = report.rejected,
            ground = report.ground_impacts,
            obstacle = report.obstacle_impacts,
            expired = report.expired,
            live = report.live_at_end,
            fps = self.timing.current_fps(),
            "session finished"
        );
        report
    }

    /// Simulate one frame: fire due throws, tick, drain the bus.
    pub fn frame(&mut self, report: &mut SessionReport) {
        self.fire_due_throws(report);

        let dt = self.timing.delta_time();
        let events = self.manager.tick(dt, &self.scene);
        for event in &events {
            report.record(event);
        }

        for event in self.bus.drain() {
            report.bus_delivered += 1;
            match event {
                ProjectileEvent::Impact { id, position, kind } => {
                    info!(%id, ?kind, x = position.x, y = position.y, z = position.z, "impact");
                },
                ProjectileEvent::Expired { id, .. } => {
                    debug!(%id, "expired");
                },
            }
        }

        report.frames += 1;
    }

    fn fire_due_throws(&mut self, report: &mut SessionReport) {
        let now = self.manager.now().as_secs_f32();
        while self.throws.front().is_some_and(|t| t.at <= now) {
            let Some(throw) = self.throws.pop_front() else {
                break;
            };
            let request = LaunchRequest::new(self.player_position, throw.aim, throw.power)
                .with_camera_forward(self.camera_forward);

            match self.manager.launch(request) {
                Ok(id) => {
                    report.launched += 1;
                    debug!(%id, at = throw.at, "scripted throw");
                },
                Err(LaunchError::CooldownActive { remaining }) => {
                    report.rejected += 1;
                    debug!(
                        at = throw.at,
                        remaining_ms = remaining.as_millis() as u64,
                        "scripted throw rejected"
                    );
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use snowdrift_sim::config::LaunchTuning;

    use super::*;
    use crate::config::TreeSpec;

    fn quiet_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.seed = Some(42);
        config.frame_jitter = 0.0;
        config.sim.emit_expiry_events = true;
        config.sim.launch = LaunchTuning::default().without_jitter();
        config
    }

    #[test]
    fn test_default_session_accounts_for_every_throw() {
        let config = quiet_config();
        let mut driver = HeadlessDriver::new(&config);
        let report = driver.run();

        assert_eq!(report.launched, 4);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.live_at_end, 0);
        assert_eq!(report.finished(), 4);
        assert_eq!(report.bus_delivered, 4);
        assert!(report.frames >= 900);
    }

    #[test]
    fn test_tree_in_path_is_hit() {
        let mut config = quiet_config();
        config.session_seconds = 2.0;
        config.trees = vec![TreeSpec {
            base: Vec3::new(0.0, 0.0, -10.0),
            radius: 1.0,
            height: 10.0,
        }];
        config.throws = vec![ThrowSpec {
            at: 0.0,
            aim: Vec3::NEG_Z,
            power: 0.5,
        }];

        let report = HeadlessDriver::new(&config).run();
        assert_eq!(report.launched, 1);
        assert_eq!(report.obstacle_impacts, 1);
        assert_eq!(report.ground_impacts, 0);
    }

    #[test]
    fn test_small_bus_drops_but_report_counts_everything() {
        let mut config = quiet_config();
        config.event_capacity = 1;
        config.sim.launch_cooldown_ms = 0;
        config.trees.clear();
        // Same-frame throws land on the same frame.
        config.throws = (0..3)
            .map(|_| ThrowSpec {
                at: 0.0,
                aim: Vec3::new(0.0, -1.0, -0.2),
                power: 0.0,
            })
            .collect();
        config.session_seconds = 2.0;

        let report = HeadlessDriver::new(&config).run();
        assert_eq!(report.launched, 3);
        assert_eq!(report.finished(), 3);
        assert!(report.bus_delivered < 3);
    }

    #[test]
    fn test_frame_advances_clock() {
        let mut config = quiet_config();
        config.throws.clear();
        let mut driver = HeadlessDriver::new(&config);
        let mut report = SessionReport::default();

        driver.frame(&mut report);
        driver.frame(&mut report);

        assert_eq!(report.frames, 2);
        assert!((driver.manager().now().as_secs_f32() - 2.0 / 60.0).abs() < 1e-4);
        assert!(driver.manager().is_empty());
    }

    #[test]
    fn test_scene_is_built_from_config() {
        let config = quiet_config();
        let driver = HeadlessDriver::new(&config);
        assert_eq!(driver.scene().len(), config.trees.len());
    }
}
