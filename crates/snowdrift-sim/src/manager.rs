//! Projectile manager.
//!
//! Owns every live snowball, gates throws behind a cooldown, drives the
//! integrator once per host frame and turns terminal outcomes into events.
//!
//! The manager keeps its own monotonic clock, advanced by [`tick`]. Cooldown,
//! spawn time and lifetime are all measured on that clock, so nothing here
//! reads the system time.
//!
//! [`tick`]: ProjectileManager::tick

use std::collections::HashMap;
use std::time::Duration;

use crossbeam_channel::Sender;
use glam::Vec3;
use snowdrift_common::{LaunchError, ProjectileId};
use tracing::{debug, trace};

use crate::config::{LaunchTuning, SimConfig};
use crate::events::{ImpactKind, ProjectileEvent};
use crate::integrator::{Integrator, StepOutcome};
use crate::launcher::{launch_velocity, LaunchRequest};
use crate::projectile::Projectile;
use crate::world_query::WorldQuery;

/// Owner of all live projectiles.
#[derive(Debug)]
pub struct ProjectileManager {
    live: HashMap<ProjectileId, Projectile>,
    next_id: ProjectileId,
    clock: Duration,
    last_launch: Option<Duration>,
    cooldown: Duration,
    emit_expiry_events: bool,
    launch: LaunchTuning,
    integrator: Integrator,
    rng: fastrand::Rng,
    events: Option<Sender<ProjectileEvent>>,
}

impl Default for ProjectileManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectileManager {
    /// Create a manager with default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&SimConfig::default())
    }

    /// Create a manager from a configuration.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            live: HashMap::new(),
            next_id: ProjectileId::FIRST,
            clock: Duration::ZERO,
            last_launch: None,
            cooldown: config.launch_cooldown(),
            emit_expiry_events: config.emit_expiry_events,
            launch: config.launch.clone(),
            integrator: Integrator::new(config.integrator.clone()),
            rng: fastrand::Rng::new(),
            events: None,
        }
    }

    /// Seed the jitter RNG for reproducible throws.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Publish every emitted event to `sender` as well as returning it.
    #[must_use]
    pub fn with_event_sender(mut self, sender: Sender<ProjectileEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Current manager clock.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.clock
    }

    /// Time left before the next launch is accepted, if any.
    #[must_use]
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        let last = self.last_launch?;
        let ready_at = last.saturating_add(self.cooldown);
        (self.clock < ready_at).then(|| ready_at - self.clock)
    }

    /// Throw a snowball.
    ///
    /// Rejected without side effects while the launch cooldown is active.
    pub fn launch(&mut self, request: LaunchRequest) -> Result<ProjectileId, LaunchError> {
        if let Some(remaining) = self.cooldown_remaining() {
            trace!(remaining_ms = remaining.as_millis() as u64, "launch rejected: cooldown");
            return Err(LaunchError::CooldownActive { remaining });
        }

        let velocity = launch_velocity(&request, &self.launch, &mut self.rng);
        let mut origin = request.origin;
        origin.y = origin.y.max(self.integrator.tuning().ground_height);

        let id = self.next_id;
        self.next_id = id.next();
        self.live
            .insert(id, Projectile::new(id, origin, velocity, self.clock));
        self.last_launch = Some(self.clock);

        debug!(
            %id,
            power = request.power,
            speed = velocity.length(),
            live = self.live.len(),
            "snowball launched"
        );
        Ok(id)
    }

    /// Advance the clock by `wall_dt` seconds and step every live projectile.
    ///
    /// Terminal projectiles are removed before this returns. Returns the
    /// events emitted this tick, ordered by projectile ID.
    pub fn tick<Q>(&mut self, wall_dt: f32, query: &Q) -> Vec<ProjectileEvent>
    where
        Q: WorldQuery + ?Sized,
    {
        self.clock = self.clock.saturating_add(clock_advance(wall_dt));
        let now = self.clock;

        let mut finished: Vec<(ProjectileId, StepOutcome)> = Vec::new();
        for (id, projectile) in &mut self.live {
            let outcome = self.integrator.step(projectile, now, wall_dt, query);
            if outcome.is_terminal() {
                finished.push((*id, outcome));
            }
        }
        finished.sort_unstable_by_key(|(id, _)| *id);

        let mut events = Vec::with_capacity(finished.len());
        for (id, outcome) in finished {
            let Some(projectile) = self.live.remove(&id) else {
                continue;
            };
            if let Some(event) = self.terminal_event(&projectile, outcome) {
                events.push(event);
            }
        }

        if let Some(sender) = &self.events {
            for event in &events {
                // Fire-and-forget: a full or closed bus never stalls the simulation.
                let _ = sender.try_send(event.clone());
            }
        }

        trace!(live = self.live.len(), events = events.len(), "tick");
        events
    }

    fn terminal_event(
        &self,
        projectile: &Projectile,
        outcome: StepOutcome,
    ) -> Option<ProjectileEvent> {
        let id = projectile.id();
        match outcome {
            StepOutcome::GroundImpact(position) => {
                debug!(%id, ?position, bounces = projectile.bounces(), "snowball hit ground");
                Some(ProjectileEvent::Impact {
                    id,
                    position,
                    kind: ImpactKind::Ground,
                })
            },
            StepOutcome::ObstacleImpact(position) => {
                debug!(%id, ?position, "snowball hit obstacle");
                Some(ProjectileEvent::Impact {
                    id,
                    position,
                    kind: ImpactKind::Obstacle,
                })
            },
            StepOutcome::Expired => {
                debug!(
                    %id,
                    age_ms = projectile.age(self.clock).as_millis() as u64,
                    "snowball expired"
                );
                self.emit_expiry_events.then(|| ProjectileEvent::Expired {
                    id,
                    position: projectile.position(),
                })
            },
            StepOutcome::Continuing => None,
        }
    }

    /// Get a live projectile by ID.
    #[must_use]
    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.live.get(&id)
    }

    /// Snapshot of a projectile's trail, oldest first.
    #[must_use]
    pub fn trail(&self, id: ProjectileId) -> Option<Vec<Vec3>> {
        self.live.get(&id).map(|p| p.trail().collect())
    }

    /// Iterate over live projectiles.
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.live.values()
    }

    /// Force-remove a projectile. No event is emitted.
    pub fn remove(&mut self, id: ProjectileId) -> Option<Projectile> {
        self.live.remove(&id)
    }

    /// Number of live projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Check if no projectiles are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Clear all projectiles.
    pub fn clear(&mut self) {
        self.live.clear();
    }
}

/// Clock advance for a host delta: NaN and negative add nothing, anything
/// too large for a `Duration` saturates.
fn clock_advance(wall_dt: f32) -> Duration {
    if wall_dt.is_nan() || wall_dt <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(wall_dt).unwrap_or(Duration::MAX)
}
