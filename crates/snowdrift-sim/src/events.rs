//! Projectile events and the bus that carries them to effect/audio systems.

use crossbeam_channel::{bounded, Receiver, Sender};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use snowdrift_common::ProjectileId;

/// What a terminal impact hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpactKind {
    /// The ground plane.
    Ground,
    /// A collidable scene obstacle.
    Obstacle,
}

/// Events emitted by the projectile manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectileEvent {
    /// A projectile hit something and was removed.
    Impact {
        /// Projectile ID
        id: ProjectileId,
        /// Impact position
        position: Vec3,
        /// Surface kind
        kind: ImpactKind,
    },
    /// A projectile reached the end of its lifetime and was removed.
    ///
    /// Only emitted when `SimConfig::emit_expiry_events` is set.
    Expired {
        /// Projectile ID
        id: ProjectileId,
        /// Last position
        position: Vec3,
    },
}

impl ProjectileEvent {
    /// Projectile the event refers to.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        match self {
            Self::Impact { id, .. } | Self::Expired { id, .. } => *id,
        }
    }

    /// Position the event happened at.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        match self {
            Self::Impact { position, .. } | Self::Expired { position, .. } => *position,
        }
    }

    /// Impact kind, if this is an impact.
    #[must_use]
    pub const fn impact_kind(&self) -> Option<ImpactKind> {
        match self {
            Self::Impact { kind, .. } => Some(*kind),
            Self::Expired { .. } => None,
        }
    }
}

/// Bounded fire-and-forget channel for projectile events.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<ProjectileEvent>,
    receiver: Receiver<ProjectileEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    ///
    /// Never blocks; the event is dropped if the bus is full.
    pub fn publish(&self, event: ProjectileEvent) {
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<ProjectileEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<ProjectileEvent> {
        self.sender.clone()
    }

    /// Creates a new receiver handle, e.g. for an audio thread.
    #[must_use]
    pub fn receiver(&self) -> Receiver<ProjectileEvent> {
        self.receiver.clone()
    }
}
