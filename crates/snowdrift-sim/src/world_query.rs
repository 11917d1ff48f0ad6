//! Scene query interface used for obstacle collision.
//!
//! The integrator never walks a scene graph itself. The host implements
//! [`WorldQuery`] over whatever spatial index it keeps; [`ObstacleField`]
//! (see [`crate::obstacles`]) is a ready-made implementation.
//!
//! [`ObstacleField`]: crate::obstacles::ObstacleField

use glam::Vec3;

/// Which scene objects a ray should consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagFilter {
    /// Only objects tagged as collidable obstacles.
    #[default]
    Collidable,
    /// Every object in the scene.
    Any,
}

impl TagFilter {
    /// Check whether an object with the given collidable tag passes.
    #[must_use]
    pub const fn accepts(self, collidable: bool) -> bool {
        match self {
            Self::Collidable => collidable,
            Self::Any => true,
        }
    }
}

/// Nearest intersection along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space hit point.
    pub point: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
}

/// Synchronous, read-only ray query against scene geometry.
pub trait WorldQuery {
    /// Cast a ray from `origin` along `direction` and return the nearest hit
    /// among objects passing `filter`.
    ///
    /// `direction` does not have to be normalized; `distance` in the result is
    /// measured in world units.
    fn raycast(&self, origin: Vec3, direction: Vec3, filter: TagFilter) -> Option<RayHit>;
}

impl<T: WorldQuery + ?Sized> WorldQuery for &T {
    fn raycast(&self, origin: Vec3, direction: Vec3, filter: TagFilter) -> Option<RayHit> {
        (**self).raycast(origin, direction, filter)
    }
}

/// An absent query service never reports a hit.
impl<T: WorldQuery> WorldQuery for Option<T> {
    fn raycast(&self, origin: Vec3, direction: Vec3, filter: TagFilter) -> Option<RayHit> {
        self.as_ref()
            .and_then(|query| query.raycast(origin, direction, filter))
    }
}

/// Query for an empty scene (only the ground plane exists).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObstacles;

impl WorldQuery for NoObstacles {
    fn raycast(&self, _origin: Vec3, _direction: Vec3, _filter: TagFilter) -> Option<RayHit> {
        None
    }
}
