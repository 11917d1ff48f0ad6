//! Movable collidable obstacles and a ray query over them.
//!
//! [`ObstacleField`] is the reference [`WorldQuery`] implementation: a flat
//! collection of tagged shapes (tree trunks, rocks, walls) that the host can
//! move between ticks. A linear scan is plenty for the handful of obstacles a
//! snowball scene holds.

use std::collections::HashMap;

use glam::Vec3;
use snowdrift_common::ObstacleId;
use tracing::debug;

use crate::world_query::{RayHit, TagFilter, WorldQuery};

const PARALLEL_EPSILON: f32 = 1e-6;

/// Geometric shape of an obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleShape {
    /// Sphere (rocks, snowmen).
    Sphere {
        /// Center point
        center: Vec3,
        /// Radius
        radius: f32,
    },
    /// Axis-aligned box (walls, crates).
    Aabb {
        /// Minimum corner
        min: Vec3,
        /// Maximum corner
        max: Vec3,
    },
    /// Upright cylinder standing on `base` (tree trunks).
    Cylinder {
        /// Center of the bottom cap
        base: Vec3,
        /// Trunk radius
        radius: f32,
        /// Height above the base
        height: f32,
    },
}

impl ObstacleShape {
    /// Reference point used when moving the shape.
    #[must_use]
    pub fn anchor(&self) -> Vec3 {
        match *self {
            Self::Sphere { center, .. } => center,
            Self::Aabb { min, max } => (min + max) * 0.5,
            Self::Cylinder { base, .. } => base,
        }
    }

    /// Return the shape translated by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec3) -> Self {
        match *self {
            Self::Sphere { center, radius } => Self::Sphere {
                center: center + offset,
                radius,
            },
            Self::Aabb { min, max } => Self::Aabb {
                min: min + offset,
                max: max + offset,
            },
            Self::Cylinder {
                base,
                radius,
                height,
            } => Self::Cylinder {
                base: base + offset,
                radius,
                height,
            },
        }
    }

    /// Distance along a unit-length ray to the first surface, 0 if the origin
    /// is inside.
    #[must_use]
    pub fn ray_distance(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        match *self {
            Self::Sphere { center, radius } => ray_sphere(origin, dir, center, radius),
            Self::Aabb { min, max } => ray_aabb(origin, dir, min, max),
            Self::Cylinder {
                base,
                radius,
                height,
            } => ray_cylinder(origin, dir, base, radius, height),
        }
    }
}

/// A tagged obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Shape in world space
    pub shape: ObstacleShape,
    /// Whether snowballs collide with it
    pub collidable: bool,
}

/// Collection of obstacles keyed by ID.
#[derive(Debug, Default)]
pub struct ObstacleField {
    obstacles: HashMap<ObstacleId, Obstacle>,
    next_id: u32,
}

impl ObstacleField {
    /// Create an empty field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an obstacle.
    pub fn insert(&mut self, shape: ObstacleShape, collidable: bool) -> ObstacleId {
        let id = ObstacleId::new(self.next_id);
        self.next_id += 1;
        self.obstacles.insert(id, Obstacle { shape, collidable });
        id
    }

    /// Add a collidable tree trunk.
    pub fn insert_tree(&mut self, base: Vec3, radius: f32, height: f32) -> ObstacleId {
        self.insert(
            ObstacleShape::Cylinder {
                base,
                radius,
                height,
            },
            true,
        )
    }

    /// Move an obstacle so its anchor sits at `anchor`.
    ///
    /// Returns false if the ID is unknown.
    pub fn move_to(&mut self, id: ObstacleId, anchor: Vec3) -> bool {
        match self.obstacles.get_mut(&id) {
            Some(obstacle) => {
                let offset = anchor - obstacle.shape.anchor();
                obstacle.shape = obstacle.shape.translated(offset);
                true
            },
            None => false,
        }
    }

    /// Change whether an obstacle participates in collision.
    pub fn set_collidable(&mut self, id: ObstacleId, collidable: bool) -> bool {
        match self.obstacles.get_mut(&id) {
            Some(obstacle) => {
                obstacle.collidable = collidable;
                true
            },
            None => false,
        }
    }

    /// Remove an obstacle.
    pub fn remove(&mut self, id: ObstacleId) -> Option<Obstacle> {
        self.obstacles.remove(&id)
    }

    /// Get an obstacle by ID.
    #[must_use]
    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(&id)
    }

    /// Number of obstacles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Check if the field holds no obstacles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Remove every obstacle.
    pub fn clear(&mut self) {
        debug!(count = self.obstacles.len(), "clearing obstacle field");
        self.obstacles.clear();
    }
}

impl WorldQuery for ObstacleField {
    fn raycast(&self, origin: Vec3, direction: Vec3, filter: TagFilter) -> Option<RayHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }

        self.obstacles
            .values()
            .filter(|obstacle| filter.accepts(obstacle.collidable))
            .filter_map(|obstacle| obstacle.shape.ray_distance(origin, dir))
            .min_by(f32::total_cmp)
            .map(|distance| RayHit {
                point: origin + dir * distance,
                distance,
            })
    }
}

fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let m = origin - center;
    let b = m.dot(dir);
    let c = m.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some((-b - discriminant.sqrt()).max(0.0))
}

fn ray_aabb(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_min = 0.0f32;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() < PARALLEL_EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
        } else {
            let inv = 1.0 / d;
            let mut t0 = (min[axis] - o) * inv;
            let mut t1 = (max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
    }
    Some(t_min)
}

fn ray_cylinder(origin: Vec3, dir: Vec3, base: Vec3, radius: f32, height: f32) -> Option<f32> {
    let top = base.y + height;
    let ox = origin.x - base.x;
    let oz = origin.z - base.z;
    let r2 = radius * radius;

    if ox * ox + oz * oz <= r2 && origin.y >= base.y && origin.y <= top {
        return Some(0.0);
    }

    let mut best: Option<f32> = None;

    // Side wall
    let a = dir.x * dir.x + dir.z * dir.z;
    if a > PARALLEL_EPSILON {
        let b = ox * dir.x + oz * dir.z;
        let c = ox * ox + oz * oz - r2;
        let discriminant = b * b - a * c;
        if discriminant >= 0.0 {
            let t = (-b - discriminant.sqrt()) / a;
            let y = origin.y + dir.y * t;
            if t >= 0.0 && y >= base.y && y <= top {
                best = Some(t);
            }
        }
    }

    // Caps
    if dir.y.abs() > PARALLEL_EPSILON {
        for plane_y in [base.y, top] {
            let t = (plane_y - origin.y) / dir.y;
            if t < 0.0 {
                continue;
            }
            let px = ox + dir.x * t;
            let pz = oz + dir.z * t;
            if px * px + pz * pz <= r2 {
                best = Some(best.map_or(t, |current| current.min(t)));
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_tree_trunk() {
        let mut field = ObstacleField::new();
        field.insert_tree(Vec3::new(0.0, 0.0, -10.0), 0.5, 6.0);

        let hit = field
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, TagFilter::Collidable)
            .expect("trunk should be hit");
        assert!((hit.distance - 9.5).abs() < 1e-4);
        assert!((hit.point - Vec3::new(0.0, 1.0, -9.5)).length() < 1e-4);
    }

    #[test]
    fn test_ray_passes_over_tree() {
        let mut field = ObstacleField::new();
        field.insert_tree(Vec3::new(0.0, 0.0, -10.0), 0.5, 6.0);

        assert!(field
            .raycast(Vec3::new(0.0, 7.0, 0.0), Vec3::NEG_Z, TagFilter::Collidable)
            .is_none());
    }

    #[test]
    fn test_ray_hits_tree_top_cap() {
        let mut field = ObstacleField::new();
        field.insert_tree(Vec3::ZERO, 1.0, 4.0);

        let hit = field
            .raycast(Vec3::new(0.2, 10.0, 0.0), Vec3::NEG_Y, TagFilter::Collidable)
            .expect("cap should be hit");
        assert!((hit.distance - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_nearest_hit_wins() {
        let mut field = ObstacleField::new();
        field.insert(
            ObstacleShape::Sphere {
                center: Vec3::new(0.0, 0.0, -20.0),
                radius: 1.0,
            },
            true,
        );
        field.insert(
            ObstacleShape::Aabb {
                min: Vec3::new(-1.0, -1.0, -8.0),
                max: Vec3::new(1.0, 1.0, -6.0),
            },
            true,
        );

        let hit = field
            .raycast(Vec3::ZERO, Vec3::NEG_Z, TagFilter::Collidable)
            .expect("box should be hit");
        assert!((hit.distance - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_filter_skips_non_collidable() {
        let mut field = ObstacleField::new();
        let id = field.insert(
            ObstacleShape::Sphere {
                center: Vec3::new(0.0, 0.0, -5.0),
                radius: 1.0,
            },
            false,
        );

        assert!(field
            .raycast(Vec3::ZERO, Vec3::NEG_Z, TagFilter::Collidable)
            .is_none());
        assert!(field
            .raycast(Vec3::ZERO, Vec3::NEG_Z, TagFilter::Any)
            .is_some());

        assert!(field.set_collidable(id, true));
        assert!(field
            .raycast(Vec3::ZERO, Vec3::NEG_Z, TagFilter::Collidable)
            .is_some());
    }

    #[test]
    fn test_move_obstacle() {
        let mut field = ObstacleField::new();
        let id = field.insert_tree(Vec3::new(0.0, 0.0, -10.0), 0.5, 6.0);

        assert!(field.move_to(id, Vec3::new(5.0, 0.0, -10.0)));
        assert!(field
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, TagFilter::Collidable)
            .is_none());
        assert!(field
            .raycast(Vec3::new(5.0, 1.0, 0.0), Vec3::NEG_Z, TagFilter::Collidable)
            .is_some());
        assert!(!field.move_to(ObstacleId::new(99), Vec3::ZERO));
    }

    #[test]
    fn test_origin_inside_sphere() {
        let shape = ObstacleShape::Sphere {
            center: Vec3::ZERO,
            radius: 2.0,
        };
        assert_eq!(shape.ray_distance(Vec3::X, Vec3::X), Some(0.0));
    }

    #[test]
    fn test_sphere_behind_ray() {
        let shape = ObstacleShape::Sphere {
            center: Vec3::new(0.0, 0.0, 5.0),
            radius: 1.0,
        };
        assert_eq!(shape.ray_distance(Vec3::ZERO, Vec3::NEG_Z), None);
    }

    #[test]
    fn test_zero_direction() {
        let mut field = ObstacleField::new();
        field.insert_tree(Vec3::ZERO, 1.0, 4.0);
        assert!(field
            .raycast(Vec3::new(0.0, 1.0, 5.0), Vec3::ZERO, TagFilter::Any)
            .is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut field = ObstacleField::new();
        let a = field.insert_tree(Vec3::ZERO, 1.0, 4.0);
        field.insert_tree(Vec3::X * 5.0, 1.0, 4.0);
        assert_eq!(field.len(), 2);

        assert!(field.remove(a).is_some());
        assert!(field.get(a).is_none());
        assert_eq!(field.len(), 1);

        field.clear();
        assert!(field.is_empty());
    }
}
