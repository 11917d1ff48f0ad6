//! Throw shaping: aim direction + power → initial velocity.
//!
//! The launcher is stateless. The projectile manager is responsible for the
//! launch cooldown and only calls in here once a throw has been accepted.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use snowdrift_sim::config::LaunchTuning;
//! use snowdrift_sim::launcher::base_velocity;
//!
//! let tuning = LaunchTuning::default();
//! // Level throw straight ahead at full normalized power.
//! let v = base_velocity(Vec3::NEG_Z, 1.0, Vec3::NEG_Z, &tuning);
//! assert!((v.z + 260.0).abs() < 1e-3);
//! ```

use glam::Vec3;

use crate::config::LaunchTuning;

/// Horizontal aim shorter than this is treated as "straight up or down".
const DEGENERATE_AIM: f32 = 1e-4;

/// A throw command from the character/input layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchRequest {
    /// Where the snowball leaves the hand.
    pub origin: Vec3,
    /// Aim direction, not necessarily normalized; y is the vertical aim.
    pub aim: Vec3,
    /// Throw power; values at or below 1.0 are normalized input.
    pub power: f32,
    /// Camera forward, used when the aim has no horizontal component.
    pub camera_forward: Vec3,
}

impl LaunchRequest {
    /// Create a request with the camera looking down -Z.
    #[must_use]
    pub const fn new(origin: Vec3, aim: Vec3, power: f32) -> Self {
        Self {
            origin,
            aim,
            power,
            camera_forward: Vec3::NEG_Z,
        }
    }

    /// Set the camera forward fallback.
    #[must_use]
    pub const fn with_camera_forward(mut self, camera_forward: Vec3) -> Self {
        self.camera_forward = camera_forward;
        self
    }
}

/// Convert caller power into internal units.
///
/// Normalized input (`power <= ceiling`) is multiplied by the scale; larger
/// values are assumed to already be internal units.
#[must_use]
pub fn scale_power(power: f32, tuning: &LaunchTuning) -> f32 {
    debug_assert!(
        power.is_finite() && power >= 0.0,
        "launch power must be finite and non-negative, got {power}"
    );
    if power <= tuning.normalized_power_ceiling {
        power * tuning.normalized_power_scale
    } else {
        power
    }
}

/// Base throw speed for an already scaled power.
#[must_use]
pub fn launch_speed(scaled_power: f32, tuning: &LaunchTuning) -> f32 {
    tuning.min_speed + (tuning.max_speed - tuning.min_speed) * scaled_power
}

/// Unit horizontal throw direction.
///
/// Falls back to the camera's horizontal forward when the aim is (nearly)
/// vertical, and to -Z when the camera is vertical too.
#[must_use]
pub fn horizontal_direction(aim: Vec3, camera_forward: Vec3) -> Vec3 {
    let flat = Vec3::new(aim.x, 0.0, aim.z);
    if flat.length() > DEGENERATE_AIM {
        return flat.normalize();
    }

    let camera_flat = Vec3::new(camera_forward.x, 0.0, camera_forward.z);
    if camera_flat.length() > DEGENERATE_AIM {
        camera_flat.normalize()
    } else {
        Vec3::NEG_Z
    }
}

/// Vertical launch speed for a scaled power and the raw vertical aim.
#[must_use]
pub fn vertical_speed(scaled_power: f32, vertical_aim: f32, tuning: &LaunchTuning) -> f32 {
    let power_curve = tuning.power_curve_base + scaled_power * tuning.power_curve_gain;
    let up_lift = tuning.base_lift * power_curve;
    let aim_push = vertical_aim * tuning.vertical_aim_gain;

    if vertical_aim < tuning.downward_aim_threshold {
        let downward = (1.0 + vertical_aim * tuning.downward_lift_falloff).max(0.0);
        up_lift * downward + aim_push
    } else {
        up_lift + aim_push
    }
}

/// Initial velocity without jitter.
#[must_use]
pub fn base_velocity(aim: Vec3, power: f32, camera_forward: Vec3, tuning: &LaunchTuning) -> Vec3 {
    let scaled_power = scale_power(power, tuning);
    let speed = launch_speed(scaled_power, tuning);
    let horizontal = horizontal_direction(aim, camera_forward) * speed;

    Vec3::new(
        horizontal.x,
        vertical_speed(scaled_power, aim.y, tuning),
        horizontal.z,
    )
}

/// Initial velocity for a throw, including per-axis jitter.
#[must_use]
pub fn launch_velocity(
    request: &LaunchRequest,
    tuning: &LaunchTuning,
    rng: &mut fastrand::Rng,
) -> Vec3 {
    let base = base_velocity(request.aim, request.power, request.camera_forward, tuning);
    base + Vec3::new(
        jitter(rng, tuning.jitter_horizontal),
        jitter(rng, tuning.jitter_vertical),
        jitter(rng, tuning.jitter_horizontal),
    )
}

/// Uniform sample in `[-amount, amount)`.
fn jitter(rng: &mut fastrand::Rng, amount: f32) -> f32 {
    (rng.f32() * 2.0 - 1.0) * amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tuning() -> LaunchTuning {
        LaunchTuning::default()
    }

    #[test]
    fn test_scale_power_normalized() {
        let t = tuning();
        assert!((scale_power(0.1, &t) - 0.3).abs() < 1e-6);
        assert!((scale_power(1.0, &t) - 3.0).abs() < 1e-6);
        assert_eq!(scale_power(0.0, &t), 0.0);
    }

    #[test]
    fn test_scale_power_internal_units() {
        let t = tuning();
        assert_eq!(scale_power(1.5, &t), 1.5);
        assert_eq!(scale_power(2.0, &t), 2.0);
    }

    #[test]
    fn test_straight_up_low_power_throw() {
        let t = tuning();
        let camera = Vec3::new(1.0, -0.2, 0.0);
        let v = base_velocity(Vec3::Y, 0.1, camera, &t);

        // Camera forward supplies the horizontal direction.
        let speed = 20.0 + 80.0 * 0.3;
        assert!((v.x - speed).abs() < 1e-3);
        assert!(v.z.abs() < 1e-6);

        let expected_vy = 12.0 * (0.4 + 0.3 * 0.6) + 25.0;
        assert!((v.y - expected_vy).abs() < 1e-3);
    }

    #[test]
    fn test_full_power_level_throw() {
        let t = tuning();
        let v = base_velocity(Vec3::NEG_Z, 1.0, Vec3::NEG_Z, &t);

        assert!((scale_power(1.0, &t) - 3.0).abs() < 1e-6);
        assert!(v.x.abs() < 1e-6);
        assert!((v.z + 260.0).abs() < 1e-3);
        // Level aim: lift only.
        assert!((v.y - 12.0 * (0.4 + 3.0 * 0.6)).abs() < 1e-3);
    }

    #[test]
    fn test_downward_aim_reduces_lift() {
        let t = tuning();
        let aim = Vec3::new(0.0, -0.4, -1.0);
        let v = base_velocity(aim, 0.5, Vec3::NEG_Z, &t);

        let up_lift = 12.0 * (0.4 + 1.5 * 0.6);
        let downward = 1.0 - 0.4 * 2.0;
        assert!((v.y - (up_lift * downward - 0.4 * 25.0)).abs() < 1e-3);
    }

    #[test]
    fn test_steep_downward_aim_has_no_lift() {
        let t = tuning();
        let aim = Vec3::new(0.0, -0.8, -1.0);
        let v = base_velocity(aim, 0.5, Vec3::NEG_Z, &t);
        assert!((v.y - (-0.8 * 25.0)).abs() < 1e-3);
    }

    #[test]
    fn test_slight_downward_aim_keeps_full_lift() {
        let t = tuning();
        let aim = Vec3::new(0.0, -0.2, -1.0);
        let v = base_velocity(aim, 0.5, Vec3::NEG_Z, &t);
        let up_lift = 12.0 * (0.4 + 1.5 * 0.6);
        assert!((v.y - (up_lift - 0.2 * 25.0)).abs() < 1e-3);
    }

    #[test]
    fn test_horizontal_direction_ignores_vertical_component() {
        let dir = horizontal_direction(Vec3::new(3.0, 10.0, 4.0), Vec3::NEG_Z);
        assert!((dir - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-5);
    }

    #[test]
    fn test_horizontal_direction_double_fallback() {
        let dir = horizontal_direction(Vec3::NEG_Y, Vec3::Y);
        assert_eq!(dir, Vec3::NEG_Z);
    }

    #[test]
    fn test_jitter_bounds() {
        let t = tuning();
        let mut rng = fastrand::Rng::with_seed(7);
        let request = LaunchRequest::new(Vec3::ZERO, Vec3::NEG_Z, 0.5);
        let base = base_velocity(request.aim, request.power, request.camera_forward, &t);

        for _ in 0..500 {
            let v = launch_velocity(&request, &t, &mut rng);
            let d = v - base;
            assert!(d.x.abs() <= 0.25 + 1e-4);
            assert!(d.z.abs() <= 0.25 + 1e-4);
            assert!(d.y.abs() <= 0.15 + 1e-4);
        }
    }

    #[test]
    fn test_jitter_varies_repeated_throws() {
        let t = tuning();
        let mut rng = fastrand::Rng::with_seed(11);
        let request = LaunchRequest::new(Vec3::ZERO, Vec3::NEG_Z, 0.5);
        let a = launch_velocity(&request, &t, &mut rng);
        let b = launch_velocity(&request, &t, &mut rng);
        assert_ne!(a, b);
    }

    #[test]
    fn test_no_jitter_is_repeatable() {
        let t = tuning().without_jitter();
        let mut rng = fastrand::Rng::with_seed(3);
        let request = LaunchRequest::new(Vec3::ZERO, Vec3::new(1.0, 0.2, 0.0), 0.7);
        assert_eq!(
            launch_velocity(&request, &t, &mut rng),
            launch_velocity(&request, &t, &mut rng)
        );
    }

    proptest! {
        #[test]
        fn prop_speed_increases_with_power(a in 0.001f32..1.0, b in 0.001f32..1.0) {
            prop_assume!((a - b).abs() > 1e-4);
            let t = tuning();
            let (low, high) = if a < b { (a, b) } else { (b, a) };
            let slow = launch_speed(scale_power(low, &t), &t);
            let fast = launch_speed(scale_power(high, &t), &t);
            prop_assert!(fast > slow);
        }

        #[test]
        fn prop_horizontal_direction_is_unit_and_flat(
            x in -10.0f32..10.0,
            y in -10.0f32..10.0,
            z in -10.0f32..10.0,
        ) {
            let dir = horizontal_direction(Vec3::new(x, y, z), Vec3::new(0.3, -0.5, 0.8));
            prop_assert!(dir.y == 0.0);
            prop_assert!((dir.length() - 1.0).abs() < 1e-4);
        }
    }
}
