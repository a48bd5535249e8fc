//! Planar vector helpers for facing and field-of-view checks.
use glam::Vec2;

use crate::DIRECTION_EPSILON_SQ;

/// Unsigned angle in degrees between two directions.
///
/// Either vector being (near) zero yields `0`, matching how the guard treats
/// a target standing exactly on its eye position.
///
/// # Examples
/// ```
/// use glam::Vec2;
/// use nightwatch::vector_math::angle_between_deg;
/// let angle = angle_between_deg(Vec2::X, Vec2::Y);
/// assert!((angle - 90.0).abs() < 1e-4);
/// assert_eq!(angle_between_deg(Vec2::X, Vec2::ZERO), 0.0);
/// ```
#[must_use]
pub fn angle_between_deg(from: Vec2, to: Vec2) -> f32 {
    if from.length_squared() < DIRECTION_EPSILON_SQ || to.length_squared() < DIRECTION_EPSILON_SQ {
        return 0.0;
    }
    from.angle_to(to).abs().to_degrees()
}

/// Step `current` toward `target` by at most `max_step`, never overshooting.
///
/// # Examples
/// ```
/// use glam::Vec2;
/// use nightwatch::vector_math::step_towards;
/// let p = step_towards(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0);
/// assert_eq!(p, Vec2::new(2.0, 0.0));
/// let q = step_towards(Vec2::ZERO, Vec2::new(1.0, 0.0), 2.0);
/// assert_eq!(q, Vec2::new(1.0, 0.0));
/// ```
#[must_use]
pub fn step_towards(current: Vec2, target: Vec2, max_step: f32) -> Vec2 {
    let to = target - current;
    let distance = to.length();
    if distance <= max_step || distance == 0.0 {
        return target;
    }
    current + to / distance * max_step
}

/// Unit direction from `from` to `to`, or `None` when the points coincide.
#[must_use]
pub fn direction_to(from: Vec2, to: Vec2) -> Option<Vec2> {
    let delta = to - from;
    if !delta.is_finite() || delta.length_squared() <= DIRECTION_EPSILON_SQ {
        return None;
    }
    Some(delta.normalize())
}
