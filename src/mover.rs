//! Movement actuator driven by the guard states.
//!
//! States never write positions directly: they ask a [`Movement`]
//! implementation to walk toward a point at a speed and report arrival.
//! [`Mover`] is the kinematic implementation used headless and inside the
//! Bevy plugin.

use glam::Vec2;
use log::trace;

use crate::numeric::frame_delta;
use crate::vector_math::{direction_to, step_towards};

/// Position and facing of a guard in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World position.
    pub position: Vec2,
    /// Unit forward axis.
    pub forward: Vec2,
}

impl Pose {
    /// Pose at `position` facing `forward`; a zero forward falls back to +X.
    #[must_use]
    pub fn new(position: Vec2, forward: Vec2) -> Self {
        Self {
            position,
            forward: forward.try_normalize().unwrap_or(Vec2::X),
        }
    }

    /// Transform a point from the guard's local frame into world space.
    #[must_use]
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        self.position + self.forward.rotate(local)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::X)
    }
}

/// Capability the states use to move and turn the guard.
#[cfg_attr(test, mockall::automock)]
pub trait Movement {
    /// Advance toward `target` by at most `speed * dt`.
    ///
    /// Returns `true` once the guard is within `stop_distance`, snapping it
    /// onto the target.
    fn move_towards(&mut self, target: Vec2, speed: f32, stop_distance: f32, dt: f32) -> bool;

    /// Halt any residual motion.
    fn stop(&mut self);

    /// Turn to face `point` without moving.
    fn face_towards(&mut self, point: Vec2);

    /// Current pose.
    fn pose(&self) -> Pose;
}

/// Kinematic mover owning the guard pose.
#[derive(Debug, Clone, Default)]
pub struct Mover {
    pose: Pose,
    last_velocity: Vec2,
}

impl Mover {
    /// Mover starting at `pose`.
    #[must_use]
    pub const fn new(pose: Pose) -> Self {
        Self {
            pose,
            last_velocity: Vec2::ZERO,
        }
    }

    /// Velocity produced by the most recent step.
    #[must_use]
    pub const fn last_velocity(&self) -> Vec2 {
        self.last_velocity
    }

    /// Teleport the guard, clearing its velocity.
    pub const fn place(&mut self, pose: Pose) {
        self.pose = pose;
        self.last_velocity = Vec2::ZERO;
    }
}

impl Movement for Mover {
    fn move_towards(&mut self, target: Vec2, speed: f32, stop_distance: f32, dt: f32) -> bool {
        let step = frame_delta(dt);
        let to = target - self.pose.position;
        if to.length_squared() <= stop_distance * stop_distance {
            self.pose.position = target;
            self.last_velocity = Vec2::ZERO;
            return true;
        }

        let next = step_towards(self.pose.position, target, speed.max(0.0) * step);
        self.last_velocity = if step > 0.0 {
            (next - self.pose.position) / step
        } else {
            Vec2::ZERO
        };
        trace!("mover step {:?} -> {:?}", self.pose.position, next);
        self.pose.position = next;
        if let Some(dir) = to.try_normalize() {
            self.pose.forward = dir;
        }
        false
    }

    fn stop(&mut self) {
        self.last_velocity = Vec2::ZERO;
    }

    fn face_towards(&mut self, point: Vec2) {
        if let Some(dir) = direction_to(self.pose.position, point) {
            self.pose.forward = dir;
        }
    }

    fn pose(&self) -> Pose {
        self.pose
    }
}
