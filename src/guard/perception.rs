//! Vision cone and line-of-sight sampling.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::GuardConfig;
use crate::mover::Pose;
use crate::numeric::{at_least, clamp01};
use crate::spatial::SpatialQuery;
use crate::vector_math::angle_between_deg;
use crate::{ANGLE_WEIGHT, DISTANCE_WEIGHT, MIN_VISION_EXTENT};

/// One perception sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Visibility {
    /// Whether the target is inside the cone and unobstructed.
    pub visible: bool,
    /// Detection weight in `[0, 1]`; zero when not visible.
    pub factor: f32,
}

impl Visibility {
    /// Sample for an unseen target.
    pub const HIDDEN: Self = Self {
        visible: false,
        factor: 0.0,
    };
}

/// Stateless visibility test parameterised by the eye placement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GuardPerception {
    /// Eye position in the guard's local frame (x along forward).
    #[serde(default)]
    pub eye_offset: Vec2,
}

impl GuardPerception {
    /// Perception with the eye at `eye_offset` in local space.
    #[must_use]
    pub const fn with_eye_offset(eye_offset: Vec2) -> Self {
        Self { eye_offset }
    }

    /// World position rays are cast from.
    #[must_use]
    pub fn eye(&self, pose: &Pose) -> Vec2 {
        pose.local_to_world(self.eye_offset)
    }

    /// Test whether `target` can be seen from `pose`.
    ///
    /// The cone is centred on the guard's forward axis; the angle and the
    /// occlusion ray are measured from the eye. The factor blends how
    /// centred and how close the target is.
    #[must_use]
    pub fn visibility(
        &self,
        pose: &Pose,
        target: Option<Vec2>,
        config: &GuardConfig,
        spatial: &dyn SpatialQuery,
    ) -> Visibility {
        let Some(point) = target else {
            return Visibility::HIDDEN;
        };
        let origin = self.eye(pose);
        let to = point - origin;
        let distance = to.length();
        if distance.is_nan() || distance > config.vision_radius {
            return Visibility::HIDDEN;
        }

        let half_fov = config.half_fov();
        let angle = angle_between_deg(pose.forward, to);
        if angle > half_fov {
            return Visibility::HIDDEN;
        }

        if spatial.is_occluded(origin, point, config.obstacles_mask) {
            return Visibility::HIDDEN;
        }

        let angle_factor = 1.0 - clamp01(angle / at_least(half_fov, MIN_VISION_EXTENT));
        let dist_factor =
            1.0 - clamp01(distance / at_least(config.vision_radius, MIN_VISION_EXTENT));
        Visibility {
            visible: true,
            factor: clamp01(angle_factor * ANGLE_WEIGHT + dist_factor * DISTANCE_WEIGHT),
        }
    }
}
