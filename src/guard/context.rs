//! Per-guard shared state and the per-frame inputs handed to states.

use std::fmt;
use std::sync::Arc;

use glam::Vec2;

use crate::config::GuardConfig;
use crate::guard::detector::GuardDetector;
use crate::guard::perception::{GuardPerception, Visibility};
use crate::mover::{Movement, Pose};
use crate::noise::NoiseInbox;
use crate::spatial::SpatialQuery;
use crate::waypoint::{PatrolCursor, WaypointPath};

/// Something that can be hurt by an attacking guard.
pub trait Damageable {
    /// Apply `amount` points of damage.
    fn take_damage(&mut self, amount: u32);
}

/// The intruder as seen by one frame.
pub struct TargetRef<'a> {
    /// Current position.
    pub position: Vec2,
    /// Damage receiver, when the intruder can be hurt.
    pub damageable: Option<&'a mut dyn Damageable>,
}

/// Inputs for one brain update.
pub struct Frame<'a> {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Simulation time in seconds.
    pub now: f32,
    /// Level queries.
    pub spatial: &'a dyn SpatialQuery,
    /// The intruder, if one is bound.
    pub target: Option<TargetRef<'a>>,
}

impl<'a> Frame<'a> {
    /// Frame without a target.
    #[must_use]
    pub const fn new(dt: f32, now: f32, spatial: &'a dyn SpatialQuery) -> Self {
        Self {
            dt,
            now,
            spatial,
            target: None,
        }
    }

    /// Bind a target that cannot take damage.
    #[must_use]
    pub const fn with_target(mut self, position: Vec2) -> Self {
        self.target = Some(TargetRef {
            position,
            damageable: None,
        });
        self
    }

    /// Bind a target that takes damage through `damageable`.
    #[must_use]
    pub const fn with_damageable_target(mut self, position: Vec2, damageable: &'a mut dyn Damageable) -> Self {
        self.target = Some(TargetRef {
            position,
            damageable: Some(damageable),
        });
        self
    }

    /// Damage receiver of the bound target, if any.
    pub fn damageable(&mut self) -> Option<&mut (dyn Damageable + 'a)> {
        self.target.as_mut().and_then(|t| t.damageable.as_deref_mut())
    }
}

/// Everything a guard's states share.
pub struct GuardContext {
    /// Tuning shared with other guards.
    pub config: Arc<GuardConfig>,
    /// Vision test.
    pub perception: GuardPerception,
    /// Detection meter.
    pub detector: GuardDetector,
    /// Movement actuator.
    pub mover: Box<dyn Movement + Send + Sync>,
    /// Patrol route.
    pub path: Option<WaypointPath>,
    /// Intruder position for the current frame.
    pub target: Option<Vec2>,
    /// Perception sample taken this frame.
    pub sight: Visibility,
    /// Pending noise to investigate.
    pub noise: NoiseInbox,
    /// Where patrol left off.
    pub patrol_cursor: Option<PatrolCursor>,
}

impl GuardContext {
    /// Context with an empty inbox and no target.
    #[must_use]
    pub fn new(
        config: Arc<GuardConfig>,
        mover: Box<dyn Movement + Send + Sync>,
        path: Option<WaypointPath>,
    ) -> Self {
        Self {
            config,
            perception: GuardPerception::default(),
            detector: GuardDetector::new(),
            mover,
            path,
            target: None,
            sight: Visibility::HIDDEN,
            noise: NoiseInbox::default(),
            patrol_cursor: None,
        }
    }

    /// Current pose of the guard.
    #[must_use]
    pub fn pose(&self) -> Pose {
        self.mover.pose()
    }

    /// Distance from the guard to the target, if one is bound.
    #[must_use]
    pub fn distance_to_target(&self) -> Option<f32> {
        self.target.map(|t| self.pose().position.distance(t))
    }

    /// Path with at least one waypoint.
    #[must_use]
    pub fn walkable_path(&self) -> Option<&WaypointPath> {
        self.path.as_ref().filter(|p| !p.is_empty())
    }
}

impl fmt::Debug for GuardContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardContext")
            .field("pose", &self.pose())
            .field("detector", &self.detector)
            .field("target", &self.target)
            .field("sight", &self.sight)
            .field("noise", &self.noise)
            .field("patrol_cursor", &self.patrol_cursor)
            .finish_non_exhaustive()
    }
}
