//! Guard and world fixtures.

use std::sync::Arc;

use glam::Vec2;
use nightwatch::guard::{Damageable, GuardBrain};
use nightwatch::{
    GuardConfig, GuardWorld, ListenerSettings, Pose, SegmentWorld, StateSet, TraversalMode, Wall,
    WaypointPath,
};

/// Default tuning with instant-ish detection and quick movement.
#[must_use]
pub fn quick_config() -> GuardConfig {
    GuardConfig {
        detection_time: 0.5,
        lose_time: 0.5,
        grace_after_lost: 0.1,
        patrol_speed: 4.0,
        chase_speed: 5.0,
        ..GuardConfig::default()
    }
}

/// Four corners of a 4x4 square starting at the origin.
#[must_use]
pub fn square_route(mode: TraversalMode) -> WaypointPath {
    WaypointPath::new(
        vec![
            Vec2::ZERO,
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ],
        mode,
    )
}

/// Guard using the standard states, deaf and without a route.
///
/// # Panics
/// Panics if the standard state set fails to build, which is a test bug.
#[must_use]
pub fn brain(config: GuardConfig, start: &str, pose: Pose) -> GuardBrain {
    GuardBrain::builder(Arc::new(config), Arc::new(StateSet::standard()), start)
        .pose(pose)
        .build()
        .unwrap_or_else(|e| panic!("guard failed to build: {e}"))
}

/// Patrolling guard walking `path` from its first point.
///
/// # Panics
/// Panics if the brain fails to build.
#[must_use]
pub fn patrol_brain(config: GuardConfig, path: WaypointPath) -> GuardBrain {
    let start = path.point(0).unwrap_or_default();
    GuardBrain::builder(Arc::new(config), Arc::new(StateSet::standard()), "patrol")
        .pose(Pose::new(start, Vec2::X))
        .path(path)
        .listener(ListenerSettings::default())
        .build()
        .unwrap_or_else(|e| panic!("guard failed to build: {e}"))
}

/// Guard in `start` that routes heard noises to investigate.
///
/// # Panics
/// Panics if the brain fails to build.
#[must_use]
pub fn listening_brain(config: GuardConfig, start: &str, pose: Pose) -> GuardBrain {
    GuardBrain::builder(Arc::new(config), Arc::new(StateSet::standard()), start)
        .pose(pose)
        .listener(ListenerSettings::default())
        .build()
        .unwrap_or_else(|e| panic!("guard failed to build: {e}"))
}

/// World without walls.
#[must_use]
pub fn open_world() -> GuardWorld {
    GuardWorld::new(SegmentWorld::new())
}

/// World with a vertical wall at `x` spanning y in [-10, 10].
#[must_use]
pub fn walled_world(x: f32) -> GuardWorld {
    GuardWorld::new(SegmentWorld::with_walls(vec![Wall::new(
        Vec2::new(x, -10.0),
        Vec2::new(x, 10.0),
    )]))
}

/// Damage target recording every hit.
#[derive(Debug, Default, Clone)]
pub struct HitLog {
    /// Amounts received, in order.
    pub hits: Vec<u32>,
}

impl HitLog {
    /// Total damage received.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.hits.iter().sum()
    }
}

impl Damageable for HitLog {
    fn take_damage(&mut self, amount: u32) {
        self.hits.push(amount);
    }
}
