//! Headless Bevy apps running the guard plugin.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use nightwatch::plugin::{GuardAgent, GuardAiPlugin, HealthComp, IntruderComp, LevelGeometry};
use nightwatch::{GuardBrain, SegmentWorld};

/// App with `MinimalPlugins`, the guard plugin and a fixed 100 ms frame.
#[must_use]
pub fn guard_app(level: SegmentWorld) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(GuardAiPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
    app.insert_resource(LevelGeometry(level));
    app
}

/// Spawn a guard entity at its brain's pose.
pub fn spawn_guard(app: &mut App, brain: GuardBrain) -> Entity {
    let position = brain.pose().position;
    app.world_mut()
        .spawn((
            GuardAgent(brain),
            Transform::from_xyz(position.x, position.y, 0.0),
        ))
        .id()
}

/// Spawn the intruder at `(x, y)` with `health` hit points.
pub fn spawn_intruder(app: &mut App, x: f32, y: f32, health: u32) -> Entity {
    app.world_mut()
        .spawn((
            IntruderComp,
            HealthComp(health),
            Transform::from_xyz(x, y, 0.0),
        ))
        .id()
}

/// Run `frames` updates.
pub fn tick(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}
