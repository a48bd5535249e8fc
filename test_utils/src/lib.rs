//! Utility helpers for tests.
//!
//! Fixtures for building guards, headless worlds and Bevy apps with known
//! tuning so integration tests can focus on behaviour.

pub mod app;
pub mod fixtures;

pub use app::{guard_app, spawn_guard, spawn_intruder, tick};
pub use fixtures::{
    brain, listening_brain, open_world, patrol_brain, quick_config, square_route, walled_world,
    HitLog,
};

use anyhow::{ensure, Result};
use glam::Vec2;

/// Ensure two points are within `tolerance` of each other.
///
/// # Errors
/// Returns an error naming both points when they are further apart.
pub fn ensure_near(actual: Vec2, expected: Vec2, tolerance: f32) -> Result<()> {
    let distance = actual.distance(expected);
    ensure!(
        distance <= tolerance,
        "expected {expected:?}, got {actual:?} ({distance} apart)"
    );
    Ok(())
}
