//! JSON scenarios for the headless runner.
//!
//! A scenario describes the level walls, the guards with their tuning and
//! routes, an intruder walking a fixed route and a timeline of noises. The
//! [`ScenarioRunner`] turns it into a [`GuardWorld`] and steps it at a fixed
//! frame rate.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::Vec2;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, GuardConfig};
use crate::guard::{GuardBrain, GuardPerception, ListenerSettings, StateName, StateSet};
use crate::mover::Pose;
use crate::noise::NoiseEmission;
use crate::spatial::{ObstacleMask, SegmentWorld, Wall};
use crate::vector_math::step_towards;
use crate::waypoint::WaypointPath;
use crate::world::{GuardWorld, Intruder, WorldEvent};
use crate::DEFAULT_NOTIFY_INTERVAL;

/// Failure to load or build a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The file could not be read.
    #[error("failed to read scenario {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The JSON did not match the scenario shape.
    #[error("malformed scenario: {0}")]
    Json(#[from] serde_json::Error),
    /// A guard or the state set is misconfigured.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The frame rate cannot drive a simulation.
    #[error("frame rate must be positive, got {0}")]
    FrameRate(f32),
}

const fn default_facing() -> Vec2 {
    Vec2::X
}

fn default_start() -> StateName {
    StateName::new("patrol")
}

/// One guard in a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardEntry {
    /// Spawn position.
    pub position: Vec2,
    /// Initial facing.
    #[serde(default = "default_facing")]
    pub facing: Vec2,
    /// State the guard starts in.
    #[serde(default = "default_start")]
    pub start: StateName,
    /// Patrol route.
    #[serde(default)]
    pub path: Option<WaypointPath>,
    /// Hearing; omitted means deaf.
    #[serde(default)]
    pub listener: Option<ListenerSettings>,
    /// Eye placement.
    #[serde(default)]
    pub perception: GuardPerception,
    /// Per-guard tuning override.
    #[serde(default)]
    pub config: Option<GuardConfig>,
}

const fn default_health() -> u32 {
    3
}

const fn default_walk_speed() -> f32 {
    1.5
}

/// The intruder and the route it walks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntruderEntry {
    /// Spawn position.
    pub position: Vec2,
    /// Hit points.
    #[serde(default = "default_health")]
    pub health: u32,
    /// Points walked in order, then the intruder stands still.
    #[serde(default)]
    pub route: Vec<Vec2>,
    /// Walking speed.
    #[serde(default = "default_walk_speed")]
    pub speed: f32,
}

const fn default_expand_speed() -> f32 {
    18.0
}

const fn default_linger() -> f32 {
    0.12
}

const fn default_notify_interval() -> f32 {
    DEFAULT_NOTIFY_INTERVAL
}

const fn default_intensity() -> f32 {
    1.0
}

/// A timed noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimedNoise {
    /// An expanding pulse blocked by walls.
    Pulse {
        /// Emission time in seconds.
        at: f32,
        /// Origin.
        origin: Vec2,
        /// Final radius.
        radius: f32,
        /// Growth in units per second.
        #[serde(default = "default_expand_speed")]
        expand_speed: f32,
        /// Linger time at full radius.
        #[serde(default = "default_linger")]
        linger: f32,
        /// Blocking layers.
        #[serde(default)]
        mask: ObstacleMask,
        /// Seconds between listener sweeps.
        #[serde(default = "default_notify_interval")]
        notify_interval: f32,
    },
    /// An instant broadcast ignoring walls.
    Broadcast {
        /// Emission time in seconds.
        at: f32,
        /// Origin.
        origin: Vec2,
        /// Reach.
        radius: f32,
        /// Strength delivered to every listener.
        #[serde(default = "default_intensity")]
        intensity: f32,
    },
}

impl TimedNoise {
    /// Emission time.
    #[must_use]
    pub const fn at(&self) -> f32 {
        match self {
            Self::Pulse { at, .. } | Self::Broadcast { at, .. } => *at,
        }
    }
}

/// A complete scenario.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Tuning shared by guards without an override.
    pub config: GuardConfig,
    /// State definitions; empty means [`StateSet::standard`].
    pub states: StateSet,
    /// Level walls.
    pub walls: Vec<Wall>,
    /// Guards.
    pub guards: Vec<GuardEntry>,
    /// The intruder, if any.
    pub intruder: Option<IntruderEntry>,
    /// Noise timeline.
    pub noises: Vec<TimedNoise>,
}

impl Scenario {
    /// Parse a scenario from JSON.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Json`] for malformed input.
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a scenario file.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Io`] when the file cannot be read, otherwise
    /// as [`Scenario::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let file = path.as_ref();
        let text = fs::read_to_string(file).map_err(|source| ScenarioError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Build every guard brain, in declaration order.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Config`] when a guard's tuning, the state set
    /// or a start state is invalid.
    pub fn build_guards(&self) -> Result<Vec<GuardBrain>, ScenarioError> {
        let states = Arc::new(if self.states.is_empty() {
            StateSet::standard()
        } else {
            self.states.clone()
        });
        let shared = Arc::new(self.config.clone());

        let mut guards = Vec::with_capacity(self.guards.len());
        for entry in &self.guards {
            let config = entry
                .config
                .clone()
                .map_or_else(|| Arc::clone(&shared), Arc::new);
            let mut builder = GuardBrain::builder(config, Arc::clone(&states), entry.start.clone())
                .pose(Pose::new(entry.position, entry.facing))
                .perception(entry.perception);
            if let Some(path) = &entry.path {
                builder = builder.path(path.clone());
            }
            if let Some(listener) = &entry.listener {
                builder = builder.listener(listener.clone());
            }
            guards.push(builder.build()?);
        }
        Ok(guards)
    }

    /// Build the world described by this scenario.
    ///
    /// # Errors
    /// As [`Scenario::build_guards`].
    pub fn build_world(&self) -> Result<GuardWorld, ScenarioError> {
        let mut world = GuardWorld::new(SegmentWorld::with_walls(self.walls.clone()));
        for brain in self.build_guards()? {
            let position = brain.pose().position;
            let id = world.add_guard(brain);
            debug!("scenario guard {id:?} at {position:?}");
        }
        world.set_intruder(
            self.intruder
                .as_ref()
                .map(|i| Intruder::new(i.position, i.health)),
        );
        Ok(world)
    }

    /// Noises sorted by emission time.
    #[must_use]
    pub fn timeline(&self) -> Vec<TimedNoise> {
        let mut noises = self.noises.clone();
        noises.sort_by(|a, b| a.at().total_cmp(&b.at()));
        noises
    }
}

/// Events of one frame, stamped with the frame's end time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    /// Simulation time.
    pub time: f32,
    /// What happened.
    pub event: WorldEvent,
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScenarioSummary {
    /// Frames simulated.
    pub frames: u32,
    /// Everything that happened, in order.
    pub events: Vec<TimedEvent>,
    /// Intruder health at the end.
    pub intruder_health: Option<u32>,
}

/// Steps a scenario's world at a fixed frame rate.
#[derive(Debug)]
pub struct ScenarioRunner {
    world: GuardWorld,
    noises: Vec<TimedNoise>,
    route: Vec<Vec2>,
    walk_speed: f32,
    dt: f32,
}

impl ScenarioRunner {
    /// Prepare `scenario` to run at `fps` frames per second.
    ///
    /// # Errors
    /// Returns [`ScenarioError::FrameRate`] for a non-positive rate and any
    /// error from [`Scenario::build_world`].
    pub fn new(scenario: &Scenario, fps: f32) -> Result<Self, ScenarioError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(ScenarioError::FrameRate(fps));
        }
        let mut noises = scenario.timeline();
        noises.reverse();
        Ok(Self {
            world: scenario.build_world()?,
            noises,
            route: scenario
                .intruder
                .as_ref()
                .map(|i| i.route.iter().rev().copied().collect())
                .unwrap_or_default(),
            walk_speed: scenario.intruder.as_ref().map_or(0.0, |i| i.speed),
            dt: 1.0 / fps,
        })
    }

    /// The simulated world.
    #[must_use]
    pub const fn world(&self) -> &GuardWorld {
        &self.world
    }

    /// Advance one frame: fire due noises, walk the intruder, step the world.
    pub fn step(&mut self) -> Vec<WorldEvent> {
        let mut events = Vec::new();
        let now = self.world.now();
        while self.noises.last().is_some_and(|n| n.at() <= now) {
            let Some(noise) = self.noises.pop() else {
                break;
            };
            events.extend(self.fire(&noise));
        }

        self.walk_intruder();
        events.extend(self.world.step(self.dt));
        events
    }

    /// Run for `seconds` of simulated time.
    pub fn run(&mut self, seconds: f32) -> ScenarioSummary {
        let mut summary = ScenarioSummary::default();
        while self.world.now() + self.dt * 0.5 < seconds {
            let events = self.step();
            let time = self.world.now();
            summary.frames += 1;
            summary
                .events
                .extend(events.into_iter().map(|event| TimedEvent { time, event }));
        }
        summary.intruder_health = self.world.intruder().map(|i| i.health);
        info!(
            "scenario finished after {} frames with {} events",
            summary.frames,
            summary.events.len()
        );
        summary
    }

    fn fire(&mut self, noise: &TimedNoise) -> Vec<WorldEvent> {
        match *noise {
            TimedNoise::Pulse {
                origin,
                radius,
                expand_speed,
                linger,
                mask,
                notify_interval,
                ..
            } => {
                let emission = NoiseEmission::new(origin, radius, expand_speed, linger, mask)
                    .with_notify_interval(notify_interval);
                self.world.emit_noise(emission);
                Vec::new()
            }
            TimedNoise::Broadcast {
                origin,
                radius,
                intensity,
                ..
            } => self.world.broadcast_noise(origin, radius, intensity),
        }
    }

    fn walk_intruder(&mut self) {
        let Some(position) = self.world.intruder().map(|i| i.position) else {
            return;
        };
        let Some(&next) = self.route.last() else {
            return;
        };
        let moved = step_towards(position, next, self.walk_speed * self.dt);
        if moved == next {
            self.route.pop();
        }
        self.world.move_intruder(moved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SCENARIO: &str = r#"{
        "walls": [ { "start": [5.0, -5.0], "end": [5.0, 5.0] } ],
        "guards": [
            {
                "position": [0.0, 0.0],
                "path": { "points": [[0.0, 0.0], [0.0, 3.0]], "mode": "ping_pong" },
                "listener": {}
            }
        ],
        "intruder": { "position": [-8.0, 0.0] },
        "noises": [
            { "kind": "broadcast", "at": 0.5, "origin": [2.0, 0.0], "radius": 6.0 }
        ]
    }"#;

    #[rstest]
    fn parses_with_defaults() {
        let scenario = Scenario::from_json_str(SCENARIO).expect("scenario should parse");
        assert_eq!(scenario.guards.len(), 1);
        let guard = scenario.guards.first().expect("one guard");
        assert_eq!(guard.start.as_str(), "patrol");
        assert_eq!(guard.facing, Vec2::X);
        assert!(guard.listener.is_some());
        assert_eq!(scenario.intruder.as_ref().map(|i| i.health), Some(3));
        assert!(scenario.states.is_empty());
    }

    #[rstest]
    fn broadcast_sends_guard_to_investigate() {
        let scenario = Scenario::from_json_str(SCENARIO).expect("scenario should parse");
        let mut runner = ScenarioRunner::new(&scenario, 10.0).expect("runner should build");
        let summary = runner.run(1.0);
        assert_eq!(summary.frames, 10);
        assert!(summary
            .events
            .iter()
            .any(|e| matches!(e.event, WorldEvent::HeardNoise { .. })));
        assert_eq!(summary.intruder_health, Some(3));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-30.0)]
    fn rejects_bad_frame_rate(#[case] fps: f32) {
        let scenario = Scenario::default();
        assert!(matches!(
            ScenarioRunner::new(&scenario, fps),
            Err(ScenarioError::FrameRate(_))
        ));
    }

    #[rstest]
    fn unknown_start_state_fails_to_build() {
        let scenario = Scenario::from_json_str(r#"{ "guards": [ { "position": [0, 0], "start": "nap" } ] }"#)
            .expect("scenario should parse");
        assert!(matches!(
            scenario.build_world(),
            Err(ScenarioError::Config(ConfigError::UnknownState { .. }))
        ));
    }
}
