#![cfg_attr(docsrs, feature(doc_cfg))]
//! Guard AI for a top-down stealth game.
//!
//! Guards see through a vision cone, fill a detection meter while the
//! intruder stays in view and run a small state machine (patrol, chase,
//! attack, investigate). Noises spread as expanding pulses blocked by walls
//! and pull listening guards over to investigate. The core is engine-free and
//! talks to level geometry through [`SpatialQuery`]; [`GuardWorld`] steps it
//! headless and [`plugin::GuardAiPlugin`] runs it inside a Bevy app.
pub mod config;
pub mod constants;
pub mod guard;
pub mod logging;
pub mod mover;
pub mod noise;
pub mod numeric;
pub mod plugin;
pub mod scenario;
pub mod spatial;
pub mod vector_math;
pub mod waypoint;
pub mod world;
pub use constants::*;

// Re-export commonly used items
pub use config::{ConfigError, GuardConfig};
pub use guard::{
    DetectionEvent, Frame, GuardBrain, GuardDetector, GuardPerception, IndicatorState,
    ListenerSettings, StateKind, StateName, StateSet, Visibility,
};
pub use logging::init as init_logging;
pub use mover::{Movement, Mover, Pose};
pub use noise::{NoiseEmission, NoiseEvent, NoiseSystem};
pub use spatial::{ListenerId, ObstacleMask, SegmentWorld, SpatialQuery, Wall};
pub use waypoint::{TraversalMode, WaypointPath};
pub use world::{GuardWorld, Intruder, WorldEvent};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use nightwatch::prelude::*;
    //! ```

    pub use crate::guard::{Damageable, TargetRef};
    pub use crate::{
        DetectionEvent, Frame, GuardBrain, GuardConfig, GuardWorld, ListenerSettings,
        NoiseEmission, ObstacleMask, Pose, SegmentWorld, StateSet, TraversalMode, Wall,
        WaypointPath,
    };
    pub use glam::Vec2;
}
