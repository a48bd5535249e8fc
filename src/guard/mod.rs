//! Guard perception, detection and the behaviour state machine.

pub mod brain;
pub mod context;
pub mod detector;
pub mod listener;
pub mod perception;
pub mod state;
pub mod states;

pub use brain::{BrainUpdate, GuardBrain, GuardBrainBuilder};
pub use context::{Damageable, Frame, GuardContext, TargetRef};
pub use detector::{DetectionEvent, DetectionTransitions, GuardDetector, IndicatorState};
pub use listener::{GuardNoiseListener, ListenerSettings};
pub use perception::{GuardPerception, Visibility};
pub use state::{
    AttackSettings, ChaseSettings, GuardState, InvestigateSettings, PatrolSettings, StateAsset,
    StateKind, StateName, StateSet, Transition,
};
