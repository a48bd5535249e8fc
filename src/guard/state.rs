//! Guard behaviour states: the runtime capability, the authored state
//! assets and the factory turning one into the other.
//!
//! States are authored as data ([`StateAsset`]) and referenced by name.
//! The brain instantiates a fresh runtime ([`GuardState`]) from the asset on
//! every switch, so per-visit timers never leak between visits.

use std::borrow::Borrow;
use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::config::{non_negative, positive, ConfigError};
use crate::guard::context::{Frame, GuardContext};
use crate::guard::states::{AttackState, ChaseState, InvestigateState, PatrolState};
use crate::waypoint::TraversalMode;

/// Name of a state within a [`StateSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateName(String);

impl StateName {
    /// Wrap `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StateName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StateName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for StateName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which behaviour a state implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// Walk the waypoint path.
    Patrol,
    /// Run after the intruder.
    Chase,
    /// Hit the intruder at close range.
    Attack,
    /// Walk to a heard noise and look around.
    Investigate,
}

/// Outcome of entering or ticking a state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Transition {
    /// Remain in the current state.
    #[default]
    Stay,
    /// Exit the current state and enter the named one.
    SwitchTo(StateName),
}

/// Runtime behaviour of one guard state.
///
/// Implementations never switch states themselves; they return a
/// [`Transition`] and the brain applies it once the call has returned.
pub trait GuardState: Send + Sync {
    /// Behaviour implemented by this state.
    fn kind(&self) -> StateKind;

    /// Called once when the state becomes active.
    fn enter(&mut self, ctx: &mut GuardContext) -> Transition;

    /// Called once per frame while active, after the detector tick.
    fn tick(&mut self, ctx: &mut GuardContext, frame: &mut Frame<'_>) -> Transition;

    /// Called once when the state is replaced.
    fn exit(&mut self, _ctx: &mut GuardContext) {}
}

fn state(name: &str) -> StateName {
    StateName::new(name)
}

fn patrol_ref() -> StateName {
    state("patrol")
}

fn chase_ref() -> StateName {
    state("chase")
}

fn attack_ref() -> StateName {
    state("attack")
}

/// Patrol tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolSettings {
    /// Traversal override; `None` uses the path's own mode.
    pub mode: Option<TraversalMode>,
    /// Distance at which a waypoint counts as reached.
    pub arrive_tolerance: f32,
    /// Seconds spent standing at each waypoint.
    pub pause_at_point: f32,
    /// Start at the waypoint nearest the guard instead of the first one.
    pub start_from_closest: bool,
    /// State entered once the detector is full.
    pub chase: StateName,
}

impl Default for PatrolSettings {
    fn default() -> Self {
        Self {
            mode: None,
            arrive_tolerance: 0.08,
            pause_at_point: 0.3,
            start_from_closest: true,
            chase: chase_ref(),
        }
    }
}

/// Chase transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseSettings {
    /// State entered when the intruder is in range.
    pub attack: StateName,
    /// State entered when the intruder is gone.
    pub patrol: StateName,
}

impl Default for ChaseSettings {
    fn default() -> Self {
        Self {
            attack: attack_ref(),
            patrol: patrol_ref(),
        }
    }
}

/// Attack transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackSettings {
    /// State entered when the intruder leaves the hysteresis band.
    pub chase: StateName,
}

impl Default for AttackSettings {
    fn default() -> Self {
        Self { chase: chase_ref() }
    }
}

/// Investigate tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigateSettings {
    /// Walking speed toward the noise.
    #[serde(default = "InvestigateSettings::default_move_speed")]
    pub move_speed: f32,
    /// Distance at which the noise point counts as reached.
    #[serde(default = "InvestigateSettings::default_stop_distance")]
    pub stop_distance: f32,
    /// Give up after this many seconds.
    #[serde(default = "InvestigateSettings::default_max_time")]
    pub max_investigate_time: f32,
    /// Seconds to look around once arrived.
    #[serde(default = "InvestigateSettings::default_linger")]
    pub linger_time: f32,
    /// State to return to afterwards.
    pub resume: StateName,
}

impl InvestigateSettings {
    /// Default tuning returning to `resume`.
    #[must_use]
    pub fn resuming(resume: impl Into<StateName>) -> Self {
        Self {
            move_speed: Self::default_move_speed(),
            stop_distance: Self::default_stop_distance(),
            max_investigate_time: Self::default_max_time(),
            linger_time: Self::default_linger(),
            resume: resume.into(),
        }
    }

    const fn default_move_speed() -> f32 {
        2.0
    }

    const fn default_stop_distance() -> f32 {
        0.25
    }

    const fn default_max_time() -> f32 {
        4.0
    }

    const fn default_linger() -> f32 {
        1.0
    }
}

/// Authored state definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateAsset {
    /// Waypoint patrol.
    Patrol(PatrolSettings),
    /// Pursuit.
    Chase(ChaseSettings),
    /// Melee.
    Attack(AttackSettings),
    /// Noise investigation.
    Investigate(InvestigateSettings),
}

impl StateAsset {
    /// Behaviour this asset instantiates.
    #[must_use]
    pub const fn kind(&self) -> StateKind {
        match self {
            Self::Patrol(_) => StateKind::Patrol,
            Self::Chase(_) => StateKind::Chase,
            Self::Attack(_) => StateKind::Attack,
            Self::Investigate(_) => StateKind::Investigate,
        }
    }

    /// Names of the states this asset can switch to.
    #[must_use]
    pub fn references(&self) -> Vec<&StateName> {
        match self {
            Self::Patrol(s) => vec![&s.chase],
            Self::Chase(s) => vec![&s.attack, &s.patrol],
            Self::Attack(s) => vec![&s.chase],
            Self::Investigate(s) => vec![&s.resume],
        }
    }

    /// Check the asset's own tuning values.
    ///
    /// # Errors
    /// Returns the first out-of-range value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Patrol(s) => {
                non_negative("arrive_tolerance", s.arrive_tolerance)?;
                non_negative("pause_at_point", s.pause_at_point)
            }
            Self::Chase(_) | Self::Attack(_) => Ok(()),
            Self::Investigate(s) => {
                positive("move_speed", s.move_speed)?;
                non_negative("stop_distance", s.stop_distance)?;
                non_negative("max_investigate_time", s.max_investigate_time)?;
                non_negative("linger_time", s.linger_time)
            }
        }
    }

    /// Instantiate a fresh runtime for one visit to this state.
    #[must_use]
    pub fn create_runtime(&self) -> Box<dyn GuardState> {
        match self {
            Self::Patrol(s) => Box::new(PatrolState::new(s.clone())),
            Self::Chase(s) => Box::new(ChaseState::new(s.clone())),
            Self::Attack(s) => Box::new(AttackState::new(s.clone())),
            Self::Investigate(s) => Box::new(InvestigateState::new(s.clone())),
        }
    }
}

/// Named collection of state assets shared by guards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSet {
    states: HashMap<StateName, StateAsset>,
}

impl StateSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The usual four states named `patrol`, `chase`, `attack` and
    /// `investigate`, with default tuning. Investigation resumes patrol.
    ///
    /// # Examples
    /// ```
    /// use nightwatch::guard::{StateKind, StateSet};
    /// let states = StateSet::standard();
    /// assert!(states.validate().is_ok());
    /// assert_eq!(states.get("investigate").map(|s| s.kind()), Some(StateKind::Investigate));
    /// ```
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with("patrol", StateAsset::Patrol(PatrolSettings::default()))
            .with("chase", StateAsset::Chase(ChaseSettings::default()))
            .with("attack", StateAsset::Attack(AttackSettings::default()))
            .with(
                "investigate",
                StateAsset::Investigate(InvestigateSettings::resuming("patrol")),
            )
    }

    /// Builder-style [`StateSet::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<StateName>, asset: StateAsset) -> Self {
        self.insert(name, asset);
        self
    }

    /// Add or replace a state, returning the previous asset.
    pub fn insert(&mut self, name: impl Into<StateName>, asset: StateAsset) -> Option<StateAsset> {
        self.states.insert(name.into(), asset)
    }

    /// Asset registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StateAsset> {
        self.states.get(name)
    }

    /// Whether `name` is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// Number of states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Check every asset and every cross-reference.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownState`] for a dangling reference or the
    /// asset's own validation error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names: Vec<_> = self.states.keys().collect();
        names.sort();
        for name in names {
            let Some(asset) = self.states.get(name) else {
                continue;
            };
            asset.validate()?;
            if let Some(missing) = asset.references().into_iter().find(|r| !self.contains(r.as_str())) {
                return Err(ConfigError::UnknownState {
                    from: name.to_string(),
                    to: missing.to_string(),
                });
            }
        }
        Ok(())
    }
}
