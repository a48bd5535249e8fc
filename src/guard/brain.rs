//! The per-guard state machine driver.
//!
//! A brain owns its [`GuardContext`] and exactly one active state. Every
//! frame it refreshes the target, samples perception, ticks the detector
//! and then the active state, applying whatever transition the state
//! returned. Noise routing enters through [`GuardBrain::on_noise_heard`].

use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::{ConfigError, GuardConfig};
use crate::guard::context::{Frame, GuardContext};
use crate::guard::detector::{DetectionTransitions, GuardDetector};
use crate::guard::listener::{GuardNoiseListener, ListenerSettings};
use crate::guard::perception::{GuardPerception, Visibility};
use crate::guard::state::{GuardState, StateKind, StateName, StateSet, Transition};
use crate::mover::{Movement, Mover, Pose};
use crate::noise::NoiseEvent;
use crate::numeric::frame_delta;
use crate::spatial::SpatialQuery;
use crate::waypoint::WaypointPath;
use crate::MAX_CHAINED_SWITCHES;

/// Outcome of one [`GuardBrain::update`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BrainUpdate {
    /// Detection boundaries crossed this frame.
    pub detection: DetectionTransitions,
    /// State active after the frame, when it changed.
    pub switched_to: Option<StateName>,
}

struct ActiveState {
    name: StateName,
    runtime: Box<dyn GuardState>,
}

/// Guard behaviour driver.
pub struct GuardBrain {
    ctx: GuardContext,
    states: Arc<StateSet>,
    active: ActiveState,
    listener: Option<GuardNoiseListener>,
}

/// Step-by-step construction of a [`GuardBrain`].
pub struct GuardBrainBuilder {
    config: Arc<GuardConfig>,
    states: Arc<StateSet>,
    start: StateName,
    mover: Option<Box<dyn Movement + Send + Sync>>,
    pose: Pose,
    path: Option<WaypointPath>,
    perception: GuardPerception,
    listener: Option<ListenerSettings>,
}

impl GuardBrainBuilder {
    /// Place the default [`Mover`] at `pose`.
    #[must_use]
    pub const fn pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Use a custom movement actuator instead of [`Mover`].
    #[must_use]
    pub fn mover(mut self, mover: impl Movement + Send + Sync + 'static) -> Self {
        self.mover = Some(Box::new(mover));
        self
    }

    /// Patrol route.
    #[must_use]
    pub fn path(mut self, path: WaypointPath) -> Self {
        self.path = Some(path);
        self
    }

    /// Eye placement.
    #[must_use]
    pub const fn perception(mut self, perception: GuardPerception) -> Self {
        self.perception = perception;
        self
    }

    /// Enable hearing.
    #[must_use]
    pub fn listener(mut self, settings: ListenerSettings) -> Self {
        self.listener = Some(settings);
        self
    }

    /// Validate everything and enter the start state.
    ///
    /// # Errors
    /// Returns the config or state-set validation error, or
    /// [`ConfigError::UnknownState`] when the start state or the listener's
    /// investigate state is not in the set.
    pub fn build(self) -> Result<GuardBrain, ConfigError> {
        self.config.validate()?;
        self.states.validate()?;
        let unknown = |to: &StateName| ConfigError::UnknownState {
            from: "<brain>".to_owned(),
            to: to.to_string(),
        };
        let asset = self.states.get(self.start.as_str()).ok_or_else(|| unknown(&self.start))?;
        if let Some(route) = self.listener.as_ref().and_then(|l| l.investigate_state.as_ref()) {
            if !self.states.contains(route.as_str()) {
                return Err(unknown(route));
            }
        }

        let mover = self
            .mover
            .unwrap_or_else(|| Box::new(Mover::new(self.pose)));
        let mut ctx = GuardContext::new(self.config, mover, self.path);
        ctx.perception = self.perception;

        let mut brain = GuardBrain {
            active: ActiveState {
                name: self.start,
                runtime: asset.create_runtime(),
            },
            ctx,
            states: Arc::clone(&self.states),
            listener: self.listener.map(GuardNoiseListener::new),
        };
        debug!("guard starting in `{}`", brain.active.name);
        let entered = brain.active.runtime.enter(&mut brain.ctx);
        brain.apply(entered);
        Ok(brain)
    }
}

impl GuardBrain {
    /// Start building a brain that begins in `start`.
    #[must_use]
    pub fn builder(
        config: Arc<GuardConfig>,
        states: Arc<StateSet>,
        start: impl Into<StateName>,
    ) -> GuardBrainBuilder {
        GuardBrainBuilder {
            config,
            states,
            start: start.into(),
            mover: None,
            pose: Pose::default(),
            path: None,
            perception: GuardPerception::default(),
            listener: None,
        }
    }

    /// Run one frame: target, perception, detector, state, switch.
    pub fn update(&mut self, frame: &mut Frame<'_>) -> BrainUpdate {
        frame.dt = frame_delta(frame.dt);
        self.ctx.target = frame.target.as_ref().map(|t| t.position);

        let sample = self.ctx.target.map(|target| {
            self.ctx.perception.visibility(
                &self.ctx.pose(),
                Some(target),
                &self.ctx.config,
                frame.spatial,
            )
        });
        self.ctx.sight = sample.unwrap_or(Visibility::HIDDEN);

        let config = Arc::clone(&self.ctx.config);
        let detection = self.ctx.detector.tick(frame.dt, &config, sample);
        for event in detection.iter() {
            debug!(
                "guard in `{}` detection {event:?} at {:.2}",
                self.active.name,
                self.ctx.detector.progress()
            );
        }

        let transition = self.active.runtime.tick(&mut self.ctx, frame);
        BrainUpdate {
            detection,
            switched_to: self.apply(transition),
        }
    }

    /// Feed a delivered noise through the listener.
    ///
    /// An accepted noise is written to the inbox and, when routing is on,
    /// forces the investigate state from whatever state is active. Returns
    /// whether the noise was accepted.
    pub fn on_noise_heard(&mut self, event: &NoiseEvent, now: f32, spatial: &dyn SpatialQuery) -> bool {
        let position = self.ctx.pose().position;
        let Some(listener) = self.listener.as_mut() else {
            return false;
        };
        let Some(signal) = listener.hear(event, position, now, spatial) else {
            return false;
        };
        let routed = listener.route().cloned();
        info!("guard heard noise at {:?} (strength {:.2})", signal.point, signal.strength);
        self.ctx.noise.write(signal);
        if let Some(investigate) = routed {
            self.apply(Transition::SwitchTo(investigate));
        }
        true
    }

    /// Force a switch to `name`.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownState`] when `name` is not in the set;
    /// the active state is left untouched.
    pub fn switch_to(&mut self, name: impl Into<StateName>) -> Result<(), ConfigError> {
        let wanted = name.into();
        if !self.states.contains(wanted.as_str()) {
            return Err(ConfigError::UnknownState {
                from: self.active.name.to_string(),
                to: wanted.to_string(),
            });
        }
        self.apply(Transition::SwitchTo(wanted));
        Ok(())
    }

    /// Name of the active state.
    #[must_use]
    pub const fn state_name(&self) -> &StateName {
        &self.active.name
    }

    /// Behaviour of the active state.
    #[must_use]
    pub fn state_kind(&self) -> StateKind {
        self.active.runtime.kind()
    }

    /// Shared guard state.
    #[must_use]
    pub const fn context(&self) -> &GuardContext {
        &self.ctx
    }

    /// Mutable shared guard state.
    pub const fn context_mut(&mut self) -> &mut GuardContext {
        &mut self.ctx
    }

    /// Detection meter.
    #[must_use]
    pub const fn detector(&self) -> &GuardDetector {
        &self.ctx.detector
    }

    /// Current pose.
    #[must_use]
    pub fn pose(&self) -> Pose {
        self.ctx.pose()
    }

    /// Hearing filter, when enabled.
    #[must_use]
    pub const fn listener(&self) -> Option<&GuardNoiseListener> {
        self.listener.as_ref()
    }

    fn apply(&mut self, mut transition: Transition) -> Option<StateName> {
        let mut switched = None;
        let mut hops = 0;
        while let Transition::SwitchTo(next) = transition {
            if hops == MAX_CHAINED_SWITCHES {
                warn!(
                    "guard state switches cut after {hops} hops, staying in `{}`",
                    self.active.name
                );
                break;
            }
            hops += 1;
            let Some(asset) = self.states.get(next.as_str()) else {
                warn!("guard asked for unknown state `{next}`");
                break;
            };
            let runtime = asset.create_runtime();
            self.active.runtime.exit(&mut self.ctx);
            info!("guard state `{}` -> `{next}`", self.active.name);
            self.active = ActiveState {
                name: next.clone(),
                runtime,
            };
            switched = Some(next);
            transition = self.active.runtime.enter(&mut self.ctx);
        }
        switched
    }
}

impl std::fmt::Debug for GuardBrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardBrain")
            .field("state", &self.active.name)
            .field("ctx", &self.ctx)
            .field("listener", &self.listener)
            .finish_non_exhaustive()
    }
}
