//! Pursuit of a spotted intruder.

use log::debug;

use crate::guard::context::{Frame, GuardContext};
use crate::guard::state::{ChaseSettings, GuardState, StateKind, Transition};
use crate::DEFAULT_STOP_DISTANCE;

/// Runs at the intruder until it is in attack range or has been out of
/// sight for `lose_time` seconds.
#[derive(Debug, Clone)]
pub struct ChaseState {
    settings: ChaseSettings,
    lost_for: f32,
}

impl ChaseState {
    /// Runtime for one chase.
    #[must_use]
    pub const fn new(settings: ChaseSettings) -> Self {
        Self {
            settings,
            lost_for: 0.0,
        }
    }

    /// Seconds since the intruder was last visible.
    #[must_use]
    pub const fn lost_for(&self) -> f32 {
        self.lost_for
    }
}

impl GuardState for ChaseState {
    fn kind(&self) -> StateKind {
        StateKind::Chase
    }

    fn enter(&mut self, _ctx: &mut GuardContext) -> Transition {
        self.lost_for = 0.0;
        Transition::Stay
    }

    fn tick(&mut self, ctx: &mut GuardContext, frame: &mut Frame<'_>) -> Transition {
        let Some(target) = ctx.target else {
            return Transition::SwitchTo(self.settings.patrol.clone());
        };

        if ctx.sight.visible {
            self.lost_for = 0.0;
        } else {
            self.lost_for += frame.dt;
            if self.lost_for >= ctx.config.lose_time {
                debug!("chase gave up after {:.2}s out of sight", self.lost_for);
                return Transition::SwitchTo(self.settings.patrol.clone());
            }
        }

        ctx.mover
            .move_towards(target, ctx.config.chase_speed, DEFAULT_STOP_DISTANCE, frame.dt);
        ctx.mover.face_towards(target);

        if ctx.pose().position.distance(target) <= ctx.config.attack_range {
            return Transition::SwitchTo(self.settings.attack.clone());
        }
        Transition::Stay
    }
}
