//! Walking to a heard noise and looking around.

use glam::Vec2;
use log::debug;

use crate::guard::context::{Frame, GuardContext};
use crate::guard::state::{GuardState, InvestigateSettings, StateKind, Transition};

/// Consumes the noise inbox on enter and walks to the noise point. Resumes
/// the configured state after lingering there, after the time limit, or at
/// once when there was nothing to investigate.
#[derive(Debug, Clone)]
pub struct InvestigateState {
    settings: InvestigateSettings,
    point: Option<Vec2>,
    elapsed: f32,
    arrived: bool,
    lingered: f32,
}

impl InvestigateState {
    /// Runtime for one investigation.
    #[must_use]
    pub const fn new(settings: InvestigateSettings) -> Self {
        Self {
            settings,
            point: None,
            elapsed: 0.0,
            arrived: false,
            lingered: 0.0,
        }
    }

    /// Point being investigated, fixed for the whole visit.
    #[must_use]
    pub const fn point(&self) -> Option<Vec2> {
        self.point
    }

    fn resume(&self) -> Transition {
        Transition::SwitchTo(self.settings.resume.clone())
    }
}

impl GuardState for InvestigateState {
    fn kind(&self) -> StateKind {
        StateKind::Investigate
    }

    fn enter(&mut self, ctx: &mut GuardContext) -> Transition {
        self.elapsed = 0.0;
        self.arrived = false;
        self.lingered = 0.0;
        self.point = ctx.noise.take().map(|signal| signal.point);
        match self.point {
            Some(point) => {
                debug!("investigating noise at {point:?}");
                Transition::Stay
            }
            None => self.resume(),
        }
    }

    fn tick(&mut self, ctx: &mut GuardContext, frame: &mut Frame<'_>) -> Transition {
        let Some(point) = self.point else {
            return self.resume();
        };
        self.elapsed += frame.dt;

        let arrived = ctx.mover.move_towards(
            point,
            self.settings.move_speed,
            self.settings.stop_distance,
            frame.dt,
        );
        if arrived {
            if self.arrived {
                self.lingered += frame.dt;
            }
            self.arrived = true;
            if self.lingered >= self.settings.linger_time {
                return self.resume();
            }
        }

        if self.elapsed >= self.settings.max_investigate_time {
            debug!("investigation timed out after {:.2}s", self.elapsed);
            return self.resume();
        }
        Transition::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuardConfig;
    use crate::mover::{Mover, Pose};
    use crate::noise::NoiseSignal;
    use crate::spatial::SegmentWorld;
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    #[fixture]
    fn ctx() -> GuardContext {
        GuardContext::new(
            Arc::new(GuardConfig::default()),
            Box::new(Mover::new(Pose::default())),
            None,
        )
    }

    fn signal(point: Vec2) -> NoiseSignal {
        NoiseSignal {
            point,
            time: 0.0,
            strength: 1.0,
        }
    }

    #[rstest]
    fn empty_inbox_resumes_on_enter(mut ctx: GuardContext) {
        let mut state = InvestigateState::new(InvestigateSettings::resuming("patrol"));
        assert_eq!(state.enter(&mut ctx), Transition::SwitchTo("patrol".into()));
    }

    #[rstest]
    fn enter_consumes_the_inbox(mut ctx: GuardContext) {
        ctx.noise.write(signal(Vec2::new(3.0, 0.0)));
        let mut state = InvestigateState::new(InvestigateSettings::resuming("patrol"));
        assert_eq!(state.enter(&mut ctx), Transition::Stay);
        assert_eq!(state.point(), Some(Vec2::new(3.0, 0.0)));
        assert!(!ctx.noise.has_signal());

        // A later noise does not move the point mid-visit.
        ctx.noise.write(signal(Vec2::new(-3.0, 0.0)));
        let world = SegmentWorld::new();
        state.tick(&mut ctx, &mut Frame::new(0.1, 0.0, &world));
        assert_eq!(state.point(), Some(Vec2::new(3.0, 0.0)));
    }

    #[rstest]
    fn lingers_at_the_point_then_resumes(mut ctx: GuardContext) {
        ctx.noise.write(signal(Vec2::new(1.0, 0.0)));
        let mut settings = InvestigateSettings::resuming("patrol");
        settings.linger_time = 0.5;
        let mut state = InvestigateState::new(settings);
        state.enter(&mut ctx);
        let world = SegmentWorld::new();
        let mut outcomes = Vec::new();
        for _ in 0..6 {
            outcomes.push(state.tick(&mut ctx, &mut Frame::new(0.25, 0.0, &world)));
        }
        // Two frames to walk 1 unit at 2 u/s, one to register arrival, then
        // 0.5 s of lingering.
        let first_resume = outcomes
            .iter()
            .position(|t| *t != Transition::Stay)
            .expect("investigation should end");
        assert_eq!(first_resume, 4);
        assert_eq!(ctx.pose().position, Vec2::new(1.0, 0.0));
    }

    #[rstest]
    fn gives_up_after_max_time(mut ctx: GuardContext) {
        ctx.noise.write(signal(Vec2::new(100.0, 0.0)));
        let mut state = InvestigateState::new(InvestigateSettings::resuming("patrol"));
        state.enter(&mut ctx);
        let world = SegmentWorld::new();
        for _ in 0..3 {
            assert_eq!(
                state.tick(&mut ctx, &mut Frame::new(1.0, 0.0, &world)),
                Transition::Stay
            );
        }
        assert_eq!(
            state.tick(&mut ctx, &mut Frame::new(1.0, 0.0, &world)),
            Transition::SwitchTo("patrol".into())
        );
    }
}
