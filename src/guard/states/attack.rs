//! Close-range attack with a cooldown.

use log::{debug, trace};

use crate::guard::context::{Frame, GuardContext};
use crate::guard::state::{AttackSettings, GuardState, StateKind, Transition};
use crate::ATTACK_EXIT_FACTOR;

/// Stands still facing the intruder and hits it every `attack_cooldown`
/// seconds. Leaving requires the intruder to back off past
/// `attack_range * 1.1`.
#[derive(Debug, Clone)]
pub struct AttackState {
    settings: AttackSettings,
    next_attack_at: Option<f32>,
}

impl AttackState {
    /// Runtime for one attack visit; the first hit is immediate.
    #[must_use]
    pub const fn new(settings: AttackSettings) -> Self {
        Self {
            settings,
            next_attack_at: None,
        }
    }

    /// Earliest time of the next hit, `None` before the first one.
    #[must_use]
    pub const fn next_attack_at(&self) -> Option<f32> {
        self.next_attack_at
    }
}

impl GuardState for AttackState {
    fn kind(&self) -> StateKind {
        StateKind::Attack
    }

    fn enter(&mut self, ctx: &mut GuardContext) -> Transition {
        self.next_attack_at = None;
        ctx.mover.stop();
        Transition::Stay
    }

    fn tick(&mut self, ctx: &mut GuardContext, frame: &mut Frame<'_>) -> Transition {
        let Some(target) = ctx.target else {
            return Transition::SwitchTo(self.settings.chase.clone());
        };
        let distance = ctx.pose().position.distance(target);
        if distance > ctx.config.attack_range * ATTACK_EXIT_FACTOR {
            trace!("attack target out of reach at {distance:.2}");
            return Transition::SwitchTo(self.settings.chase.clone());
        }

        ctx.mover.face_towards(target);

        let ready = self.next_attack_at.is_none_or(|at| frame.now >= at);
        if ready {
            if let Some(victim) = frame.damageable() {
                victim.take_damage(ctx.config.attack_damage);
                self.next_attack_at = Some(frame.now + ctx.config.attack_cooldown);
                debug!("guard hit target for {}", ctx.config.attack_damage);
            }
        }
        Transition::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuardConfig;
    use crate::guard::context::Damageable;
    use crate::mover::{MockMovement, Pose};
    use crate::spatial::SegmentWorld;
    use glam::Vec2;
    use rstest::rstest;
    use std::sync::Arc;

    #[derive(Default)]
    struct Tally(Vec<u32>);

    impl Damageable for Tally {
        fn take_damage(&mut self, amount: u32) {
            self.0.push(amount);
        }
    }

    fn still_mover() -> MockMovement {
        let mut mover = MockMovement::new();
        mover.expect_pose().return_const(Pose::default());
        mover.expect_stop().return_const(());
        mover.expect_face_towards().return_const(());
        mover.expect_move_towards().never();
        mover
    }

    fn ctx_with_target(target: Option<Vec2>) -> GuardContext {
        let mut ctx = GuardContext::new(
            Arc::new(GuardConfig {
                attack_damage: 2,
                ..GuardConfig::default()
            }),
            Box::new(still_mover()),
            None,
        );
        ctx.target = target;
        ctx
    }

    #[rstest]
    fn hits_immediately_then_waits_for_cooldown() {
        let world = SegmentWorld::new();
        let target = Vec2::new(1.0, 0.0);
        let mut ctx = ctx_with_target(Some(target));
        let mut tally = Tally::default();
        let mut state = AttackState::new(AttackSettings::default());
        state.enter(&mut ctx);

        for (step, now) in [0.0_f32, 0.4, 0.8, 1.2].into_iter().enumerate() {
            let mut frame = Frame::new(0.4, now, &world).with_damageable_target(target, &mut tally);
            assert_eq!(state.tick(&mut ctx, &mut frame), Transition::Stay, "step {step}");
        }
        assert_eq!(tally.0, vec![2, 2]);
        assert_eq!(state.next_attack_at(), Some(1.6));
    }

    #[rstest]
    #[case(Vec2::new(1.3, 0.0), Transition::Stay)]
    #[case(Vec2::new(1.4, 0.0), Transition::SwitchTo("chase".into()))]
    fn hysteresis_band(#[case] target: Vec2, #[case] expected: Transition) {
        let world = SegmentWorld::new();
        let mut ctx = ctx_with_target(Some(target));
        let mut state = AttackState::new(AttackSettings::default());
        state.enter(&mut ctx);
        let mut frame = Frame::new(0.1, 0.0, &world).with_target(target);
        assert_eq!(state.tick(&mut ctx, &mut frame), expected);
    }

    #[rstest]
    fn missing_target_resumes_chase() {
        let world = SegmentWorld::new();
        let mut ctx = ctx_with_target(None);
        let mut state = AttackState::new(AttackSettings::default());
        state.enter(&mut ctx);
        assert_eq!(
            state.tick(&mut ctx, &mut Frame::new(0.1, 0.0, &world)),
            Transition::SwitchTo("chase".into())
        );
    }
}
