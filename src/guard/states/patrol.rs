//! Waypoint patrol.

use log::debug;

use crate::guard::context::{Frame, GuardContext};
use crate::guard::state::{GuardState, PatrolSettings, StateKind, Transition};
use crate::waypoint::PatrolCursor;

/// Walks the context's path, pausing at every waypoint, until the detector
/// reports the intruder as spotted.
#[derive(Debug, Clone)]
pub struct PatrolState {
    settings: PatrolSettings,
    cursor: PatrolCursor,
    wait: f32,
}

impl PatrolState {
    /// Runtime for one patrol visit.
    #[must_use]
    pub const fn new(settings: PatrolSettings) -> Self {
        Self {
            settings,
            cursor: PatrolCursor::at(0),
            wait: 0.0,
        }
    }

    /// Waypoint currently being walked to.
    #[must_use]
    pub const fn cursor(&self) -> PatrolCursor {
        self.cursor
    }
}

impl GuardState for PatrolState {
    fn kind(&self) -> StateKind {
        StateKind::Patrol
    }

    fn enter(&mut self, ctx: &mut GuardContext) -> Transition {
        self.wait = 0.0;
        let saved = ctx.patrol_cursor.take();
        let position = ctx.pose().position;
        let Some(path) = ctx.walkable_path() else {
            self.cursor = PatrolCursor::at(0);
            ctx.mover.stop();
            return Transition::Stay;
        };
        self.cursor = match saved {
            Some(cursor) if cursor.index < path.len() => cursor,
            _ if self.settings.start_from_closest => {
                PatrolCursor::at(path.closest_index(position).unwrap_or(0))
            }
            _ => PatrolCursor::at(0),
        };
        debug!("patrol starting at waypoint {}", self.cursor.index);
        Transition::Stay
    }

    fn tick(&mut self, ctx: &mut GuardContext, frame: &mut Frame<'_>) -> Transition {
        if ctx.detector.is_spotted() {
            return Transition::SwitchTo(self.settings.chase.clone());
        }

        let Some(path) = ctx.walkable_path() else {
            ctx.mover.stop();
            return Transition::Stay;
        };

        if self.wait > 0.0 {
            self.wait -= frame.dt;
            return Transition::Stay;
        }

        let Some(point) = path.point(self.cursor.index) else {
            self.cursor = PatrolCursor::at(0);
            return Transition::Stay;
        };
        let next = path.advance_with(self.cursor, self.settings.mode.unwrap_or(path.mode()));

        let speed = ctx.config.patrol_speed;
        let arrived = ctx
            .mover
            .move_towards(point, speed, self.settings.arrive_tolerance, frame.dt);
        ctx.mover.face_towards(point);
        if arrived {
            self.wait = self.settings.pause_at_point;
            self.cursor = next;
        }
        Transition::Stay
    }

    fn exit(&mut self, ctx: &mut GuardContext) {
        ctx.patrol_cursor = Some(self.cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuardConfig;
    use crate::mover::{MockMovement, Mover, Pose};
    use crate::spatial::SegmentWorld;
    use crate::waypoint::{TraversalMode, WaypointPath};
    use glam::Vec2;
    use mockall::predicate::{always, eq};
    use rstest::rstest;
    use std::sync::Arc;

    fn square() -> WaypointPath {
        WaypointPath::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(4.0, 0.0),
                Vec2::new(4.0, 4.0),
                Vec2::new(0.0, 4.0),
            ],
            TraversalMode::Loop,
        )
    }

    fn context_at(position: Vec2, path: Option<WaypointPath>) -> GuardContext {
        GuardContext::new(
            Arc::new(GuardConfig::default()),
            Box::new(Mover::new(Pose::new(position, Vec2::X))),
            path,
        )
    }

    #[rstest]
    #[case(true, Vec2::new(3.5, 3.0), 2)]
    #[case(false, Vec2::new(3.5, 3.0), 0)]
    fn enter_picks_start_waypoint(
        #[case] closest: bool,
        #[case] position: Vec2,
        #[case] expected: usize,
    ) {
        let mut ctx = context_at(position, Some(square()));
        let mut state = PatrolState::new(PatrolSettings {
            start_from_closest: closest,
            ..PatrolSettings::default()
        });
        assert_eq!(state.enter(&mut ctx), Transition::Stay);
        assert_eq!(state.cursor().index, expected);
    }

    #[rstest]
    fn saved_cursor_wins_over_closest() {
        let mut ctx = context_at(Vec2::ZERO, Some(square()));
        ctx.patrol_cursor = Some(PatrolCursor::at(3));
        let mut state = PatrolState::new(PatrolSettings::default());
        state.enter(&mut ctx);
        assert_eq!(state.cursor().index, 3);
        assert!(ctx.patrol_cursor.is_none());
        state.exit(&mut ctx);
        assert_eq!(ctx.patrol_cursor, Some(PatrolCursor::at(3)));
    }

    #[rstest]
    fn spotted_switches_to_chase() {
        let mut ctx = context_at(Vec2::ZERO, Some(square()));
        let config = GuardConfig {
            detection_time: 0.1,
            ..GuardConfig::default()
        };
        ctx.detector.tick(
            1.0,
            &config,
            Some(crate::guard::Visibility {
                visible: true,
                factor: 1.0,
            }),
        );
        let world = SegmentWorld::new();
        let mut frame = Frame::new(0.1, 0.0, &world);
        let mut state = PatrolState::new(PatrolSettings::default());
        state.enter(&mut ctx);
        assert_eq!(
            state.tick(&mut ctx, &mut frame),
            Transition::SwitchTo("chase".into())
        );
    }

    #[rstest]
    fn missing_path_stops_the_mover() {
        let mut mover = MockMovement::new();
        mover.expect_pose().return_const(Pose::default());
        mover.expect_stop().times(2).return_const(());
        mover.expect_move_towards().never();
        let mut ctx = GuardContext::new(Arc::new(GuardConfig::default()), Box::new(mover), None);
        let world = SegmentWorld::new();
        let mut frame = Frame::new(0.1, 0.0, &world);
        let mut state = PatrolState::new(PatrolSettings::default());
        state.enter(&mut ctx);
        assert_eq!(state.tick(&mut ctx, &mut frame), Transition::Stay);
    }

    #[rstest]
    fn arrival_pauses_then_advances() {
        let mut mover = MockMovement::new();
        mover.expect_pose().return_const(Pose::default());
        mover
            .expect_move_towards()
            .with(eq(Vec2::ZERO), eq(1.8), eq(0.08), always())
            .times(1)
            .return_const(true);
        mover
            .expect_move_towards()
            .with(eq(Vec2::new(4.0, 0.0)), always(), always(), always())
            .times(1)
            .return_const(false);
        mover.expect_face_towards().return_const(());
        let mut ctx = GuardContext::new(
            Arc::new(GuardConfig::default()),
            Box::new(mover),
            Some(square()),
        );
        let world = SegmentWorld::new();
        let mut state = PatrolState::new(PatrolSettings::default());
        state.enter(&mut ctx);

        state.tick(&mut ctx, &mut Frame::new(0.1, 0.0, &world));
        assert_eq!(state.cursor().index, 1);
        // 0.3 s pause: two 0.2 s frames only count down.
        state.tick(&mut ctx, &mut Frame::new(0.2, 0.1, &world));
        state.tick(&mut ctx, &mut Frame::new(0.2, 0.3, &world));
        state.tick(&mut ctx, &mut Frame::new(0.2, 0.5, &world));
        assert_eq!(state.cursor().index, 1);
    }
}
