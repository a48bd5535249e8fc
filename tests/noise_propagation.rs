//! Noise pulses and broadcasts reaching listeners.

use glam::Vec2;
use nightwatch::noise::NoiseEvent;
use nightwatch::{
    ListenerId, DEFAULT_NOTIFY_INTERVAL, NoiseEmission, NoiseSystem, ObstacleMask, Pose, SegmentWorld, StateKind, Wall,
    WorldEvent,
};
use rstest::rstest;
use test_utils::{listening_brain, open_world, quick_config, walled_world};

fn heard(events: &[WorldEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, WorldEvent::HeardNoise { .. }))
        .count()
}

#[rstest]
#[case::every_tick(0.0)]
#[case::default_interval(DEFAULT_NOTIFY_INTERVAL)]
#[case::slow_sweeps(0.2)]
fn pulse_notifies_each_listener_at_most_once(#[case] notify_interval: f32) {
    let mut spatial = SegmentWorld::new();
    spatial.set_listener(ListenerId(1), Vec2::new(2.0, 0.0));
    spatial.set_listener(ListenerId(2), Vec2::new(0.0, -4.0));
    spatial.set_listener(ListenerId(3), Vec2::new(20.0, 0.0));
    let mut noise = NoiseSystem::new();
    noise.emit(
        NoiseEmission::new(Vec2::ZERO, 6.0, 10.0, 1.0, ObstacleMask::ALL)
            .with_notify_interval(notify_interval),
    );

    let mut deliveries: Vec<(ListenerId, NoiseEvent)> = Vec::new();
    let mut now = 0.0;
    for _ in 0..40 {
        now += 0.05;
        noise.tick(0.05, now, &spatial, &mut deliveries);
    }

    let count = |id: ListenerId| deliveries.iter().filter(|(l, _)| *l == id).count();
    assert_eq!(count(ListenerId(1)), 1);
    assert_eq!(count(ListenerId(2)), 1);
    assert_eq!(count(ListenerId(3)), 0);
    assert!(noise.pulses().is_empty(), "pulse should be disposed after 2s");
}

#[rstest]
fn nearer_listener_hears_first_and_louder() {
    let mut spatial = SegmentWorld::new();
    spatial.set_listener(ListenerId(1), Vec2::new(1.0, 0.0));
    spatial.set_listener(ListenerId(2), Vec2::new(5.0, 0.0));
    let mut noise = NoiseSystem::new();
    noise.emit(NoiseEmission::new(Vec2::ZERO, 6.0, 6.0, 0.5, ObstacleMask::ALL).with_notify_interval(0.0));

    let mut deliveries: Vec<(ListenerId, NoiseEvent)> = Vec::new();
    let mut now = 0.0;
    for _ in 0..20 {
        now += 0.1;
        noise.tick(0.1, now, &spatial, &mut deliveries);
    }

    let ids: Vec<_> = deliveries.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![ListenerId(1), ListenerId(2)]);
    let strengths: Vec<f32> = deliveries.iter().map(|(_, e)| e.strength).collect();
    assert!(strengths.windows(2).all(|w| matches!(w, [a, b] if a > b)));
}

#[rstest]
#[case::same_side(Vec2::new(-2.0, 0.0), 1)]
#[case::behind_the_wall(Vec2::new(3.0, 0.0), 0)]
fn walls_block_pulses(#[case] guard_at: Vec2, #[case] expected: usize) {
    let mut world = walled_world(1.0);
    world.add_guard(listening_brain(quick_config(), "patrol", Pose::new(guard_at, Vec2::Y)));
    world.emit_noise(NoiseEmission::lockpick_failure(Vec2::ZERO, 5.0, ObstacleMask::ALL));

    let mut total = 0;
    for _ in 0..20 {
        total += heard(&world.step(0.1));
    }
    assert_eq!(total, expected);
}

#[rstest]
fn wall_on_another_layer_does_not_block() {
    let mut world = open_world();
    world.add_wall(Wall::new(Vec2::new(1.0, -10.0), Vec2::new(1.0, 10.0)).on_layers(ObstacleMask::layer(3)));
    world.add_guard(listening_brain(quick_config(), "patrol", Pose::new(Vec2::new(3.0, 0.0), Vec2::Y)));
    world.emit_noise(NoiseEmission::lockpick_failure(Vec2::ZERO, 5.0, ObstacleMask::layer(1)));

    let mut total = 0;
    for _ in 0..20 {
        total += heard(&world.step(0.1));
    }
    assert_eq!(total, 1);
}

#[rstest]
fn listener_ignores_noises_inside_its_interval() {
    let mut world = open_world();
    let guard = world.add_guard(listening_brain(
        quick_config(),
        "patrol",
        Pose::new(Vec2::new(1.0, 0.0), Vec2::Y),
    ));

    assert_eq!(heard(&world.broadcast_noise(Vec2::ZERO, 3.0, 1.0)), 1);
    assert_eq!(heard(&world.broadcast_noise(Vec2::new(0.0, 1.0), 3.0, 1.0)), 0);

    for _ in 0..3 {
        world.step(0.1);
    }
    assert_eq!(heard(&world.broadcast_noise(Vec2::new(0.0, 1.0), 3.0, 1.0)), 1);
    assert_eq!(world.guard(guard).map(|g| g.state_kind()), Some(StateKind::Investigate));
}
