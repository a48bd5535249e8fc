//! Bevy plugin running guards and noise inside an ECS app.
//!
//! Guards are entities carrying a [`GuardAgent`]; the intruder is the first
//! entity tagged [`IntruderComp`]. Level walls live in the
//! [`LevelGeometry`] resource and pulses in the [`NoiseSystem`] resource.
//! The systems are chained so noise delivery always happens before the
//! guard brains tick, and transforms are synchronised last. Instant
//! broadcasts are queued in [`QueuedBroadcasts`] and resolved by
//! [`tick_noise`] once listener positions are current.

use bevy::ecs::prelude::On;
use bevy::prelude::*;
use glam::Vec2;
use log::{debug, info};

use crate::guard::{DetectionEvent, Damageable, Frame, GuardBrain, StateName, TargetRef};
use crate::noise::{NoiseEvent, NoiseSystem};
use crate::spatial::{ListenerId, SegmentWorld};

/// Level geometry shared by perception and noise occlusion.
#[derive(Resource, Debug, Default)]
pub struct LevelGeometry(pub SegmentWorld);

/// Noise deliveries waiting for [`deliver_noise`].
#[derive(Resource, Debug, Default)]
pub struct PendingNoise(pub Vec<(ListenerId, NoiseEvent)>);

/// An instant noise reaching every listener within `radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseBroadcast {
    /// Where the noise happens.
    pub origin: Vec2,
    /// Reach.
    pub radius: f32,
    /// Strength delivered to every listener.
    pub intensity: f32,
}

/// Broadcasts waiting for the next [`tick_noise`].
#[derive(Resource, Debug, Default)]
pub struct QueuedBroadcasts(pub Vec<NoiseBroadcast>);

/// A guard entity's brain.
#[derive(Component, Debug)]
pub struct GuardAgent(pub GuardBrain);

/// Marks the entity guards look for and attack.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct IntruderComp;

/// Hit points of an entity that guards can damage.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthComp(pub u32);

impl Damageable for HealthComp {
    fn take_damage(&mut self, amount: u32) {
        self.0 = self.0.saturating_sub(amount);
    }
}

/// Raised when a guard's detection meter crosses a boundary.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionChanged {
    /// Guard entity.
    pub guard: Entity,
    /// Boundary crossed.
    pub event: DetectionEvent,
}

/// Raised when a guard enters a new state.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct GuardSwitched {
    /// Guard entity.
    pub guard: Entity,
    /// New active state.
    pub state: StateName,
}

const fn listener_id(entity: Entity) -> ListenerId {
    ListenerId(entity.to_bits())
}

/// Resolve queued broadcasts and advance pulses against the current guard
/// positions.
pub fn tick_noise(
    time: Res<Time>,
    mut noise: ResMut<NoiseSystem>,
    mut level: ResMut<LevelGeometry>,
    mut pending: ResMut<PendingNoise>,
    mut queued: ResMut<QueuedBroadcasts>,
    guards: Query<(Entity, &GuardAgent)>,
) {
    level.0.clear_listeners();
    for (entity, agent) in &guards {
        level.0.set_listener(listener_id(entity), agent.0.pose().position);
    }
    let now = time.elapsed_secs();
    for broadcast in queued.0.drain(..) {
        noise.broadcast(
            broadcast.origin,
            broadcast.radius,
            broadcast.intensity,
            now,
            &level.0,
            &mut pending.0,
        );
    }
    noise.tick(time.delta_secs(), now, &level.0, &mut pending.0);
}

/// Hand pending deliveries to the guards' listeners.
pub fn deliver_noise(
    mut commands: Commands,
    time: Res<Time>,
    level: Res<LevelGeometry>,
    mut pending: ResMut<PendingNoise>,
    mut guards: Query<(Entity, &mut GuardAgent)>,
) {
    let now = time.elapsed_secs();
    for (listener, event) in pending.0.drain(..) {
        for (entity, mut agent) in &mut guards {
            if listener_id(entity) != listener {
                continue;
            }
            let before = agent.0.state_name().clone();
            if agent.0.on_noise_heard(&event, now, &level.0) && *agent.0.state_name() != before {
                commands.trigger(GuardSwitched {
                    guard: entity,
                    state: agent.0.state_name().clone(),
                });
            }
        }
    }
}

/// Run every guard brain for this frame.
pub fn tick_guards(
    mut commands: Commands,
    time: Res<Time>,
    level: Res<LevelGeometry>,
    mut guards: Query<(Entity, &mut GuardAgent)>,
    mut intruders: Query<(&Transform, Option<&mut HealthComp>), With<IntruderComp>>,
) {
    let dt = time.delta_secs();
    let now = time.elapsed_secs();
    let mut intruder = intruders.iter_mut().next();

    for (entity, mut agent) in &mut guards {
        let mut frame = Frame::new(dt, now, &level.0);
        if let Some((transform, health)) = intruder.as_mut() {
            frame.target = Some(TargetRef {
                position: transform.translation.truncate(),
                damageable: health
                    .as_deref_mut()
                    .map(|h| h as &mut dyn Damageable),
            });
        }
        let report = agent.0.update(&mut frame);
        for event in report.detection.iter() {
            commands.trigger(DetectionChanged {
                guard: entity,
                event,
            });
        }
        if let Some(state) = report.switched_to {
            commands.trigger(GuardSwitched {
                guard: entity,
                state,
            });
        }
    }
}

/// Copy guard poses into their transforms.
pub fn sync_guard_transforms(mut guards: Query<(&GuardAgent, &mut Transform)>) {
    for (agent, mut transform) in &mut guards {
        let pose = agent.0.pose();
        transform.translation.x = pose.position.x;
        transform.translation.y = pose.position.y;
        transform.rotation = Quat::from_rotation_z(pose.forward.to_angle());
    }
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value for Events V2."
)]
fn log_detection(event: On<DetectionChanged>) {
    let DetectionChanged { guard, event: crossed } = event.event();
    debug!("guard {guard:?} detection {crossed:?}");
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value for Events V2."
)]
fn log_switch(event: On<GuardSwitched>) {
    let GuardSwitched { guard, state } = event.event();
    info!("guard {guard:?} entered `{state}`");
}

/// Installs the guard and noise systems.
#[derive(Default)]
pub struct GuardAiPlugin;

impl Plugin for GuardAiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NoiseSystem>();
        app.init_resource::<LevelGeometry>();
        app.init_resource::<PendingNoise>();
        app.init_resource::<QueuedBroadcasts>();
        app.add_observer(log_detection);
        app.add_observer(log_switch);
        app.add_systems(
            Update,
            (tick_noise, deliver_noise, tick_guards, sync_guard_transforms).chain(),
        );
    }
}
