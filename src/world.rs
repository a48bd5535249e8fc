//! Headless world stepping guards and noise in frame order.
//!
//! [`GuardWorld`] owns the level, the noise system, the guards and the
//! intruder. Each [`GuardWorld::step`] advances noise pulses, hands their
//! deliveries to the guards' listeners and then updates every guard brain,
//! which is the same order the Bevy plugin chains its systems in.

use glam::Vec2;
use log::{debug, info};

use crate::guard::{DetectionEvent, Frame, GuardBrain, Damageable, StateName};
use crate::noise::{NoiseEmission, NoiseEvent, NoiseSystem, PulseId};
use crate::numeric::frame_delta;
use crate::spatial::{ListenerId, SegmentWorld, Wall};

/// The player character as far as guards are concerned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intruder {
    /// Position in the level.
    pub position: Vec2,
    /// Remaining hit points.
    pub health: u32,
}

impl Intruder {
    /// Intruder at `position` with `health` hit points.
    #[must_use]
    pub const fn new(position: Vec2, health: u32) -> Self {
        Self { position, health }
    }

    /// Whether the intruder has run out of health.
    #[must_use]
    pub const fn is_down(&self) -> bool {
        self.health == 0
    }
}

impl Damageable for Intruder {
    fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
        debug!("intruder took {amount} damage, {} left", self.health);
    }
}

/// Notable things that happened during a step.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    /// A guard accepted a noise.
    HeardNoise {
        /// Listening guard.
        guard: ListenerId,
        /// Where the noise came from.
        origin: Vec2,
    },
    /// A guard's detection meter crossed a boundary.
    Detection {
        /// Watching guard.
        guard: ListenerId,
        /// Boundary crossed.
        event: DetectionEvent,
    },
    /// A guard changed state.
    Switched {
        /// Guard that switched.
        guard: ListenerId,
        /// New active state.
        state: StateName,
    },
}

/// Level, noise, guards and intruder stepped together.
#[derive(Debug, Default)]
pub struct GuardWorld {
    spatial: SegmentWorld,
    noise: NoiseSystem,
    guards: Vec<(ListenerId, GuardBrain)>,
    intruder: Option<Intruder>,
    now: f32,
    next_guard: u64,
}

impl GuardWorld {
    /// World over `spatial` with no guards and no intruder.
    #[must_use]
    pub fn new(spatial: SegmentWorld) -> Self {
        Self {
            spatial,
            ..Self::default()
        }
    }

    /// Add a guard; its id doubles as its listener id.
    pub fn add_guard(&mut self, brain: GuardBrain) -> ListenerId {
        let id = ListenerId(self.next_guard);
        self.next_guard += 1;
        self.spatial.set_listener(id, brain.pose().position);
        self.guards.push((id, brain));
        id
    }

    /// Guard registered under `id`.
    #[must_use]
    pub fn guard(&self, id: ListenerId) -> Option<&GuardBrain> {
        self.guards.iter().find(|(gid, _)| *gid == id).map(|(_, g)| g)
    }

    /// Guards in insertion order.
    pub fn guards(&self) -> impl Iterator<Item = (ListenerId, &GuardBrain)> {
        self.guards.iter().map(|(id, g)| (*id, g))
    }

    /// Put the intruder in the level, replacing any previous one.
    pub const fn set_intruder(&mut self, intruder: Option<Intruder>) {
        self.intruder = intruder;
    }

    /// Move the intruder; ignored when there is none.
    pub const fn move_intruder(&mut self, position: Vec2) {
        if let Some(intruder) = self.intruder.as_mut() {
            intruder.position = position;
        }
    }

    /// Current intruder.
    #[must_use]
    pub const fn intruder(&self) -> Option<&Intruder> {
        self.intruder.as_ref()
    }

    /// Add a wall to the level.
    pub fn add_wall(&mut self, wall: Wall) {
        self.spatial.add_wall(wall);
    }

    /// Level geometry and listener positions.
    #[must_use]
    pub const fn spatial(&self) -> &SegmentWorld {
        &self.spatial
    }

    /// Live noise pulses.
    #[must_use]
    pub const fn noise(&self) -> &NoiseSystem {
        &self.noise
    }

    /// Simulation time in seconds.
    #[must_use]
    pub const fn now(&self) -> f32 {
        self.now
    }

    /// Start an expanding noise pulse.
    pub fn emit_noise(&mut self, emission: NoiseEmission) -> PulseId {
        self.noise.emit(emission)
    }

    /// Deliver an instant noise to every guard within `radius`.
    pub fn broadcast_noise(&mut self, origin: Vec2, radius: f32, intensity: f32) -> Vec<WorldEvent> {
        self.sync_listeners();
        let mut deliveries = Vec::new();
        self.noise
            .broadcast(origin, radius, intensity, self.now, &self.spatial, &mut deliveries);
        self.deliver(&deliveries)
    }

    /// Advance the world by `dt` seconds.
    ///
    /// # Examples
    /// ```
    /// use nightwatch::spatial::SegmentWorld;
    /// use nightwatch::world::GuardWorld;
    /// let mut world = GuardWorld::new(SegmentWorld::new());
    /// assert!(world.step(0.1).is_empty());
    /// assert!((world.now() - 0.1).abs() < f32::EPSILON);
    /// ```
    pub fn step(&mut self, dt: f32) -> Vec<WorldEvent> {
        let step = frame_delta(dt);
        self.now += step;
        self.sync_listeners();

        let mut deliveries = Vec::new();
        self.noise.tick(step, self.now, &self.spatial, &mut deliveries);
        let mut events = self.deliver(&deliveries);

        for (id, brain) in &mut self.guards {
            let mut frame = Frame::new(step, self.now, &self.spatial);
            if let Some(intruder) = self.intruder.as_mut() {
                let position = intruder.position;
                frame = frame.with_damageable_target(position, intruder);
            }
            let report = brain.update(&mut frame);
            events.extend(report.detection.iter().map(|event| WorldEvent::Detection {
                guard: *id,
                event,
            }));
            if let Some(state) = report.switched_to {
                events.push(WorldEvent::Switched { guard: *id, state });
            }
        }
        events
    }

    fn sync_listeners(&mut self) {
        for (id, brain) in &self.guards {
            self.spatial.set_listener(*id, brain.pose().position);
        }
    }

    fn deliver(&mut self, deliveries: &[(ListenerId, NoiseEvent)]) -> Vec<WorldEvent> {
        let mut events = Vec::new();
        for (listener, event) in deliveries {
            let Some((id, brain)) = self.guards.iter_mut().find(|(gid, _)| gid == listener) else {
                continue;
            };
            let before = brain.state_name().clone();
            if brain.on_noise_heard(event, self.now, &self.spatial) {
                info!("guard {id:?} heard noise from {:?}", event.origin);
                events.push(WorldEvent::HeardNoise {
                    guard: *id,
                    origin: event.origin,
                });
                if *brain.state_name() != before {
                    events.push(WorldEvent::Switched {
                        guard: *id,
                        state: brain.state_name().clone(),
                    });
                }
            }
        }
        events
    }
}
