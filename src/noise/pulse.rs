//! Expanding noise ring with line-of-sight gated delivery.
//!
//! A pulse grows from its origin until it reaches its maximum radius, then
//! lingers for a while before it is disposed. Independently of that
//! lifecycle it sweeps for listeners on a fixed interval; a listener that
//! is inside the ring and not occluded from the origin hears the pulse
//! exactly once over the pulse's whole lifetime.

use glam::Vec2;
use hashbrown::HashSet;
use log::{debug, trace};

use super::event::{NoiseEvent, NoiseSink};
use crate::numeric::{at_least, clamp01, frame_delta};
use crate::spatial::{ListenerId, ObstacleMask, SpatialQuery};
use crate::{DEFAULT_NOTIFY_INTERVAL, MIN_NOISE_RADIUS};

/// Identity of a pulse within its [`super::NoiseSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PulseId(pub u64);

/// Parameters of a noise emission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseEmission {
    /// Where the noise starts.
    pub origin: Vec2,
    /// Final ring radius.
    pub max_radius: f32,
    /// Ring growth, units per second.
    pub expand_speed: f32,
    /// Seconds the full ring lingers before disposal.
    pub life_after_reach: f32,
    /// Layers that block the noise.
    pub obstacle_mask: ObstacleMask,
    /// Seconds between listener sweeps.
    pub notify_interval: f32,
}

impl NoiseEmission {
    /// Emission with the default notify interval.
    #[must_use]
    pub const fn new(
        origin: Vec2,
        max_radius: f32,
        expand_speed: f32,
        life_after_reach: f32,
        obstacle_mask: ObstacleMask,
    ) -> Self {
        Self {
            origin,
            max_radius,
            expand_speed,
            life_after_reach,
            obstacle_mask,
            notify_interval: DEFAULT_NOTIFY_INTERVAL,
        }
    }

    /// Noise of a failed lockpick attempt: a fast ring that fades quickly.
    #[must_use]
    pub const fn lockpick_failure(origin: Vec2, radius: f32, obstacle_mask: ObstacleMask) -> Self {
        Self::new(origin, radius, 18.0, 0.12, obstacle_mask)
    }

    /// Override the sweep interval.
    #[must_use]
    pub const fn with_notify_interval(mut self, interval: f32) -> Self {
        self.notify_interval = interval;
        self
    }
}

/// Lifecycle of a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulsePhase {
    /// Radius still growing.
    Expanding,
    /// Full radius reached; counting down the linger time.
    Lingering,
    /// Finished; the owner drops it.
    Disposed,
}

/// One live noise ring.
#[derive(Debug, Clone)]
pub struct NoisePulse {
    id: PulseId,
    emission: NoiseEmission,
    radius: f32,
    linger_left: f32,
    notify_in: f32,
    phase: PulsePhase,
    notified: HashSet<ListenerId>,
}

impl NoisePulse {
    /// Start a pulse at radius zero.
    #[must_use]
    pub fn new(id: PulseId, emission: NoiseEmission) -> Self {
        Self {
            id,
            linger_left: emission.life_after_reach,
            emission: NoiseEmission {
                max_radius: emission.max_radius.max(0.0),
                ..emission
            },
            radius: 0.0,
            notify_in: 0.0,
            phase: PulsePhase::Expanding,
            notified: HashSet::new(),
        }
    }

    /// Pulse identity.
    #[must_use]
    pub const fn id(&self) -> PulseId {
        self.id
    }

    /// Origin of the ring.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.emission.origin
    }

    /// Current ring radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Final ring radius.
    #[must_use]
    pub const fn max_radius(&self) -> f32 {
        self.emission.max_radius
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> PulsePhase {
        self.phase
    }

    /// Whether `listener` already heard this pulse.
    #[must_use]
    pub fn has_notified(&self, listener: ListenerId) -> bool {
        self.notified.contains(&listener)
    }

    /// Advance by `dt` seconds and run a listener sweep when due.
    ///
    /// The tick that disposes the pulse still sweeps; later ticks do not.
    pub fn tick(
        &mut self,
        dt: f32,
        now: f32,
        spatial: &dyn SpatialQuery,
        sink: &mut dyn NoiseSink,
    ) -> PulsePhase {
        let step = frame_delta(dt);
        let live = self.phase != PulsePhase::Disposed;
        match self.phase {
            PulsePhase::Expanding => self.expand(step),
            PulsePhase::Lingering => {
                self.linger_left -= step;
                if self.linger_left <= 0.0 {
                    debug!("noise pulse {:?} disposed", self.id);
                    self.phase = PulsePhase::Disposed;
                }
            }
            PulsePhase::Disposed => {}
        }

        if live {
            self.notify_in -= step;
            if self.notify_in <= 0.0 {
                self.notify_in = self.emission.notify_interval;
                self.notify(now, spatial, sink);
            }
        }
        self.phase
    }

    fn expand(&mut self, dt: f32) {
        let speed = self.emission.expand_speed;
        if !(speed > 0.0 && speed.is_finite()) {
            return;
        }
        self.radius = (self.radius + speed * dt).min(self.emission.max_radius);
        if self.radius >= self.emission.max_radius {
            trace!("noise pulse {:?} fully expanded", self.id);
            self.phase = PulsePhase::Lingering;
        }
    }

    fn notify(&mut self, now: f32, spatial: &dyn SpatialQuery, sink: &mut dyn NoiseSink) {
        let origin = self.emission.origin;
        let reach = at_least(self.emission.max_radius, MIN_NOISE_RADIUS);
        for listener in spatial.query_listeners(origin, self.radius) {
            if self.notified.contains(&listener.id) {
                continue;
            }
            if spatial.is_occluded(origin, listener.position, self.emission.obstacle_mask) {
                trace!("noise pulse {:?} occluded from {:?}", self.id, listener.id);
                continue;
            }
            self.notified.insert(listener.id);
            let distance = origin.distance(listener.position);
            let event = NoiseEvent {
                origin,
                current_radius: self.radius,
                max_radius: self.emission.max_radius,
                timestamp: now,
                strength: 1.0 - clamp01(distance / reach),
            };
            sink.deliver(listener.id, &event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{SegmentWorld, Wall};
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn listeners() -> SegmentWorld {
        let mut world = SegmentWorld::new();
        world.set_listener(ListenerId(1), Vec2::new(2.0, 0.0));
        world.set_listener(ListenerId(2), Vec2::new(0.0, 6.0));
        world
    }

    fn emission() -> NoiseEmission {
        NoiseEmission::new(Vec2::ZERO, 8.0, 4.0, 0.5, ObstacleMask::ALL)
    }

    #[rstest]
    fn grows_then_lingers_then_disposes(listeners: SegmentWorld) {
        let mut pulse = NoisePulse::new(PulseId(1), emission());
        let mut sink = Vec::new();
        assert_eq!(pulse.tick(1.0, 1.0, &listeners, &mut sink), PulsePhase::Expanding);
        assert_relative_eq!(pulse.radius(), 4.0);
        assert_eq!(pulse.tick(1.5, 2.5, &listeners, &mut sink), PulsePhase::Lingering);
        assert_relative_eq!(pulse.radius(), 8.0);
        assert_eq!(pulse.tick(0.25, 2.75, &listeners, &mut sink), PulsePhase::Lingering);
        assert_eq!(pulse.tick(0.25, 3.0, &listeners, &mut sink), PulsePhase::Disposed);
        assert_relative_eq!(pulse.radius(), 8.0);
    }

    #[rstest]
    fn delivers_only_inside_ring(listeners: SegmentWorld) {
        let mut pulse = NoisePulse::new(PulseId(1), emission().with_notify_interval(0.0));
        let mut sink = Vec::new();
        pulse.tick(1.0, 1.0, &listeners, &mut sink);
        assert_eq!(sink.len(), 1);
        let (id, event) = *sink.first().expect("one delivery");
        assert_eq!(id, ListenerId(1));
        assert_relative_eq!(event.strength, 0.75);
        assert_relative_eq!(event.current_radius, 4.0);
        assert_relative_eq!(event.timestamp, 1.0);

        pulse.tick(1.0, 2.0, &listeners, &mut sink);
        let ids: Vec<_> = sink.iter().map(|(listener, _)| *listener).collect();
        assert_eq!(ids, vec![ListenerId(1), ListenerId(2)]);
    }

    #[rstest]
    fn walls_block_delivery() {
        let mut world = SegmentWorld::with_walls(vec![Wall::new(
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
        )]);
        world.set_listener(ListenerId(7), Vec2::new(2.0, 0.0));
        let mut pulse = NoisePulse::new(PulseId(1), emission());
        let mut sink = Vec::new();
        for step in 0..40 {
            pulse.tick(0.05, 0.05 * step as f32, &world, &mut sink);
        }
        assert!(sink.is_empty());
        assert!(!pulse.has_notified(ListenerId(7)));
    }

    #[rstest]
    fn non_positive_speed_never_lingers(listeners: SegmentWorld) {
        let mut pulse = NoisePulse::new(
            PulseId(1),
            NoiseEmission::new(Vec2::ZERO, 5.0, 0.0, 0.1, ObstacleMask::ALL),
        );
        let mut sink = Vec::new();
        for _ in 0..100 {
            pulse.tick(0.1, 0.0, &listeners, &mut sink);
        }
        assert_eq!(pulse.phase(), PulsePhase::Expanding);
        assert_relative_eq!(pulse.radius(), 0.0);
    }

    #[rstest]
    fn zero_radius_lingers_immediately(listeners: SegmentWorld) {
        let mut pulse = NoisePulse::new(
            PulseId(1),
            NoiseEmission::new(Vec2::ZERO, -3.0, 5.0, 0.1, ObstacleMask::ALL),
        );
        let mut sink = Vec::new();
        assert_eq!(pulse.tick(0.1, 0.0, &listeners, &mut sink), PulsePhase::Lingering);
        assert_relative_eq!(pulse.radius(), 0.0);
    }

    #[rstest]
    fn disposing_tick_still_sweeps() {
        let mut world = SegmentWorld::new();
        let mut pulse = NoisePulse::new(PulseId(1), emission().with_notify_interval(0.0));
        let mut sink = Vec::new();
        assert_eq!(pulse.tick(2.0, 2.0, &world, &mut sink), PulsePhase::Lingering);

        world.set_listener(ListenerId(9), Vec2::new(3.0, 0.0));
        assert_eq!(pulse.tick(0.5, 2.5, &world, &mut sink), PulsePhase::Disposed);
        assert!(pulse.has_notified(ListenerId(9)));
        assert_eq!(sink.len(), 1);

        world.set_listener(ListenerId(10), Vec2::new(1.0, 0.0));
        pulse.tick(0.1, 2.6, &world, &mut sink);
        assert_eq!(sink.len(), 1);
    }
}
