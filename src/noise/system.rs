//! Owner of every live noise pulse.

use glam::Vec2;
use log::{debug, warn};

use super::event::{NoiseEvent, NoiseSink};
use super::pulse::{NoiseEmission, NoisePulse, PulseId, PulsePhase};
use crate::spatial::SpatialQuery;

/// Service creating, advancing and disposing noise pulses.
///
/// The system is owned by whoever runs the frame loop: the headless
/// [`crate::world::GuardWorld`] or the Bevy plugin, where it is a resource.
#[derive(Debug, Default, bevy::prelude::Resource)]
pub struct NoiseSystem {
    pulses: Vec<NoisePulse>,
    next_id: u64,
}

impl NoiseSystem {
    /// Empty system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new expanding pulse.
    ///
    /// # Examples
    /// ```
    /// use glam::Vec2;
    /// use nightwatch::noise::{NoiseEmission, NoiseSystem};
    /// use nightwatch::spatial::ObstacleMask;
    ///
    /// let mut noise = NoiseSystem::new();
    /// let id = noise.emit(NoiseEmission::lockpick_failure(Vec2::ZERO, 4.0, ObstacleMask::ALL));
    /// assert_eq!(noise.pulses().len(), 1);
    /// assert_eq!(noise.pulses()[0].id(), id);
    /// ```
    pub fn emit(&mut self, emission: NoiseEmission) -> PulseId {
        let id = PulseId(self.next_id);
        self.next_id += 1;
        if emission.expand_speed <= 0.0 || emission.expand_speed.is_nan() {
            warn!(
                "noise pulse {id:?} has expand speed {}; it will never stop expanding",
                emission.expand_speed
            );
        }
        debug!(
            "noise pulse {id:?} emitted at {:?} (radius {})",
            emission.origin, emission.max_radius
        );
        self.pulses.push(NoisePulse::new(id, emission));
        id
    }

    /// Deliver an instant noise to every listener within `radius`.
    ///
    /// Unlike pulses this ignores walls and does not deduplicate; the
    /// strength of every delivery is `intensity`.
    pub fn broadcast(
        &self,
        origin: Vec2,
        radius: f32,
        intensity: f32,
        now: f32,
        spatial: &dyn SpatialQuery,
        sink: &mut dyn NoiseSink,
    ) {
        let reach = radius.max(0.0);
        let event = NoiseEvent {
            origin,
            current_radius: reach,
            max_radius: reach,
            timestamp: now,
            strength: intensity,
        };
        for listener in spatial.query_listeners(origin, reach) {
            sink.deliver(listener.id, &event);
        }
    }

    /// Advance every pulse and drop the disposed ones.
    pub fn tick(
        &mut self,
        dt: f32,
        now: f32,
        spatial: &dyn SpatialQuery,
        sink: &mut dyn NoiseSink,
    ) {
        for pulse in &mut self.pulses {
            pulse.tick(dt, now, spatial, sink);
        }
        self.pulses.retain(|pulse| pulse.phase() != PulsePhase::Disposed);
    }

    /// Live pulses in emission order.
    #[must_use]
    pub fn pulses(&self) -> &[NoisePulse] {
        &self.pulses
    }

    /// Drop every pulse.
    pub fn clear(&mut self) {
        self.pulses.clear();
    }
}
