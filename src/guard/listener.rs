//! Filters deciding whether a guard reacts to a delivered noise.

use glam::Vec2;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::guard::state::StateName;
use crate::noise::{NoiseEvent, NoiseSignal};
use crate::numeric::{at_least, clamp01};
use crate::spatial::{ObstacleMask, SpatialQuery};
use crate::MIN_NOISE_RADIUS;

/// Routing and filter tuning for a guard's hearing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerSettings {
    /// State to force when a noise is accepted.
    pub investigate_state: Option<StateName>,
    /// Whether accepted noises force the investigate state.
    pub auto_switch: bool,
    /// Minimum seconds between accepted noises.
    pub min_interval: f32,
    /// Noises whose origin is farther than this are ignored.
    pub max_distance: f32,
    /// Layers that block sound between origin and guard.
    pub los_mask: ObstacleMask,
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            investigate_state: Some(StateName::new("investigate")),
            auto_switch: true,
            min_interval: 0.25,
            max_distance: 20.0,
            los_mask: ObstacleMask::NONE,
        }
    }
}

/// Per-guard hearing filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GuardNoiseListener {
    settings: ListenerSettings,
    last_heard_at: Option<f32>,
}

impl GuardNoiseListener {
    /// Listener that has heard nothing yet.
    #[must_use]
    pub const fn new(settings: ListenerSettings) -> Self {
        Self {
            settings,
            last_heard_at: None,
        }
    }

    /// Routing and filter tuning.
    #[must_use]
    pub const fn settings(&self) -> &ListenerSettings {
        &self.settings
    }

    /// Time of the last accepted noise.
    #[must_use]
    pub const fn last_heard_at(&self) -> Option<f32> {
        self.last_heard_at
    }

    /// State to switch to for an accepted noise, when routing is enabled.
    #[must_use]
    pub const fn route(&self) -> Option<&StateName> {
        if self.settings.auto_switch {
            self.settings.investigate_state.as_ref()
        } else {
            None
        }
    }

    /// Apply the rate, range and occlusion filters to `event`.
    ///
    /// Returns the signal to store in the guard's inbox when accepted. Only
    /// accepted noises restart the rate-limit window.
    pub fn hear(
        &mut self,
        event: &NoiseEvent,
        guard_position: Vec2,
        now: f32,
        spatial: &dyn SpatialQuery,
    ) -> Option<NoiseSignal> {
        if let Some(last) = self.last_heard_at {
            if now - last < self.settings.min_interval {
                trace!("noise ignored: heard one {:.2}s ago", now - last);
                return None;
            }
        }

        let to = event.origin - guard_position;
        let max = self.settings.max_distance;
        if to.length_squared() > max * max {
            trace!("noise ignored: origin out of range");
            return None;
        }
        if spatial.is_occluded(guard_position, event.origin, self.settings.los_mask) {
            trace!("noise ignored: origin occluded");
            return None;
        }

        self.last_heard_at = Some(now);
        let strength = 1.0 - clamp01(to.length() / at_least(event.max_radius, MIN_NOISE_RADIUS));
        Some(NoiseSignal {
            point: event.origin,
            time: now,
            strength,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{SegmentWorld, Wall};
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn listener() -> GuardNoiseListener {
        GuardNoiseListener::new(ListenerSettings::default())
    }

    fn event_at(origin: Vec2) -> NoiseEvent {
        NoiseEvent {
            origin,
            current_radius: 4.0,
            max_radius: 8.0,
            timestamp: 0.0,
            strength: 1.0,
        }
    }

    #[rstest]
    fn first_noise_is_always_eligible(mut listener: GuardNoiseListener) {
        let world = SegmentWorld::new();
        let signal = listener
            .hear(&event_at(Vec2::new(2.0, 0.0)), Vec2::ZERO, 0.0, &world)
            .expect("first noise should be accepted");
        assert_eq!(signal.point, Vec2::new(2.0, 0.0));
        assert_relative_eq!(signal.strength, 0.75);
        assert_eq!(listener.last_heard_at(), Some(0.0));
    }

    #[rstest]
    fn rate_limit_drops_rapid_noises(mut listener: GuardNoiseListener) {
        let world = SegmentWorld::new();
        let event = event_at(Vec2::new(1.0, 0.0));
        assert!(listener.hear(&event, Vec2::ZERO, 1.0, &world).is_some());
        assert!(listener.hear(&event, Vec2::ZERO, 1.1, &world).is_none());
        assert!(listener.hear(&event, Vec2::ZERO, 1.3, &world).is_some());
    }

    #[rstest]
    fn distant_noise_is_ignored(mut listener: GuardNoiseListener) {
        let world = SegmentWorld::new();
        assert!(listener
            .hear(&event_at(Vec2::new(25.0, 0.0)), Vec2::ZERO, 0.0, &world)
            .is_none());
        assert_eq!(listener.last_heard_at(), None);
    }

    #[rstest]
    fn occlusion_only_with_a_mask() {
        let world = SegmentWorld::with_walls(vec![Wall::new(
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
        )]);
        let event = event_at(Vec2::new(2.0, 0.0));
        let mut deaf_to_walls = GuardNoiseListener::new(ListenerSettings::default());
        assert!(deaf_to_walls.hear(&event, Vec2::ZERO, 0.0, &world).is_some());

        let mut walled = GuardNoiseListener::new(ListenerSettings {
            los_mask: ObstacleMask::ALL,
            ..ListenerSettings::default()
        });
        assert!(walled.hear(&event, Vec2::ZERO, 0.0, &world).is_none());
    }

    #[rstest]
    fn routing_respects_auto_switch() {
        let listener = GuardNoiseListener::new(ListenerSettings {
            auto_switch: false,
            ..ListenerSettings::default()
        });
        assert!(listener.route().is_none());
        let routed = GuardNoiseListener::new(ListenerSettings::default());
        assert_eq!(routed.route().map(StateName::as_str), Some("investigate"));
    }
}
