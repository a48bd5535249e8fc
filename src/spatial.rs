//! Spatial queries consumed by perception and noise delivery.
//!
//! The guard core never owns level geometry. It asks a [`SpatialQuery`]
//! implementation for ray hits and for listeners inside a circle.
//! [`SegmentWorld`] is the in-crate implementation: walls are line segments
//! tagged with layer bits and listeners are points.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Layer bit set filtering which obstacles a ray can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObstacleMask(pub u32);

impl ObstacleMask {
    /// Matches every layer.
    pub const ALL: Self = Self(u32::MAX);
    /// Matches nothing; rays filtered by it are never blocked.
    pub const NONE: Self = Self(0);

    /// Mask containing a single layer index (0..32).
    #[must_use]
    pub const fn layer(index: u32) -> Self {
        Self(1_u32 << (index % 32))
    }

    /// True when the two masks share at least one layer.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for ObstacleMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Identity of an entity able to hear noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

/// Nearest obstacle reported by a raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec2,
    /// Provider-specific identity of the obstacle.
    pub obstacle: usize,
}

/// A listener found by a circle query, with the position used for
/// occlusion tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListenerPoint {
    /// Listener identity, used for at-most-once delivery.
    pub id: ListenerId,
    /// Listener position.
    pub position: Vec2,
}

/// Occlusion and proximity queries against the level.
pub trait SpatialQuery {
    /// Cast a ray and report the nearest obstacle matching `mask` within
    /// `max_distance`. `direction` need not be normalised; a zero direction
    /// never hits.
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: ObstacleMask,
    ) -> Option<RayHit>;

    /// Listeners whose position lies within `radius` of `center`.
    fn query_listeners(&self, center: Vec2, radius: f32) -> Vec<ListenerPoint>;

    /// True when a ray from `from` to `to` hits an obstacle strictly before
    /// reaching `to`.
    fn is_occluded(&self, from: Vec2, to: Vec2, mask: ObstacleMask) -> bool {
        let delta = to - from;
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return false;
        }
        self.raycast(from, delta / distance, distance, mask)
            .is_some_and(|hit| hit.distance < distance)
    }
}

/// Straight wall segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    /// First endpoint.
    pub start: Vec2,
    /// Second endpoint.
    pub end: Vec2,
    /// Layers this wall belongs to.
    #[serde(default)]
    pub layers: ObstacleMask,
}

impl Wall {
    /// Wall on every layer.
    #[must_use]
    pub const fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            layers: ObstacleMask::ALL,
        }
    }

    /// Wall restricted to `layers`.
    #[must_use]
    pub const fn on_layers(mut self, layers: ObstacleMask) -> Self {
        self.layers = layers;
        self
    }

    /// Ray parameter of the intersection with a normalised ray, if any.
    fn intersect(&self, origin: Vec2, direction: Vec2) -> Option<f32> {
        let edge = self.end - self.start;
        let denom = direction.perp_dot(edge);
        if denom.abs() <= f32::EPSILON {
            return None;
        }
        let offset = self.start - origin;
        let t = offset.perp_dot(edge) / denom;
        let u = offset.perp_dot(direction) / denom;
        (t >= 0.0 && (0.0..=1.0).contains(&u)).then_some(t)
    }
}

/// Level made of wall segments plus point listeners.
#[derive(Debug, Clone, Default)]
pub struct SegmentWorld {
    walls: Vec<Wall>,
    listeners: Vec<ListenerPoint>,
}

impl SegmentWorld {
    /// Empty level: nothing occludes, nobody listens.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Level with the given walls.
    #[must_use]
    pub const fn with_walls(walls: Vec<Wall>) -> Self {
        Self {
            walls,
            listeners: Vec::new(),
        }
    }

    /// Add a wall segment.
    pub fn add_wall(&mut self, wall: Wall) {
        self.walls.push(wall);
    }

    /// Walls in insertion order.
    #[must_use]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Register or move a listener.
    pub fn set_listener(&mut self, id: ListenerId, position: Vec2) {
        if let Some(point) = self.listeners.iter_mut().find(|p| p.id == id) {
            point.position = position;
        } else {
            self.listeners.push(ListenerPoint { id, position });
        }
    }

    /// Remove a listener; unknown ids are ignored.
    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|p| p.id != id);
    }

    /// Drop every listener, keeping the walls.
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }
}

impl SpatialQuery for SegmentWorld {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: ObstacleMask,
    ) -> Option<RayHit> {
        let unit = direction.try_normalize()?;
        self.walls
            .iter()
            .enumerate()
            .filter(|(_, wall)| wall.layers.intersects(mask))
            .filter_map(|(index, wall)| {
                wall.intersect(origin, unit)
                    .filter(|t| *t <= max_distance)
                    .map(|t| RayHit {
                        distance: t,
                        point: origin + unit * t,
                        obstacle: index,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn query_listeners(&self, center: Vec2, radius: f32) -> Vec<ListenerPoint> {
        let radius_sq = radius * radius;
        self.listeners
            .iter()
            .filter(|p| p.position.distance_squared(center) <= radius_sq)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn corridor() -> SegmentWorld {
        SegmentWorld::with_walls(vec![
            Wall::new(Vec2::new(5.0, -5.0), Vec2::new(5.0, 5.0)),
            Wall::new(Vec2::new(3.0, -5.0), Vec2::new(3.0, 5.0)).on_layers(ObstacleMask::layer(2)),
        ])
    }

    #[rstest]
    fn raycast_reports_nearest_matching_wall(corridor: SegmentWorld) {
        let hit = corridor
            .raycast(Vec2::ZERO, Vec2::X, 10.0, ObstacleMask::ALL)
            .expect("ray should hit the nearer wall");
        assert_relative_eq!(hit.distance, 3.0);
        assert_eq!(hit.obstacle, 1);
    }

    #[rstest]
    fn mask_filters_walls(corridor: SegmentWorld) {
        let hit = corridor
            .raycast(Vec2::ZERO, Vec2::X, 10.0, ObstacleMask::layer(0))
            .expect("layer-0 ray should skip the layer-2 wall");
        assert_relative_eq!(hit.distance, 5.0);
        assert!(corridor
            .raycast(Vec2::ZERO, Vec2::X, 10.0, ObstacleMask::NONE)
            .is_none());
    }

    #[rstest]
    fn max_distance_limits_hits(corridor: SegmentWorld) {
        assert!(corridor
            .raycast(Vec2::ZERO, Vec2::X, 2.5, ObstacleMask::ALL)
            .is_none());
    }

    #[rstest]
    fn rays_behind_origin_miss(corridor: SegmentWorld) {
        assert!(corridor
            .raycast(Vec2::ZERO, Vec2::NEG_X, 10.0, ObstacleMask::ALL)
            .is_none());
    }

    #[rstest]
    fn occlusion_needs_hit_before_target(corridor: SegmentWorld) {
        assert!(corridor.is_occluded(Vec2::ZERO, Vec2::new(8.0, 0.0), ObstacleMask::ALL));
        assert!(!corridor.is_occluded(Vec2::ZERO, Vec2::new(2.0, 0.0), ObstacleMask::ALL));
        assert!(!corridor.is_occluded(Vec2::ZERO, Vec2::ZERO, ObstacleMask::ALL));
    }

    #[rstest]
    fn listeners_are_filtered_by_radius() {
        let mut world = SegmentWorld::new();
        world.set_listener(ListenerId(1), Vec2::new(1.0, 0.0));
        world.set_listener(ListenerId(2), Vec2::new(4.0, 0.0));
        world.set_listener(ListenerId(1), Vec2::new(2.0, 0.0));
        let ids: Vec<_> = world
            .query_listeners(Vec2::ZERO, 3.0)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![ListenerId(1)]);
        world.remove_listener(ListenerId(1));
        assert!(world.query_listeners(Vec2::ZERO, 3.0).is_empty());
    }
}
