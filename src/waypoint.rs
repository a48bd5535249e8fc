//! Static patrol routes.
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// How a patrol walks its waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    /// Wrap from the last point back to the first.
    #[default]
    Loop,
    /// Reverse direction at either end.
    PingPong,
    /// Stop at the last point.
    Once,
}

/// Position along a path: the waypoint being walked to and the direction of
/// travel (`1` or `-1`, only meaningful for [`TraversalMode::PingPong`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatrolCursor {
    /// Index of the current target waypoint.
    pub index: usize,
    /// Travel direction.
    pub direction: i8,
}

impl PatrolCursor {
    /// Cursor heading forward toward `index`.
    #[must_use]
    pub const fn at(index: usize) -> Self {
        Self {
            index,
            direction: 1,
        }
    }
}

/// Ordered sequence of patrol points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaypointPath {
    points: Vec<Vec2>,
    #[serde(default)]
    mode: TraversalMode,
}

impl WaypointPath {
    /// Path over `points` walked in `mode`.
    #[must_use]
    pub const fn new(points: Vec<Vec2>, mode: TraversalMode) -> Self {
        Self { points, mode }
    }

    /// Number of waypoints.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the path has no waypoints; patrol then idles.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Traversal mode.
    #[must_use]
    pub const fn mode(&self) -> TraversalMode {
        self.mode
    }

    /// Waypoint at `index`, if it exists.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Vec2> {
        self.points.get(index).copied()
    }

    /// Index of the waypoint closest to `position`; ties keep the lowest
    /// index. Returns `None` for an empty path.
    ///
    /// # Examples
    /// ```
    /// use glam::Vec2;
    /// use nightwatch::waypoint::{TraversalMode, WaypointPath};
    /// let path = WaypointPath::new(
    ///     vec![Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(5.0, 0.0)],
    ///     TraversalMode::Loop,
    /// );
    /// assert_eq!(path.closest_index(Vec2::ZERO), Some(0));
    /// assert_eq!(path.closest_index(Vec2::new(4.0, 0.0)), Some(2));
    /// ```
    #[must_use]
    pub fn closest_index(&self, position: Vec2) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, point) in self.points.iter().enumerate() {
            let d = point.distance_squared(position);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((index, d));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Cursor following `cursor` under this path's traversal mode.
    #[must_use]
    pub fn advance(&self, cursor: PatrolCursor) -> PatrolCursor {
        self.advance_with(cursor, self.mode)
    }

    /// Cursor following `cursor` under an explicit traversal mode.
    #[must_use]
    pub fn advance_with(&self, cursor: PatrolCursor, mode: TraversalMode) -> PatrolCursor {
        let count = self.points.len();
        if count <= 1 {
            return PatrolCursor::at(0);
        }
        let last = count - 1;
        match mode {
            TraversalMode::Loop => PatrolCursor::at((cursor.index + 1) % count),
            TraversalMode::Once => PatrolCursor::at((cursor.index + 1).min(last)),
            TraversalMode::PingPong => {
                let forward = cursor.direction >= 0;
                let blocked = if forward {
                    cursor.index >= last
                } else {
                    cursor.index == 0
                };
                let direction = if blocked == forward { -1 } else { 1 };
                let index = if direction > 0 {
                    (cursor.index + 1).min(last)
                } else {
                    cursor.index.saturating_sub(1)
                };
                PatrolCursor { index, direction }
            }
        }
    }
}
