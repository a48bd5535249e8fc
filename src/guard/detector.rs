//! Detection meter accumulating perception samples over time.
//!
//! Progress rises while the target is visible, scaled by the visibility
//! factor, and decays once it is not. A short grace period after losing
//! sight freezes the meter so brief occlusions do not reset it.

use crate::config::GuardConfig;
use crate::guard::perception::Visibility;
use crate::numeric::{at_least, clamp01, frame_delta};
use crate::{MIN_TIME_SCALE, PROGRESS_EPSILON};

/// Boundary crossed by the detection meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionEvent {
    /// Progress left zero.
    DetectStarted,
    /// Progress reached one.
    FullySpotted,
    /// Progress returned to zero.
    Lost,
}

/// Events crossed during one detector tick. Several may fire at once, for
/// example a huge `dt` taking progress from 0 straight to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetectionTransitions {
    /// [`DetectionEvent::DetectStarted`] fired.
    pub started: bool,
    /// [`DetectionEvent::FullySpotted`] fired.
    pub spotted: bool,
    /// [`DetectionEvent::Lost`] fired.
    pub lost: bool,
}

impl DetectionTransitions {
    /// True when no boundary was crossed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.started || self.spotted || self.lost)
    }

    /// Fired events in `DetectStarted`, `FullySpotted`, `Lost` order.
    pub fn iter(&self) -> impl Iterator<Item = DetectionEvent> {
        [
            (self.started, DetectionEvent::DetectStarted),
            (self.spotted, DetectionEvent::FullySpotted),
            (self.lost, DetectionEvent::Lost),
        ]
        .into_iter()
        .filter_map(|(fired, event)| fired.then_some(event))
    }
}

/// Per-guard detection meter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GuardDetector {
    progress: f32,
    grace: f32,
}

impl GuardDetector {
    /// Meter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            progress: 0.0,
            grace: 0.0,
        }
    }

    /// Detection progress in `[0, 1]`.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether the meter is full.
    #[must_use]
    pub const fn is_spotted(&self) -> bool {
        self.progress >= 1.0
    }

    /// Seconds of grace left before progress starts decaying.
    #[must_use]
    pub const fn grace_remaining(&self) -> f32 {
        self.grace.max(0.0)
    }

    /// Integrate one perception sample over `dt` seconds.
    ///
    /// `None` means perception has nothing to look at (no target bound) and
    /// leaves the meter untouched.
    ///
    /// # Examples
    /// ```
    /// use nightwatch::guard::{GuardDetector, Visibility};
    /// use nightwatch::GuardConfig;
    ///
    /// let config = GuardConfig { detection_time: 1.0, ..GuardConfig::default() };
    /// let mut detector = GuardDetector::new();
    /// let seen = Visibility { visible: true, factor: 0.5 };
    /// let fired = detector.tick(0.5, &config, Some(seen));
    /// assert!(fired.started);
    /// assert!((detector.progress() - 0.25).abs() < 1e-6);
    /// ```
    pub fn tick(
        &mut self,
        dt: f32,
        config: &GuardConfig,
        sample: Option<Visibility>,
    ) -> DetectionTransitions {
        let Some(reading) = sample else {
            return DetectionTransitions::default();
        };
        let step = frame_delta(dt);

        let delta = if reading.visible {
            self.grace = config.grace_after_lost;
            let weight = if reading.factor > 0.0 { reading.factor } else { 1.0 };
            weight * step / at_least(config.detection_time, MIN_TIME_SCALE)
        } else if self.grace > 0.0 {
            self.grace -= step;
            0.0
        } else {
            -step / at_least(config.lose_time, MIN_TIME_SCALE)
        };

        let prev = self.progress;
        let next = snap_progress(clamp01(prev + delta));
        self.progress = next;
        DetectionTransitions {
            started: prev <= 0.0 && next > 0.0,
            spotted: prev < 1.0 && next >= 1.0,
            lost: prev > 0.0 && next <= 0.0,
        }
    }

    /// Drop progress and grace back to zero without firing events.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Round progress that float accumulation left a hair away from either end.
const fn snap_progress(progress: f32) -> f32 {
    if progress >= 1.0 - PROGRESS_EPSILON {
        1.0
    } else if progress <= PROGRESS_EPSILON {
        0.0
    } else {
        progress
    }
}

/// What a detection indicator above the guard should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorState {
    /// Nothing: the guard has not noticed anything.
    Hidden,
    /// A partially filled meter.
    Partial(f32),
    /// The fully-spotted icon.
    Spotted,
}

impl IndicatorState {
    /// Indicator for the detector's current progress.
    #[must_use]
    pub const fn from_detector(detector: &GuardDetector) -> Self {
        if detector.is_spotted() {
            Self::Spotted
        } else if detector.progress() > 0.0 {
            Self::Partial(detector.progress())
        } else {
            Self::Hidden
        }
    }
}
