//! Numeric guards used across the simulation.
//!
//! Timers and rates come from hand-authored config, so every division goes
//! through these helpers to keep NaN and infinities out of the guard state.

/// Clamp `value` into `[0, 1]`, mapping NaN to `0`.
///
/// # Examples
/// ```
/// use nightwatch::numeric::clamp01;
/// assert_eq!(clamp01(1.5), 1.0);
/// assert_eq!(clamp01(-0.5), 0.0);
/// assert_eq!(clamp01(f32::NAN), 0.0);
/// ```
#[must_use]
pub const fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Return `value`, raised to `floor` when it is smaller or not finite.
///
/// Used as the divisor guard for config-provided durations and radii.
#[must_use]
pub const fn at_least(value: f32, floor: f32) -> f32 {
    if value.is_finite() {
        value.max(floor)
    } else {
        floor
    }
}

/// Sanitise a frame delta: negative and non-finite deltas become `0`.
#[must_use]
pub const fn frame_delta(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.25, 0.25)]
    #[case(-3.0, 0.0)]
    #[case(7.0, 1.0)]
    #[case(f32::INFINITY, 1.0)]
    fn clamp01_bounds(#[case] input: f32, #[case] expected: f32) {
        assert_eq!(clamp01(input), expected);
    }

    #[rstest]
    #[case(0.0, 0.01, 0.01)]
    #[case(-1.0, 0.01, 0.01)]
    #[case(f32::NAN, 0.01, 0.01)]
    #[case(2.0, 0.01, 2.0)]
    fn at_least_raises_small_values(#[case] input: f32, #[case] floor: f32, #[case] expected: f32) {
        assert_eq!(at_least(input, floor), expected);
    }

    #[rstest]
    fn frame_delta_rejects_negative_and_nan() {
        assert_eq!(frame_delta(-0.1), 0.0);
        assert_eq!(frame_delta(f32::NAN), 0.0);
        assert_eq!(frame_delta(0.016), 0.016);
    }
}
