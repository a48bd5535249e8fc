//! Per-guard tuning loaded from JSON.
//!
//! A [`GuardConfig`] is authored once and shared read-only between every
//! guard that references it. Validation reports misconfiguration at load
//! time; the runtime additionally clamps divisors so a bad value can never
//! turn detection progress into NaN.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spatial::ObstacleMask;

/// Failure to load or validate authored data.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value that must be strictly positive was zero, negative or NaN.
    #[error("`{field}` must be positive, got {value}")]
    NonPositive {
        /// Offending field.
        field: &'static str,
        /// Value found.
        value: f32,
    },
    /// Field of view outside `(0, 360]`.
    #[error("`fov` must be within (0, 360] degrees, got {0}")]
    FieldOfView(f32),
    /// A value that must not be negative was negative or NaN.
    #[error("`{field}` must not be negative, got {value}")]
    Negative {
        /// Offending field.
        field: &'static str,
        /// Value found.
        value: f32,
    },
    /// A state transition names a state that is not defined.
    #[error("state `{from}` refers to unknown state `{to}`")]
    UnknownState {
        /// State holding the reference, or `<brain>` for brain-level slots.
        from: String,
        /// Missing state name.
        to: String,
    },
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The JSON did not match the expected shape.
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable guard tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Walking speed along the patrol path, units per second.
    pub patrol_speed: f32,
    /// Running speed while chasing, units per second.
    pub chase_speed: f32,
    /// Maximum sensing distance.
    pub vision_radius: f32,
    /// Full cone angle in degrees.
    pub fov: f32,
    /// Occluding layers for the line-of-sight ray.
    pub obstacles_mask: ObstacleMask,
    /// Seconds of full-factor sight needed to be spotted.
    pub detection_time: f32,
    /// Seconds for progress to decay from 1 to 0 once out of sight; also the
    /// chase give-up time.
    pub lose_time: f32,
    /// Seconds after losing sight during which progress does not decay.
    pub grace_after_lost: f32,
    /// Distance at which chasing turns into attacking.
    pub attack_range: f32,
    /// Seconds between hits.
    pub attack_cooldown: f32,
    /// Damage per hit.
    pub attack_damage: u32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            patrol_speed: 1.8,
            chase_speed: 2.6,
            vision_radius: 6.0,
            fov: 90.0,
            obstacles_mask: ObstacleMask::ALL,
            detection_time: 1.2,
            lose_time: 1.0,
            grace_after_lost: 0.2,
            attack_range: 1.2,
            attack_cooldown: 0.8,
            attack_damage: 1,
        }
    }
}

impl GuardConfig {
    /// Parse and validate a config from JSON. Missing fields take defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::Json`] for malformed input and the relevant
    /// validation error for out-of-range values.
    ///
    /// # Examples
    /// ```
    /// use nightwatch::GuardConfig;
    /// let cfg = GuardConfig::from_json_str(r#"{ "fov": 120.0 }"#).unwrap();
    /// assert_eq!(cfg.fov, 120.0);
    /// assert_eq!(cfg.chase_speed, 2.6);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`GuardConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = path.as_ref();
        let text = fs::read_to_string(file).map_err(|source| ConfigError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Check every field against its documented range.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("patrol_speed", self.patrol_speed)?;
        positive("chase_speed", self.chase_speed)?;
        positive("vision_radius", self.vision_radius)?;
        if !(self.fov > 0.0 && self.fov <= 360.0) {
            return Err(ConfigError::FieldOfView(self.fov));
        }
        positive("detection_time", self.detection_time)?;
        positive("lose_time", self.lose_time)?;
        non_negative("grace_after_lost", self.grace_after_lost)?;
        positive("attack_range", self.attack_range)?;
        positive("attack_cooldown", self.attack_cooldown)?;
        Ok(())
    }

    /// Half of the field of view, in degrees.
    #[must_use]
    pub const fn half_fov(&self) -> f32 {
        self.fov * 0.5
    }
}

pub(crate) const fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

pub(crate) const fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_are_valid() {
        GuardConfig::default()
            .validate()
            .expect("shipped defaults should validate");
    }

    #[rstest]
    fn partial_json_uses_defaults() {
        let cfg = GuardConfig::from_json_str(r#"{ "attack_damage": 3, "obstacles_mask": 4 }"#)
            .expect("partial config should parse");
        assert_eq!(cfg.attack_damage, 3);
        assert_eq!(cfg.obstacles_mask, ObstacleMask(4));
        assert_eq!(cfg.vision_radius, 6.0);
    }

    #[rstest]
    #[case(r#"{ "detection_time": 0.0 }"#, "detection_time")]
    #[case(r#"{ "lose_time": -1.0 }"#, "lose_time")]
    #[case(r#"{ "patrol_speed": 0.0 }"#, "patrol_speed")]
    fn rejects_non_positive(#[case] json: &str, #[case] field: &str) {
        let err = GuardConfig::from_json_str(json).expect_err("value should be rejected");
        assert!(
            matches!(err, ConfigError::NonPositive { field: f, .. } if f == field),
            "unexpected error {err}"
        );
    }

    #[rstest]
    #[case(0.0)]
    #[case(361.0)]
    fn rejects_out_of_range_fov(#[case] fov: f32) {
        let cfg = GuardConfig {
            fov,
            ..GuardConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::FieldOfView(_))));
    }

    #[rstest]
    fn zero_grace_is_allowed() {
        let cfg = GuardConfig {
            grace_after_lost: 0.0,
            ..GuardConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[rstest]
    fn malformed_json_is_reported() {
        assert!(matches!(
            GuardConfig::from_json_str("{ fov: }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[rstest]
    fn missing_file_is_reported() {
        let err = GuardConfig::load("/nonexistent/guard.json").expect_err("file is absent");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
