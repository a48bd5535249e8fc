//! Tuning constants shared by the guard and noise systems.

/// Floor applied to detection and lose times before dividing by them.
pub const MIN_TIME_SCALE: f32 = 0.01;
/// Smallest radius used when normalising distances against a noise radius.
pub const MIN_NOISE_RADIUS: f32 = 0.001;
/// Smallest half field of view (degrees) and vision radius used as divisors
/// when scoring visibility.
pub const MIN_VISION_EXTENT: f32 = 0.001;
/// Detection progress within this distance of 0 or 1 is snapped to the end.
pub const PROGRESS_EPSILON: f32 = 1e-5;
/// Factor applied to the attack range before an attacking guard gives chase
/// again.
pub const ATTACK_EXIT_FACTOR: f32 = 1.1;
/// Default arrival distance for [`crate::mover::Movement::move_towards`].
pub const DEFAULT_STOP_DISTANCE: f32 = 0.05;
/// Squared length under which a direction is treated as zero.
pub const DIRECTION_EPSILON_SQ: f32 = 1e-6;
/// Weight of the facing alignment in the visibility factor.
pub const ANGLE_WEIGHT: f32 = 0.6;
/// Weight of proximity in the visibility factor.
pub const DISTANCE_WEIGHT: f32 = 0.4;
/// Default interval between pulse notification sweeps, in seconds.
pub const DEFAULT_NOTIFY_INTERVAL: f32 = 0.05;
/// Upper bound on `enter`-triggered switches resolved in one brain call.
pub const MAX_CHAINED_SWITCHES: usize = 8;
