//! Interpolator
//!
//! Exponential-decay step toward a target. Each tick covers a fixed fraction
//! (the *transition*) of the remaining distance, which gives ease-out motion
//! that approaches the target asymptotically and never overshoots:
//!
//! ```text
//! pulse    = (target - current) * transition
//! current' = current + pulse
//! ```
//!
//! The fraction is derived from the user-facing duration setting:
//!
//! ```text
//! transition = clamp(1 - duration / 5, 0.05, 1.0)
//! ```

/// Smallest per-tick fraction; keeps the loop terminating for long durations
pub const MIN_TRANSITION: f64 = 0.05;

/// Largest per-tick fraction (jump straight to the target)
pub const MAX_TRANSITION: f64 = 1.0;

/// Upper bound of the duration setting
pub const MAX_DURATION: f64 = 5.0;

/// Lower bound of the duration setting
pub const MIN_DURATION: f64 = 1.0;

/// Next incremental step from `current` toward `target`
pub fn lerp(current: f64, target: f64, transition: f64) -> f64 {
    (target - current) * transition
}

/// Map a duration setting onto the per-tick transition fraction
pub fn transition_for_duration(duration: f64) -> f64 {
    (1.0 - duration / MAX_DURATION).clamp(MIN_TRANSITION, MAX_TRANSITION)
}
