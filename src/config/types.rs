//! Configuration type definitions

use crate::control::OverrideProfile;
use serde::{Deserialize, Serialize};

/// Global scroll parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Smooth wheel input
    #[serde(default = "default_true")]
    pub smooth: bool,

    /// Reverse both axes
    #[serde(default)]
    pub reverse: bool,

    /// Step each continuous sample is normalized to
    #[serde(default = "default_step")]
    pub step: f64,

    /// Speed multiplier applied to every sample
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Smoothing duration (1.0 = snappy, 5.0 = longest glide)
    #[serde(default = "default_duration")]
    pub duration: f64,

    /// Pulse magnitude under which a gesture is complete
    #[serde(default = "default_precision")]
    pub precision: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth: true,
            reverse: false,
            step: default_step(),
            speed: default_speed(),
            duration: default_duration(),
            precision: default_precision(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_step() -> f64 {
    35.0
}

fn default_speed() -> f64 {
    3.0
}

fn default_duration() -> f64 {
    3.9
}

fn default_precision() -> f64 {
    1.0
}

/// Modifier bound to each mode ("control", "option", "command", "shift" or "none")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Dash (5x speed) key
    #[serde(default = "default_dash")]
    pub dash: String,

    /// Toggle (vertical to horizontal) key
    #[serde(default = "default_toggle")]
    pub toggle: String,

    /// Block (hold position, no smoothing) key
    #[serde(default = "default_block")]
    pub block: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            dash: default_dash(),
            toggle: default_toggle(),
            block: default_block(),
        }
    }
}

fn default_dash() -> String {
    "option".to_string()
}

fn default_toggle() -> String {
    "shift".to_string()
}

fn default_block() -> String {
    "none".to_string()
}

/// General behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Only smooth/reverse applications listed in `[[exceptions]]`
    #[serde(default)]
    pub allowlist: bool,
}

/// Emission loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionConfig {
    /// Display refresh rate the clock ticks at
    #[serde(default = "default_refresh_hz")]
    pub refresh_hz: u32,

    /// Attenuated ticks at the start of each gesture
    #[serde(default = "default_jitter_warmup_ticks")]
    pub jitter_warmup_ticks: u32,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            refresh_hz: default_refresh_hz(),
            jitter_warmup_ticks: default_jitter_warmup_ticks(),
        }
    }
}

fn default_refresh_hz() -> u32 {
    60
}

fn default_jitter_warmup_ticks() -> u32 {
    crate::scroll::DEFAULT_WARMUP_TICKS
}

/// Tap watchdog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// Seconds between liveness checks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    5
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Per-application exception rules, as listed under `[[exceptions]]`
pub type ExceptionRules = Vec<OverrideProfile>;
