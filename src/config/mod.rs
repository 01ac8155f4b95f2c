//! Configuration management
//!
//! Loads and validates the TOML configuration and turns it into the
//! structures the engine consumes:
//!
//! | Section | Consumed as |
//! |---------|-------------|
//! | `[scroll]`, `[hotkeys]`, `[general]` | [`GlobalDefaults`] |
//! | `[[exceptions]]` | [`ExceptionTable`] |
//! | `[emission]` | clock refresh rate, jitter warm-up |
//! | `[watchdog]` | tap liveness interval |
//! | `[logging]` | default log level |
//!
//! # Example
//!
//! ```toml
//! [scroll]
//! step = 35.0
//! speed = 3.0
//! duration = 3.9
//!
//! [hotkeys]
//! dash = "option"
//! block = "command"
//!
//! [[exceptions]]
//! application = "org.example.game"
//! smooth = false
//! ```

use crate::control::{ExceptionTable, GlobalDefaults, HotkeyBindings};
use crate::input::Modifier;
use crate::scroll::interpolator::{MAX_DURATION, MIN_DURATION};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod types;

pub use types::{
    EmissionConfig, ExceptionRules, GeneralConfig, HotkeyConfig, LoggingConfig, ScrollConfig,
    WatchdogConfig,
};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "LAMCO_SCROLL_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Global scroll parameters
    #[serde(default)]
    pub scroll: ScrollConfig,
    /// Mode key bindings
    #[serde(default)]
    pub hotkeys: HotkeyConfig,
    /// General behaviour
    #[serde(default)]
    pub general: GeneralConfig,
    /// Per-application exception rules
    #[serde(default)]
    pub exceptions: ExceptionRules,
    /// Emission loop settings
    #[serde(default)]
    pub emission: EmissionConfig,
    /// Tap watchdog settings
    #[serde(default)]
    pub watchdog: WatchdogConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Default config location (`<config dir>/lamco-scroll/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lamco-scroll").join("config.toml"))
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            scroll: ScrollConfig::default(),
            hotkeys: HotkeyConfig::default(),
            general: GeneralConfig::default(),
            exceptions: Vec::new(),
            emission: EmissionConfig::default(),
            watchdog: WatchdogConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        validate_motion("scroll", self.scroll.step, self.scroll.speed, self.scroll.duration)?;

        if !is_positive(self.scroll.precision) {
            anyhow::bail!(
                "scroll.precision must be positive (got {})",
                self.scroll.precision
            );
        }

        self.hotkey_bindings()?;

        let mut seen = HashSet::new();
        for rule in &self.exceptions {
            if rule.application.trim().is_empty() {
                anyhow::bail!("Exception rule with an empty application id");
            }
            if !seen.insert(rule.application.as_str()) {
                anyhow::bail!("Duplicate exception rule for {}", rule.application);
            }

            let section = format!("exceptions[{}]", rule.application);
            validate_motion(
                &section,
                rule.step.unwrap_or(self.scroll.step),
                rule.speed.unwrap_or(self.scroll.speed),
                rule.duration.unwrap_or(self.scroll.duration),
            )?;
            if let Some(precision) = rule.precision {
                if !is_positive(precision) {
                    anyhow::bail!("{}.precision must be positive (got {})", section, precision);
                }
            }
        }

        if self.emission.refresh_hz == 0 {
            anyhow::bail!("emission.refresh_hz must be non-zero");
        }

        if self.watchdog.interval_secs == 0 {
            anyhow::bail!("watchdog.interval_secs must be non-zero");
        }

        match self.logging.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        Ok(())
    }

    /// Mode key bindings parsed from `[hotkeys]`
    pub fn hotkey_bindings(&self) -> Result<HotkeyBindings> {
        Ok(HotkeyBindings {
            dash: parse_binding("hotkeys.dash", &self.hotkeys.dash)?,
            toggle: parse_binding("hotkeys.toggle", &self.hotkeys.toggle)?,
            block: parse_binding("hotkeys.block", &self.hotkeys.block)?,
        })
    }

    /// Global parameters for the override resolver
    pub fn global_defaults(&self) -> Result<GlobalDefaults> {
        Ok(GlobalDefaults {
            smooth: self.scroll.smooth,
            reverse: self.scroll.reverse,
            allowlist: self.general.allowlist,
            step: self.scroll.step,
            speed: self.scroll.speed,
            duration: self.scroll.duration,
            precision: self.scroll.precision,
            hotkeys: self.hotkey_bindings()?,
        })
    }

    /// Exception rules keyed by application
    pub fn exception_table(&self) -> ExceptionTable {
        ExceptionTable::from_profiles(self.exceptions.iter().cloned())
    }

    /// Watchdog check interval
    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_secs(self.watchdog.interval_secs)
    }
}

/// False for zero, negative and NaN
fn is_positive(value: f64) -> bool {
    value > 0.0
}

fn validate_motion(section: &str, step: f64, speed: f64, duration: f64) -> Result<()> {
    if !is_positive(step) {
        anyhow::bail!("{}.step must be positive (got {})", section, step);
    }
    if !is_positive(speed) {
        anyhow::bail!("{}.speed must be positive (got {})", section, speed);
    }
    if !(MIN_DURATION..=MAX_DURATION).contains(&duration) {
        anyhow::bail!(
            "{}.duration must be between {} and {} (got {})",
            section,
            MIN_DURATION,
            MAX_DURATION,
            duration
        );
    }
    Ok(())
}

fn parse_binding(field: &str, value: &str) -> Result<Option<Modifier>> {
    Modifier::parse_binding(value).with_context(|| format!("Invalid {}", field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::OverrideProfile;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert!(config.scroll.smooth);
        assert_eq!(config.scroll.step, 35.0);
        assert_eq!(config.scroll.speed, 3.0);
        assert_eq!(config.scroll.duration, 3.9);
        assert_eq!(config.emission.refresh_hz, 60);
        assert_eq!(config.watchdog.interval_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_bindings() {
        let bindings = Config::default_config().hotkey_bindings().unwrap();
        assert_eq!(bindings.dash, Some(Modifier::Option));
        assert_eq!(bindings.toggle, Some(Modifier::Shift));
        assert_eq!(bindings.block, None);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.scroll.precision, 1.0);
        assert_eq!(config.hotkeys.dash, "option");
        assert!(config.exceptions.is_empty());
    }

    #[test]
    fn test_config_validation_duration_range() {
        let mut config = Config::default_config();
        config.scroll.duration = 5.5;
        assert!(config.validate().is_err());

        config.scroll.duration = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_non_positive_values() {
        let mut config = Config::default_config();
        config.scroll.step = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default_config();
        config.scroll.precision = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default_config();
        config.emission.refresh_hz = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_hotkey() {
        let mut config = Config::default_config();
        config.hotkeys.block = "hyper".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_duplicate_exception() {
        let mut config = Config::default_config();
        config.exceptions = vec![
            OverrideProfile::new("org.example.app"),
            OverrideProfile::new("org.example.app"),
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_global_defaults_mapping() {
        let mut config = Config::default_config();
        config.general.allowlist = true;
        config.hotkeys.block = "cmd".to_string();

        let defaults = config.global_defaults().unwrap();
        assert!(defaults.allowlist);
        assert_eq!(defaults.hotkeys.block, Some(Modifier::Command));
        assert_eq!(defaults.duration, 3.9);
    }
}
