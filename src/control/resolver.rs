//! Per-application override resolution
//!
//! Every raw scroll event and every hotkey event asks "which parameters apply
//! to the window under the pointer right now?". The answer is never cached:
//! the pointer can cross into another application between two events.
//!
//! # Resolution order
//!
//! | Parameter | Listed application | Unlisted, allowlist off | Unlisted, allowlist on |
//! |-----------|--------------------|-------------------------|------------------------|
//! | smooth / reverse | rule | globals | off |
//! | step / speed / duration / precision | rule (or globals when `inherit`) | globals | globals |
//! | dash / toggle / block keys | rule (`"none"` unbinds, absent inherits) | globals | globals |
//!
//! Block mode forces smoothing off regardless of the above.

use crate::control::modes::ModeSet;
use crate::error::ScrollError;
use crate::input::Modifier;
use crate::scroll::interpolator::transition_for_duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Modifier bound to each mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyBindings {
    /// Dash key
    #[serde(default)]
    pub dash: Option<Modifier>,
    /// Toggle key
    #[serde(default)]
    pub toggle: Option<Modifier>,
    /// Block key
    #[serde(default)]
    pub block: Option<Modifier>,
}

impl HotkeyBindings {
    /// Modes bound to `modifier`
    pub fn modes_for(&self, modifier: Modifier) -> ModeSet {
        ModeSet {
            dash: self.dash == Some(modifier),
            toggle: self.toggle == Some(modifier),
            block: self.block == Some(modifier),
        }
    }
}

/// Global parameters used when no override applies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalDefaults {
    /// Smoothing enabled
    pub smooth: bool,
    /// Reverse both axes
    pub reverse: bool,
    /// Only listed applications are smoothed/reversed
    pub allowlist: bool,
    /// Step threshold for continuous samples
    pub step: f64,
    /// Speed multiplier
    pub speed: f64,
    /// Duration setting (1.0 - 5.0)
    pub duration: f64,
    /// Pulse magnitude under which a gesture is complete
    pub precision: f64,
    /// Mode bindings
    pub hotkeys: HotkeyBindings,
}

impl Default for GlobalDefaults {
    fn default() -> Self {
        Self {
            smooth: true,
            reverse: false,
            allowlist: false,
            step: 35.0,
            speed: 3.0,
            duration: 3.9,
            precision: 1.0,
            hotkeys: HotkeyBindings {
                dash: Some(Modifier::Option),
                toggle: Some(Modifier::Shift),
                block: None,
            },
        }
    }
}

/// Key binding of one mode in an exception rule
///
/// Written in configuration as a modifier name (aliases accepted), `"none"`
/// to unbind the mode for the application, or left out to inherit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BindingOverride {
    /// Use the global binding
    #[default]
    Inherit,
    /// Mode has no key in this application
    Unbound,
    /// Mode is bound to this modifier
    Bound(Modifier),
}

impl BindingOverride {
    /// Effective binding given the global one
    pub fn apply(self, global: Option<Modifier>) -> Option<Modifier> {
        match self {
            BindingOverride::Inherit => global,
            BindingOverride::Unbound => None,
            BindingOverride::Bound(modifier) => Some(modifier),
        }
    }
}

impl From<Option<Modifier>> for BindingOverride {
    fn from(binding: Option<Modifier>) -> Self {
        binding.map_or(BindingOverride::Unbound, BindingOverride::Bound)
    }
}

impl TryFrom<String> for BindingOverride {
    type Error = ScrollError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("inherit") {
            return Ok(BindingOverride::Inherit);
        }
        Modifier::parse_binding(&value).map(BindingOverride::from)
    }
}

impl From<BindingOverride> for String {
    fn from(binding: BindingOverride) -> Self {
        match binding {
            BindingOverride::Inherit => "inherit".to_string(),
            BindingOverride::Unbound => "none".to_string(),
            BindingOverride::Bound(modifier) => modifier.as_str().to_string(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Per-application exception rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideProfile {
    /// Bundle / process identifier
    pub application: String,
    /// Smoothing enabled for this application
    #[serde(default = "default_true")]
    pub smooth: bool,
    /// Reverse both axes for this application
    #[serde(default)]
    pub reverse: bool,
    /// Take step/speed/duration/precision from the globals
    #[serde(default = "default_true")]
    pub inherit: bool,
    /// Step threshold
    #[serde(default)]
    pub step: Option<f64>,
    /// Speed multiplier
    #[serde(default)]
    pub speed: Option<f64>,
    /// Duration setting
    #[serde(default)]
    pub duration: Option<f64>,
    /// Precision threshold
    #[serde(default)]
    pub precision: Option<f64>,
    /// Dash key override
    #[serde(default)]
    pub dash: BindingOverride,
    /// Toggle key override
    #[serde(default)]
    pub toggle: BindingOverride,
    /// Block key override
    #[serde(default)]
    pub block: BindingOverride,
}

impl OverrideProfile {
    /// Rule for `application` with smoothing on and everything else inherited
    pub fn new(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            smooth: true,
            reverse: false,
            inherit: true,
            step: None,
            speed: None,
            duration: None,
            precision: None,
            dash: BindingOverride::Inherit,
            toggle: BindingOverride::Inherit,
            block: BindingOverride::Inherit,
        }
    }
}

/// Source of per-application exception rules
#[cfg_attr(test, mockall::automock)]
pub trait OverrideTable: Send + Sync {
    /// Rule for `application`, if it has one
    fn lookup(&self, application: &str) -> Option<OverrideProfile>;
}

/// In-memory exception table keyed by application id
#[derive(Debug, Clone, Default)]
pub struct ExceptionTable {
    rules: HashMap<String, OverrideProfile>,
}

impl ExceptionTable {
    /// Build from a list of rules (later duplicates win)
    pub fn from_profiles(profiles: impl IntoIterator<Item = OverrideProfile>) -> Self {
        Self {
            rules: profiles
                .into_iter()
                .map(|p| (p.application.clone(), p))
                .collect(),
        }
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl OverrideTable for ExceptionTable {
    fn lookup(&self, application: &str) -> Option<OverrideProfile> {
        self.rules.get(application).cloned()
    }
}

/// Parameters in effect for one event
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveParams {
    /// Application whose rule applied (None when the globals applied)
    pub application: Option<String>,
    /// Smooth this event
    pub smooth: bool,
    /// Reverse this event
    pub reverse: bool,
    /// Step threshold
    pub step: f64,
    /// Speed multiplier
    pub speed: f64,
    /// Per-tick transition fraction
    pub transition: f64,
    /// Precision threshold
    pub precision: f64,
    /// Mode bindings
    pub hotkeys: HotkeyBindings,
}

/// Resolves effective parameters for the application under the pointer
pub struct OverrideResolver {
    table: Arc<dyn OverrideTable>,
    defaults: GlobalDefaults,
}

impl OverrideResolver {
    /// Create a resolver over `table` with `defaults`
    pub fn new(table: Arc<dyn OverrideTable>, defaults: GlobalDefaults) -> Self {
        Self { table, defaults }
    }

    /// Global defaults
    pub fn defaults(&self) -> &GlobalDefaults {
        &self.defaults
    }

    /// Effective parameters for `application`
    pub fn resolve(&self, application: Option<&str>, block_active: bool) -> EffectiveParams {
        let profile = application.and_then(|app| self.table.lookup(app));
        let d = &self.defaults;

        let (smooth, reverse) = match &profile {
            Some(p) => (p.smooth, p.reverse),
            None if d.allowlist => (false, false),
            None => (d.smooth, d.reverse),
        };

        let (step, speed, duration, precision) = match &profile {
            Some(p) if !p.inherit => (
                p.step.unwrap_or(d.step),
                p.speed.unwrap_or(d.speed),
                p.duration.unwrap_or(d.duration),
                p.precision.unwrap_or(d.precision),
            ),
            _ => (d.step, d.speed, d.duration, d.precision),
        };

        let hotkeys = match &profile {
            Some(p) => HotkeyBindings {
                dash: p.dash.apply(d.hotkeys.dash),
                toggle: p.toggle.apply(d.hotkeys.toggle),
                block: p.block.apply(d.hotkeys.block),
            },
            None => d.hotkeys,
        };

        let params = EffectiveParams {
            application: profile.map(|p| p.application),
            smooth: smooth && !block_active,
            reverse,
            step,
            speed,
            transition: transition_for_duration(duration),
            precision,
            hotkeys,
        };

        trace!(
            "Resolved {:?} -> rule={:?} smooth={} reverse={}",
            application,
            params.application,
            params.smooth,
            params.reverse
        );

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn resolver_with(profiles: Vec<OverrideProfile>, defaults: GlobalDefaults) -> OverrideResolver {
        OverrideResolver::new(Arc::new(ExceptionTable::from_profiles(profiles)), defaults)
    }

    #[test]
    fn test_unlisted_application_uses_globals() {
        let resolver = resolver_with(vec![], GlobalDefaults::default());
        let params = resolver.resolve(Some("com.example.editor"), false);

        assert_eq!(params.application, None);
        assert!(params.smooth);
        assert_eq!(params.step, 35.0);
        assert_eq!(params.hotkeys.dash, Some(Modifier::Option));
    }

    #[test]
    fn test_rule_overrides_flags() {
        let mut rule = OverrideProfile::new("com.example.game");
        rule.smooth = false;
        rule.reverse = true;

        let resolver = resolver_with(vec![rule], GlobalDefaults::default());
        let params = resolver.resolve(Some("com.example.game"), false);

        assert_eq!(params.application.as_deref(), Some("com.example.game"));
        assert!(!params.smooth);
        assert!(params.reverse);
    }

    #[test]
    fn test_inherit_ignores_rule_values() {
        let mut rule = OverrideProfile::new("com.example.browser");
        rule.step = Some(10.0);
        rule.speed = Some(9.0);
        rule.precision = Some(4.0);

        let resolver = resolver_with(vec![rule.clone()], GlobalDefaults::default());
        let params = resolver.resolve(Some("com.example.browser"), false);
        assert_eq!(params.step, 35.0);
        assert_eq!(params.speed, 3.0);
        assert_eq!(params.precision, 1.0);

        rule.inherit = false;
        rule.precision = None;
        let resolver = resolver_with(vec![rule], GlobalDefaults::default());
        let params = resolver.resolve(Some("com.example.browser"), false);
        assert_eq!(params.step, 10.0);
        assert_eq!(params.speed, 9.0);
        // Unset values still fall back to the globals
        assert_eq!(params.precision, 1.0);
    }

    #[test]
    fn test_allowlist_disables_unlisted() {
        let defaults = GlobalDefaults {
            allowlist: true,
            reverse: true,
            ..GlobalDefaults::default()
        };
        let resolver = resolver_with(vec![OverrideProfile::new("com.example.listed")], defaults);

        let unlisted = resolver.resolve(Some("com.example.other"), false);
        assert!(!unlisted.smooth);
        assert!(!unlisted.reverse);

        let listed = resolver.resolve(Some("com.example.listed"), false);
        assert!(listed.smooth);

        let unknown = resolver.resolve(None, false);
        assert!(!unknown.smooth);
    }

    #[test]
    fn test_block_forces_smoothing_off() {
        let resolver = resolver_with(vec![], GlobalDefaults::default());
        assert!(!resolver.resolve(None, true).smooth);
    }

    #[test]
    fn test_hotkey_override_falls_back_per_mode() {
        let mut rule = OverrideProfile::new("com.example.cad");
        rule.dash = BindingOverride::Bound(Modifier::Control);

        let resolver = resolver_with(vec![rule], GlobalDefaults::default());
        let params = resolver.resolve(Some("com.example.cad"), false);

        assert_eq!(params.hotkeys.dash, Some(Modifier::Control));
        assert_eq!(params.hotkeys.toggle, Some(Modifier::Shift));
        assert_eq!(params.hotkeys.block, None);
    }

    #[test]
    fn test_hotkey_override_can_unbind() {
        let mut rule = OverrideProfile::new("com.example.terminal");
        rule.dash = BindingOverride::Unbound;

        let resolver = resolver_with(vec![rule], GlobalDefaults::default());
        let params = resolver.resolve(Some("com.example.terminal"), false);

        assert_eq!(params.hotkeys.dash, None);
        assert_eq!(params.hotkeys.toggle, Some(Modifier::Shift));
        assert!(params.hotkeys.modes_for(Modifier::Option).is_empty());
    }

    #[test]
    fn test_binding_override_from_strings() {
        let parse = |s: &str| BindingOverride::try_from(s.to_string());
        assert_eq!(parse("ctrl").unwrap(), BindingOverride::Bound(Modifier::Control));
        assert_eq!(parse("Meta").unwrap(), BindingOverride::Bound(Modifier::Command));
        assert_eq!(parse("none").unwrap(), BindingOverride::Unbound);
        assert_eq!(parse("").unwrap(), BindingOverride::Unbound);
        assert_eq!(parse("inherit").unwrap(), BindingOverride::Inherit);
        assert!(parse("hyper").is_err());

        let json = serde_json::to_string(&BindingOverride::Unbound).unwrap();
        assert_eq!(json, "\"none\"");
    }

    #[test]
    fn test_table_queried_on_every_resolve() {
        let mut table = MockOverrideTable::new();
        table
            .expect_lookup()
            .with(eq("com.example.app"))
            .times(3)
            .returning(|_| None);

        let resolver = OverrideResolver::new(Arc::new(table), GlobalDefaults::default());
        for _ in 0..3 {
            resolver.resolve(Some("com.example.app"), false);
        }
    }

    #[test]
    fn test_no_application_skips_lookup() {
        let mut table = MockOverrideTable::new();
        table.expect_lookup().never();

        let resolver = OverrideResolver::new(Arc::new(table), GlobalDefaults::default());
        let params = resolver.resolve(None, false);
        assert_eq!(params.application, None);
    }

    #[test]
    fn test_modes_for_modifier() {
        let bindings = HotkeyBindings {
            dash: Some(Modifier::Option),
            toggle: Some(Modifier::Option),
            block: Some(Modifier::Command),
        };
        let modes = bindings.modes_for(Modifier::Option);
        assert!(modes.dash && modes.toggle && !modes.block);
        assert!(bindings.modes_for(Modifier::Shift).is_empty());
    }
}
