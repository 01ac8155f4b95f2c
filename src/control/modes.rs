//! Smoothing mode flags toggled by held modifier keys

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scroll amplification while dash is held
pub const DASH_AMPLIFICATION: f64 = 5.0;

/// Amplification with dash released
pub const NORMAL_AMPLIFICATION: f64 = 1.0;

/// A modifier-driven mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Temporary speed amplification
    Dash,
    /// Vertical intent remapped to the horizontal axis
    Toggle,
    /// Smoothing suspended, in-flight motion held in place
    Block,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Dash => f.write_str("dash"),
            Mode::Toggle => f.write_str("toggle"),
            Mode::Block => f.write_str("block"),
        }
    }
}

/// A set of modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeSet {
    /// Dash included
    pub dash: bool,
    /// Toggle included
    pub toggle: bool,
    /// Block included
    pub block: bool,
}

impl ModeSet {
    /// Every mode
    pub const ALL: Self = Self {
        dash: true,
        toggle: true,
        block: true,
    };

    /// True when no mode is included
    pub fn is_empty(&self) -> bool {
        !(self.dash || self.toggle || self.block)
    }

    /// True when `mode` is included
    pub fn contains(&self, mode: Mode) -> bool {
        match mode {
            Mode::Dash => self.dash,
            Mode::Toggle => self.toggle,
            Mode::Block => self.block,
        }
    }
}

/// Currently active modes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeFlags {
    /// Dash active
    pub dash_active: bool,
    /// Multiplier applied to new samples (5.0 with dash, 1.0 otherwise)
    pub dash_amplification: f64,
    /// Toggle active
    pub toggle_active: bool,
    /// Block active
    pub block_active: bool,
}

impl ModeFlags {
    /// All modes inactive
    pub fn new() -> Self {
        Self {
            dash_active: false,
            dash_amplification: NORMAL_AMPLIFICATION,
            toggle_active: false,
            block_active: false,
        }
    }

    /// Activate the given modes
    pub fn engage(&mut self, modes: ModeSet) {
        if modes.dash {
            self.dash_active = true;
            self.dash_amplification = DASH_AMPLIFICATION;
        }
        if modes.toggle {
            self.toggle_active = true;
        }
        if modes.block {
            self.block_active = true;
        }
    }

    /// Deactivate the given modes
    pub fn release(&mut self, modes: ModeSet) {
        if modes.dash {
            self.dash_active = false;
            self.dash_amplification = NORMAL_AMPLIFICATION;
        }
        if modes.toggle {
            self.toggle_active = false;
        }
        if modes.block {
            self.block_active = false;
        }
    }

    /// Deactivate everything
    pub fn release_all(&mut self) {
        self.release(ModeSet::ALL);
    }

    /// True when no mode is active
    pub fn is_idle(&self) -> bool {
        !(self.dash_active || self.toggle_active || self.block_active)
    }
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let flags = ModeFlags::new();
        assert!(flags.is_idle());
        assert_eq!(flags.dash_amplification, 1.0);
    }

    #[test]
    fn test_dash_sets_amplification() {
        let mut flags = ModeFlags::new();
        flags.engage(ModeSet {
            dash: true,
            ..ModeSet::default()
        });
        assert!(flags.dash_active);
        assert_eq!(flags.dash_amplification, 5.0);

        flags.release(ModeSet {
            dash: true,
            ..ModeSet::default()
        });
        assert!(!flags.dash_active);
        assert_eq!(flags.dash_amplification, 1.0);
    }

    #[test]
    fn test_release_only_named_modes() {
        let mut flags = ModeFlags::new();
        flags.engage(ModeSet::ALL);
        flags.release(ModeSet {
            toggle: true,
            ..ModeSet::default()
        });

        assert!(flags.dash_active);
        assert!(!flags.toggle_active);
        assert!(flags.block_active);

        flags.release_all();
        assert!(flags.is_idle());
    }

    #[test]
    fn test_mode_set() {
        assert!(ModeSet::default().is_empty());
        assert!(ModeSet::ALL.contains(Mode::Block));
        assert_eq!(Mode::Toggle.to_string(), "toggle");
    }
}
