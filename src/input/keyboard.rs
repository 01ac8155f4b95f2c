//! Modifier Key Handling
//!
//! Maps physical modifier keycodes onto the four logical modifiers the
//! hotkey state machine works with. Left and right keys of a pair are the
//! same logical modifier.

use crate::error::{Result, ScrollError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical modifier keycodes (virtual keycodes as reported by the input tap)
pub mod keycodes {
    /// Left Control
    pub const CONTROL_LEFT: u16 = 0x3B;
    /// Right Control
    pub const CONTROL_RIGHT: u16 = 0x3E;
    /// Left Option / Alt
    pub const OPTION_LEFT: u16 = 0x3A;
    /// Right Option / Alt
    pub const OPTION_RIGHT: u16 = 0x3D;
    /// Left Command / Meta
    pub const COMMAND_LEFT: u16 = 0x37;
    /// Right Command / Meta
    pub const COMMAND_RIGHT: u16 = 0x36;
    /// Left Shift
    pub const SHIFT_LEFT: u16 = 0x38;
    /// Right Shift
    pub const SHIFT_RIGHT: u16 = 0x3C;
}

/// Logical modifier identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    /// Control key pair
    Control,
    /// Option / Alt key pair
    Option,
    /// Command / Meta key pair
    Command,
    /// Shift key pair
    Shift,
}

impl Modifier {
    /// All logical modifiers
    pub const ALL: [Modifier; 4] = [
        Modifier::Control,
        Modifier::Option,
        Modifier::Command,
        Modifier::Shift,
    ];

    /// Resolve a physical keycode to its logical modifier
    pub fn from_keycode(keycode: u16) -> Option<Self> {
        match keycode {
            keycodes::CONTROL_LEFT | keycodes::CONTROL_RIGHT => Some(Modifier::Control),
            keycodes::OPTION_LEFT | keycodes::OPTION_RIGHT => Some(Modifier::Option),
            keycodes::COMMAND_LEFT | keycodes::COMMAND_RIGHT => Some(Modifier::Command),
            keycodes::SHIFT_LEFT | keycodes::SHIFT_RIGHT => Some(Modifier::Shift),
            _ => None,
        }
    }

    /// Left/right physical keycodes of this modifier
    pub fn keycodes(&self) -> [u16; 2] {
        match self {
            Modifier::Control => [keycodes::CONTROL_LEFT, keycodes::CONTROL_RIGHT],
            Modifier::Option => [keycodes::OPTION_LEFT, keycodes::OPTION_RIGHT],
            Modifier::Command => [keycodes::COMMAND_LEFT, keycodes::COMMAND_RIGHT],
            Modifier::Shift => [keycodes::SHIFT_LEFT, keycodes::SHIFT_RIGHT],
        }
    }

    /// Lowercase name, as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Control => "control",
            Modifier::Option => "option",
            Modifier::Command => "command",
            Modifier::Shift => "shift",
        }
    }

    /// Parse a configured key binding; `""` and `"none"` leave the mode unbound
    pub fn parse_binding(value: &str) -> Result<Option<Self>> {
        match value.trim() {
            "" => Ok(None),
            name if name.eq_ignore_ascii_case("none") => Ok(None),
            name => name.parse().map(Some),
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modifier {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "control" | "ctrl" => Ok(Modifier::Control),
            "option" | "alt" => Ok(Modifier::Option),
            "command" | "cmd" | "meta" => Ok(Modifier::Command),
            "shift" => Ok(Modifier::Shift),
            other => Err(ScrollError::InvalidConfig(format!(
                "unknown modifier '{}'",
                other
            ))),
        }
    }
}

/// A modifier key changed state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierEvent {
    /// Physical keycode
    pub keycode: u16,
    /// Key went down (true) or up (false)
    pub pressed: bool,
}

impl ModifierEvent {
    /// Create a new modifier event
    pub fn new(keycode: u16, pressed: bool) -> Self {
        Self { keycode, pressed }
    }

    /// Logical modifier for this event
    pub fn modifier(&self) -> Result<Modifier> {
        Modifier::from_keycode(self.keycode).ok_or(ScrollError::UnknownModifier(self.keycode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keycode_pairs_round_trip() {
        for modifier in Modifier::ALL {
            for keycode in modifier.keycodes() {
                assert_eq!(Modifier::from_keycode(keycode), Some(modifier));
            }
        }
    }

    #[test]
    fn test_unknown_keycode() {
        assert_eq!(Modifier::from_keycode(0x00), None);
        let event = ModifierEvent::new(0x31, true);
        assert!(matches!(
            event.modifier(),
            Err(ScrollError::UnknownModifier(0x31))
        ));
    }

    #[test]
    fn test_parse_modifier_names() {
        assert_eq!("Shift".parse::<Modifier>().unwrap(), Modifier::Shift);
        assert_eq!("alt".parse::<Modifier>().unwrap(), Modifier::Option);
        assert_eq!("cmd".parse::<Modifier>().unwrap(), Modifier::Command);
        assert!("hyper".parse::<Modifier>().is_err());
    }

    #[test]
    fn test_parse_binding() {
        assert_eq!(Modifier::parse_binding("ctrl").unwrap(), Some(Modifier::Control));
        assert_eq!(Modifier::parse_binding(" meta ").unwrap(), Some(Modifier::Command));
        assert_eq!(Modifier::parse_binding("none").unwrap(), None);
        assert_eq!(Modifier::parse_binding("None").unwrap(), None);
        assert_eq!(Modifier::parse_binding("").unwrap(), None);
        assert!(Modifier::parse_binding("hyper").is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Modifier::Control).unwrap();
        assert_eq!(json, "\"control\"");
        let parsed: Modifier = serde_json::from_str("\"option\"").unwrap();
        assert_eq!(parsed, Modifier::Option);
    }
}
