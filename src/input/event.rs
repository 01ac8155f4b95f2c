//! Input Event Stream
//!
//! The three event kinds the engine consumes from the input taps.

use crate::input::keyboard::ModifierEvent;
use crate::input::mouse::ScrollEvent;
use serde::{Deserialize, Serialize};

/// Event delivered by an input tap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Scroll wheel moved
    Scroll(ScrollEvent),
    /// Modifier key pressed or released
    Modifier(ModifierEvent),
    /// Primary mouse button went down
    PrimaryButtonDown,
}

/// What the tap should do with the original event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapAction {
    /// Deliver this event to the OS (possibly with reversed axes)
    Forward(ScrollEvent),
    /// Suppress the raw event; the engine emits smoothed events instead
    Consume,
    /// Listen-only event, nothing to deliver or suppress
    Observe,
}

impl TapAction {
    /// True when the raw event was suppressed
    pub fn is_consumed(&self) -> bool {
        matches!(self, TapAction::Consume)
    }
}
