//! Hotkey State Machine
//!
//! Each logical modifier is independently `Up` or `Down`. On the way down
//! the modes bound to that modifier (for the application under the pointer)
//! are engaged, and the application's rule identity is remembered as the
//! key's [`ActiveOverrideContext`]. On the way up:
//!
//! - same rule identity under the pointer: release only the modes bound to
//!   this modifier
//! - different rule identity (pointer moved to another application while
//!   the key was held): release every mode, so nothing stays stuck on for
//!   the wrong target
//!
//! ```text
//!            press / engage bound modes, record context
//!     ┌────┐ ───────────────────────────────────────> ┌──────┐
//!     │ Up │                                          │ Down │
//!     └────┘ <─────────────────────────────────────── └──────┘
//!            release / same context: release bound modes
//!                      other context: release all modes
//! ```

use crate::control::modes::{ModeFlags, ModeSet};
use crate::control::resolver::EffectiveParams;
use crate::input::Modifier;
use std::collections::HashMap;
use tracing::debug;

/// Rule identity captured when a modifier went down
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveOverrideContext {
    /// Application whose rule applied at press time (None = globals)
    pub application: Option<String>,
}

/// Per-modifier key state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyState {
    /// Released
    Up,
    /// Held, with the context captured at press time
    Down(ActiveOverrideContext),
}

/// Result of feeding one modifier transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyTransition {
    /// Key went down; these modes were engaged (possibly none)
    Engaged(ModeSet),
    /// Key went up over the same target; these modes were released
    Released(ModeSet),
    /// Key went up over a different target; every mode was released
    ReleasedAll,
    /// No state change (repeated press or release)
    Ignored,
}

/// Tracks modifier keys and drives the mode flags
#[derive(Debug, Clone, Default)]
pub struct HotkeyStateMachine {
    keys: HashMap<Modifier, ActiveOverrideContext>,
}

impl HotkeyStateMachine {
    /// All keys up, no context
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a modifier transition resolved against the application under the pointer
    pub fn on_modifier(
        &mut self,
        modifier: Modifier,
        pressed: bool,
        params: &EffectiveParams,
        modes: &mut ModeFlags,
    ) -> HotkeyTransition {
        let bound = params.hotkeys.modes_for(modifier);

        if pressed {
            if self.keys.contains_key(&modifier) {
                return HotkeyTransition::Ignored;
            }

            modes.engage(bound);
            self.keys.insert(
                modifier,
                ActiveOverrideContext {
                    application: params.application.clone(),
                },
            );

            debug!(
                "Modifier {} down over {:?}: engaged {:?}",
                modifier, params.application, bound
            );
            return HotkeyTransition::Engaged(bound);
        }

        let Some(context) = self.keys.remove(&modifier) else {
            return HotkeyTransition::Ignored;
        };

        if context.application == params.application {
            modes.release(bound);
            debug!("Modifier {} up: released {:?}", modifier, bound);
            HotkeyTransition::Released(bound)
        } else {
            modes.release_all();
            debug!(
                "Modifier {} up over {:?} (pressed over {:?}): released all modes",
                modifier, params.application, context.application
            );
            HotkeyTransition::ReleasedAll
        }
    }

    /// Current state of `modifier`
    pub fn state(&self, modifier: Modifier) -> KeyState {
        match self.keys.get(&modifier) {
            Some(context) => KeyState::Down(context.clone()),
            None => KeyState::Up,
        }
    }

    /// Context captured when `modifier` went down, while it is held
    pub fn context(&self, modifier: Modifier) -> Option<&ActiveOverrideContext> {
        self.keys.get(&modifier)
    }

    /// Forget every held key
    pub fn reset(&mut self) {
        self.keys.clear();
    }
}
