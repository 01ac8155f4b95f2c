//! Mode and parameter control
//!
//! Decides *how* a scroll event is smoothed:
//!
//! - [`OverrideResolver`] picks effective parameters for the application
//!   under the pointer from the exception table and the globals
//! - [`HotkeyStateMachine`] turns modifier transitions into [`ModeFlags`]
//!   (dash, toggle, block)
//!
//! # Architecture
//!
//! ```text
//! pointer target ──> OverrideResolver ──> EffectiveParams
//!                          │                  │
//! modifier event ──────────┴─> HotkeyStateMachine ──> ModeFlags
//! ```

pub mod hotkey;
pub mod modes;
pub mod resolver;

pub use hotkey::{ActiveOverrideContext, HotkeyStateMachine, HotkeyTransition, KeyState};
pub use modes::{Mode, ModeFlags, ModeSet, DASH_AMPLIFICATION};
pub use resolver::{
    BindingOverride, EffectiveParams, ExceptionTable, GlobalDefaults, HotkeyBindings,
    OverrideProfile, OverrideResolver, OverrideTable,
};
