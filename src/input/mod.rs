//! Input Event Types
//!
//! Types at the boundary between the platform input taps and the smoothing
//! engine.
//!
//! - [`ScrollEvent`] with per-axis [`AxisSample`]s and a [`DeviceClass`]
//! - [`ModifierEvent`] carrying a physical keycode, resolved to a logical
//!   [`Modifier`] (left and right keys of a pair are the same modifier)
//! - [`InputEvent`], the union the taps deliver, and [`TapAction`], what the
//!   tap does with the original event afterwards
//!
//! # Example
//!
//! ```rust
//! use lamco_scroll::input::{keycodes, AxisSample, Modifier, ModifierEvent, ScrollEvent};
//!
//! let scroll = ScrollEvent::mouse(AxisSample::continuous(-3.0), AxisSample::unusable())
//!     .with_target_pid(4242);
//! assert_eq!(scroll.usable_values().y, -3.0);
//!
//! let key = ModifierEvent::new(keycodes::SHIFT_RIGHT, true);
//! assert_eq!(key.modifier().unwrap(), Modifier::Shift);
//! ```

pub mod event;
pub mod keyboard;
pub mod mouse;

pub use event::{InputEvent, TapAction};
pub use keyboard::{keycodes, Modifier, ModifierEvent};
pub use mouse::{normalize, AxisSample, DeviceClass, ScrollEvent};
