//! Platform collaborators
//!
//! The engine never talks to the OS directly. It uses these black boxes:
//!
//! | Trait | Responsibility |
//! |-------|----------------|
//! | [`PointerTarget`] | Which application is under the pointer |
//! | [`EventSink`] | Inject a synthetic scroll event |
//! | [`EventTap`] | One attachment to the OS input stream (liveness only) |
//!
//! A line-oriented [`replay`] backend implements all three for the binary
//! and for end-to-end tests.

pub mod replay;

use crate::error::Result;
use crate::scroll::AxisPair;

/// Query for the application under the pointer
#[cfg_attr(test, mockall::automock)]
pub trait PointerTarget: Send + Sync {
    /// Bundle/process identifier of the application under the pointer
    fn application_under_pointer(&self) -> Option<String>;
}

/// Synthetic scroll event injection
#[cfg_attr(test, mockall::automock)]
pub trait EventSink: Send + Sync {
    /// Emit one scroll event with whole-unit deltas on both axes
    fn emit_scroll(&self, delta: AxisPair<i32>) -> Result<()>;
}

/// An attachment to the OS input stream
///
/// The OS may silently disable a tap whose callback was too slow; the
/// watchdog polls [`EventTap::is_enabled`] and calls [`EventTap::enable`]
/// to bring it back.
#[cfg_attr(test, mockall::automock)]
pub trait EventTap: Send + Sync {
    /// Name for logs
    fn name(&self) -> &str;

    /// Attach or re-enable the tap
    fn enable(&self) -> Result<()>;

    /// Detach the tap
    fn disable(&self);

    /// True while the OS is delivering events to this tap
    fn is_enabled(&self) -> bool;
}
