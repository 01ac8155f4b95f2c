//! Smoothing engine
//!
//! Ties the numeric core ([`crate::scroll`]) and the mode control
//! ([`crate::control`]) to the two callback sources that drive them.
//!
//! # Architecture
//!
//! ```text
//!  input tap ──> ScrollEngine::handle_event ──┐
//!                                             ├──> Mutex<EngineState> ──> EventSink
//!  TickSource ─> ScrollEngine::on_tick ───────┘
//!       ▲                    │
//!       └── start / stop ────┘
//! ```
//!
//! The tick source is only ever started and stopped by the engine itself.

pub mod clock;
pub mod emission;
pub mod pipeline;
pub mod stats;

pub use clock::{ExternalClock, IntervalClock, TickSource};
pub use emission::swap_if_toggling;
pub use pipeline::{BufferSnapshot, ScrollEngine, TickOutcome};
pub use stats::{EngineStats, StatsSnapshot};
