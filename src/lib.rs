//! # lamco-scroll
//!
//! Smooth scrolling engine. Intercepts raw wheel input and re-emits it as a
//! time-interpolated stream of synthetic scroll events, so discrete wheel
//! clicks become continuous motion.
//!
//! # Architecture
//!
//! ```text
//! lamco-scroll
//!   ├─> input     (event types, keycode → logical modifier)
//!   ├─> scroll    (axis pairs, interpolator, jitter filter, scroll buffer)
//!   ├─> control   (override resolution, hotkey state machine, mode flags)
//!   ├─> engine    (interception pipeline, emission tick, display clock)
//!   ├─> service   (start/stop/check lifecycle, tap watchdog)
//!   ├─> platform  (pointer query, event sink and tap traits; replay backend)
//!   └─> config    (TOML configuration)
//! ```
//!
//! # Data Flow
//!
//! **Input Path:** OS tap → `ScrollEngine::handle_event` → OverrideResolver /
//! HotkeyStateMachine → ScrollBuffer::update → clock start
//!
//! **Output Path:** display clock → `ScrollEngine::on_tick` → lerp →
//! JitterFilter → axis swap → EventSink
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lamco_scroll::control::{ExceptionTable, GlobalDefaults, OverrideResolver};
//! use lamco_scroll::engine::{ExternalClock, ScrollEngine, TickOutcome};
//! use lamco_scroll::input::{AxisSample, ScrollEvent, TapAction};
//! use lamco_scroll::platform::replay::{LineSink, ReplayPointer};
//!
//! let resolver = OverrideResolver::new(Arc::new(ExceptionTable::default()), GlobalDefaults::default());
//! let engine = ScrollEngine::new(
//!     resolver,
//!     Arc::new(ReplayPointer::new()),
//!     Arc::new(LineSink::new(Vec::new())),
//!     Some(Arc::new(ExternalClock::new())),
//!     3,
//! );
//!
//! let event = ScrollEvent::mouse(AxisSample::fixed(-10.0), AxisSample::unusable());
//! assert_eq!(engine.handle_scroll(event), TapAction::Consume);
//! assert!(matches!(engine.on_tick(), TickOutcome::Emitted(_)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Configuration loading and validation
pub mod config;

/// Mode flags, hotkey state machine and per-application overrides
pub mod control;

/// Interception pipeline, emission tick and display clock
pub mod engine;

/// Error types
pub mod error;

/// Input event types
pub mod input;

/// Platform collaborator traits and the replay backend
pub mod platform;

/// Numeric smoothing core
pub mod scroll;

/// Lifecycle service and watchdog
pub mod service;

/// Utility functions
pub mod utils;

pub use error::{Result, ScrollError};
