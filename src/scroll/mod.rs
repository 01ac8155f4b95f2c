//! Scroll smoothing primitives
//!
//! The numeric core of the engine, free of any locking or platform concerns:
//!
//! - [`AxisPair`] - named vertical/horizontal pairs
//! - [`interpolator`] - exponential-decay step toward a target
//! - [`JitterFilter`] - start-up ramp for the first pulses of a gesture
//! - [`ScrollBuffer`] - current/target/last-delta bookkeeping with
//!   reset-on-reversal
//!
//! # Data Flow
//!
//! ```text
//! raw sample ──> ScrollBuffer::update ──> target
//!                                          │
//! tick ──> ScrollBuffer::advance (lerp) ───┘──> pulse
//!              └─> JitterFilter ──> quantize ──> axis swap ──> emitted delta
//! ```

pub mod axis;
pub mod buffer;
pub mod interpolator;
pub mod jitter;

pub use axis::AxisPair;
pub use buffer::ScrollBuffer;
pub use interpolator::{lerp, transition_for_duration};
pub use jitter::{JitterFilter, DEFAULT_WARMUP_TICKS};
