//! Start-up jitter filter
//!
//! The first few pulses of a gesture are the largest ones the interpolator
//! produces, and emitting them verbatim shows up as a jump. During the
//! warm-up window each pulse is scaled by a linear ramp:
//!
//! ```text
//! out_k = pulse_k * (k + 1) / (warmup + 1)      for k < warmup
//! out_k = pulse_k                               afterwards
//! ```
//!
//! What the ramp holds back is not replayed later; the gesture simply ends a
//! little short of its target.

use crate::scroll::axis::AxisPair;

/// Default number of attenuated ticks at the start of a gesture
pub const DEFAULT_WARMUP_TICKS: u32 = 3;

/// Per-gesture start-up filter
#[derive(Debug, Clone)]
pub struct JitterFilter {
    warmup_ticks: u32,
    ticks: u32,
}

impl JitterFilter {
    /// Create a filter that attenuates the first `warmup_ticks` pulses
    pub fn new(warmup_ticks: u32) -> Self {
        Self {
            warmup_ticks,
            ticks: 0,
        }
    }

    /// Filter one pulse
    pub fn fill_in(&mut self, pulse: AxisPair<f64>) -> AxisPair<f64> {
        if self.ticks >= self.warmup_ticks {
            return pulse;
        }

        let gain = f64::from(self.ticks + 1) / f64::from(self.warmup_ticks + 1);
        self.ticks += 1;
        pulse.map(|v| v * gain)
    }

    /// True while pulses are still being attenuated
    pub fn is_warming_up(&self) -> bool {
        self.ticks < self.warmup_ticks
    }

    /// Reset between gestures
    pub fn clean(&mut self) {
        self.ticks = 0;
    }
}

impl Default for JitterFilter {
    fn default() -> Self {
        Self::new(DEFAULT_WARMUP_TICKS)
    }
}
