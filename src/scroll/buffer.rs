//! Scroll Buffer
//!
//! Owns the running position of a gesture: what has already been emitted
//! (`current`), what is being approached (`target`), and the sign of the last
//! applied raw delta (`last_delta`).
//!
//! # Direction handling
//!
//! A sample whose sign agrees with `last_delta` on that axis accumulates into
//! the target. Anything else (a reversal, or the first sample after an idle
//! axis) restarts the axis from zero, so a reversal never has to be
//! interpolated back through the old accumulated target.

use crate::scroll::axis::AxisPair;
use crate::scroll::interpolator;
use crate::scroll::jitter::JitterFilter;
use tracing::trace;

/// Per-gesture scroll state
#[derive(Debug, Clone, Default)]
pub struct ScrollBuffer {
    current: AxisPair<f64>,
    target: AxisPair<f64>,
    last_delta: AxisPair<f64>,
    /// Sub-integer distance not yet emitted
    residual: AxisPair<f64>,
    filter: JitterFilter,
}

impl ScrollBuffer {
    /// Create an empty buffer whose jitter filter warms up over `warmup_ticks`
    pub fn new(warmup_ticks: u32) -> Self {
        Self {
            filter: JitterFilter::new(warmup_ticks),
            ..Self::default()
        }
    }

    /// Apply one raw (already reversed/normalized) sample
    pub fn update(&mut self, sample: AxisPair<f64>, speed: f64, amplification: f64) {
        let scale = speed * amplification;

        let restarted = AxisPair::new(
            Self::update_axis(
                &mut self.target.y,
                &mut self.current.y,
                sample.y,
                self.last_delta.y,
                scale,
            ),
            Self::update_axis(
                &mut self.target.x,
                &mut self.current.x,
                sample.x,
                self.last_delta.x,
                scale,
            ),
        );

        // A restarted axis must not carry a fraction owed to the old direction
        if restarted.y {
            self.residual.y = 0.0;
        }
        if restarted.x {
            self.residual.x = 0.0;
        }

        self.last_delta = sample;

        trace!(
            "Buffer update: sample=({:.2}, {:.2}) target=({:.2}, {:.2}) current=({:.2}, {:.2})",
            sample.y,
            sample.x,
            self.target.y,
            self.target.x,
            self.current.y,
            self.current.x
        );
    }

    /// Returns true when the axis was restarted rather than accumulated
    fn update_axis(target: &mut f64, current: &mut f64, sample: f64, last: f64, scale: f64) -> bool {
        if sample * last > 0.0 {
            *target += sample * scale;
            false
        } else {
            *target = sample * scale;
            *current = 0.0;
            true
        }
    }

    /// Advance `current` one interpolation step toward `target`, returning the raw pulse
    pub fn advance(&mut self, transition: f64) -> AxisPair<f64> {
        let pulse = self
            .current
            .zip_with(self.target, |c, t| interpolator::lerp(c, t, transition));
        self.current = self.current + pulse;
        pulse
    }

    /// Run a pulse through the start-up jitter filter
    pub fn filter(&mut self, pulse: AxisPair<f64>) -> AxisPair<f64> {
        self.filter.fill_in(pulse)
    }

    /// Convert an output pulse into whole units, carrying the fraction to the next tick
    ///
    /// Truncation keeps every emitted delta within one unit of the running
    /// sum of pulses, so no tick ever catches up in a burst.
    pub fn quantize(&mut self, pulse: AxisPair<f64>) -> AxisPair<i32> {
        let total = self.residual + pulse;
        let whole = total.map(f64::trunc);
        self.residual = total - whole;
        whole.map(|v| v as i32)
    }

    /// Freeze the gesture where it is (`target = current`)
    ///
    /// The carried fraction is dropped too, so the next tick emits nothing.
    pub fn hold(&mut self) {
        self.target = self.current;
        self.residual = AxisPair::ZERO;
    }

    /// Reset everything between gestures
    pub fn clean(&mut self) {
        self.current = AxisPair::ZERO;
        self.target = AxisPair::ZERO;
        self.last_delta = AxisPair::ZERO;
        self.residual = AxisPair::ZERO;
        self.filter.clean();
    }

    /// Position already emitted
    pub fn current(&self) -> AxisPair<f64> {
        self.current
    }

    /// Position being approached
    pub fn target(&self) -> AxisPair<f64> {
        self.target
    }

    /// Last applied raw sample
    pub fn last_delta(&self) -> AxisPair<f64> {
        self.last_delta
    }

    /// Remaining distance to the target
    pub fn remaining(&self) -> AxisPair<f64> {
        self.target - self.current
    }

    /// True when nothing is buffered
    pub fn is_clean(&self) -> bool {
        self.current.is_zero() && self.target.is_zero() && self.last_delta.is_zero()
    }
}
