//! Mouse Scroll Events
//!
//! Raw wheel input as delivered by the input tap, before any reversal,
//! normalization or smoothing.

use crate::scroll::AxisPair;
use serde::{Deserialize, Serialize};

/// Device class an event originated from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Wheel mouse (smoothed)
    #[default]
    Mouse,
    /// Trackpad or other continuous-gesture device (never touched)
    Trackpad,
}

/// One axis reading of a raw scroll event
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisSample {
    /// Delta on this axis
    pub value: f64,
    /// The axis carries meaningful data
    pub usable: bool,
    /// Discrete wheel click rather than a continuous delta
    pub fixed: bool,
}

impl AxisSample {
    /// Sample from a delta; zero or non-finite deltas are not usable
    pub fn new(value: f64, fixed: bool) -> Self {
        Self {
            value,
            usable: value != 0.0 && value.is_finite(),
            fixed,
        }
    }

    /// Discrete wheel click sample
    pub fn fixed(value: f64) -> Self {
        Self::new(value, true)
    }

    /// Continuous delta sample
    pub fn continuous(value: f64) -> Self {
        Self::new(value, false)
    }

    /// An axis with no data
    pub fn unusable() -> Self {
        Self::default()
    }

    /// The value when usable, zero otherwise
    pub fn usable_value(&self) -> f64 {
        if self.usable {
            self.value
        } else {
            0.0
        }
    }

    /// Flip the direction of this axis
    pub fn reverse(&mut self) {
        self.value = -self.value;
    }
}

/// Normalize a continuous delta against the step threshold
///
/// Continuous devices report deltas of arbitrary magnitude; every one of them
/// is rescaled to a single step in its own direction so its effect matches a
/// wheel click.
pub fn normalize(value: f64, step: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value.signum() * step
    }
}

/// Raw scroll wheel event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollEvent {
    /// Vertical axis
    pub y: AxisSample,
    /// Horizontal axis
    pub x: AxisSample,
    /// Originating device class
    #[serde(default)]
    pub device: DeviceClass,
    /// Process the event is targeted at, if the tap reports it
    #[serde(default)]
    pub target_pid: Option<u32>,
}

impl ScrollEvent {
    /// Mouse scroll event without target process information
    pub fn mouse(y: AxisSample, x: AxisSample) -> Self {
        Self {
            y,
            x,
            device: DeviceClass::Mouse,
            target_pid: None,
        }
    }

    /// Set the targeted process
    pub fn with_target_pid(mut self, pid: u32) -> Self {
        self.target_pid = Some(pid);
        self
    }

    /// Set the device class
    pub fn with_device(mut self, device: DeviceClass) -> Self {
        self.device = device;
        self
    }

    /// Usable values of both axes (unusable axes read as zero)
    pub fn usable_values(&self) -> AxisPair<f64> {
        AxisPair::new(self.y.usable_value(), self.x.usable_value())
    }

    /// True when either axis carries data
    pub fn has_usable_axis(&self) -> bool {
        self.y.usable || self.x.usable
    }
}
