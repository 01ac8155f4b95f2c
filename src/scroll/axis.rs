//! Two-axis value pairs
//!
//! Every vertical/horizontal pair that crosses a component boundary is an
//! [`AxisPair`], so sign and reset handling is always done per named axis.

use serde::{Deserialize, Serialize};

/// A vertical/horizontal pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisPair<T> {
    /// Vertical axis
    pub y: T,
    /// Horizontal axis
    pub x: T,
}

impl<T> AxisPair<T> {
    /// Create a new pair
    pub const fn new(y: T, x: T) -> Self {
        Self { y, x }
    }

    /// Apply `f` to both axes
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> AxisPair<U> {
        AxisPair {
            y: f(self.y),
            x: f(self.x),
        }
    }

    /// Combine two pairs axis by axis
    pub fn zip_with<U, V>(self, other: AxisPair<U>, mut f: impl FnMut(T, U) -> V) -> AxisPair<V> {
        AxisPair {
            y: f(self.y, other.y),
            x: f(self.x, other.x),
        }
    }

    /// Exchange the two axes
    pub fn swapped(self) -> Self {
        Self {
            y: self.x,
            x: self.y,
        }
    }
}

impl AxisPair<f64> {
    /// Both axes zero
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// True when both axes are exactly zero
    pub fn is_zero(&self) -> bool {
        self.y == 0.0 && self.x == 0.0
    }

    /// True when both magnitudes are at or under `threshold`
    pub fn within(&self, threshold: f64) -> bool {
        self.y.abs() <= threshold && self.x.abs() <= threshold
    }
}

impl std::ops::Add for AxisPair<f64> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl std::ops::Sub for AxisPair<f64> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a - b)
    }
}
