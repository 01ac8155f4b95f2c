//! Emission helpers
//!
//! Output-side shaping applied to every pulse after interpolation.

use crate::scroll::AxisPair;

/// Remap the pulse onto the other axis while toggle is held
///
/// Only a single-axis pulse is swapped. Some mice already swap axes in
/// hardware while a modifier is held; their pulses arrive with both axes
/// populated or already horizontal and are left alone, so the toggle is
/// never applied twice.
pub fn swap_if_toggling<T>(pulse: AxisPair<T>, toggle_active: bool) -> AxisPair<T>
where
    T: Copy + Default + PartialEq,
{
    let zero = T::default();
    if toggle_active && pulse.y != zero && pulse.x == zero {
        pulse.swapped()
    } else {
        pulse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_pulse_moves_to_horizontal() {
        assert_eq!(
            swap_if_toggling(AxisPair::new(5, 0), true),
            AxisPair::new(0, 5)
        );
    }

    #[test]
    fn test_two_axis_pulse_unchanged() {
        assert_eq!(
            swap_if_toggling(AxisPair::new(3, 2), true),
            AxisPair::new(3, 2)
        );
    }

    #[test]
    fn test_hardware_swapped_pulse_unchanged() {
        assert_eq!(
            swap_if_toggling(AxisPair::new(0, -4), true),
            AxisPair::new(0, -4)
        );
    }

    #[test]
    fn test_no_swap_without_toggle() {
        assert_eq!(
            swap_if_toggling(AxisPair::new(5.0, 0.0), false),
            AxisPair::new(5.0, 0.0)
        );
    }
}
