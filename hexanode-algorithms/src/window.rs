//! Coincidence windows for individual wire-end pulses.
//!
//! A wire-end pulse belonging to an MCP pulse at `T` must satisfy
//! `t1 + t2 - 2T ~ tsum_avg` and `|t1 - t2 - offset| < runtime`. Solving for
//! a single end gives the interval
//!
//! ```text
//! low(T)  = (-runtime + 2T + tsum_avg - |offset|) / 2
//! high(T) = ( runtime + 2T + tsum_avg + |offset|) / 2
//! ```
//!
//! Both bounds are exclusive.

use hexanode_core::params::AxisParams;

/// Open acceptance interval `(low, high)` for wire-end pulses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoincidenceWindow {
    /// Exclusive lower bound.
    pub low: f64,
    /// Exclusive upper bound.
    pub high: f64,
}

impl CoincidenceWindow {
    /// Window of one axis for the MCP pulse at `mcp_time`.
    #[must_use]
    pub fn for_pulse(axis: &AxisParams, mcp_time: f64) -> Self {
        let offset = axis.diff_offset().abs();
        Self {
            low: (-axis.runtime() + 2.0 * mcp_time + axis.tsum_avg() - offset) / 2.0,
            high: (axis.runtime() + 2.0 * mcp_time + axis.tsum_avg() + offset) / 2.0,
        }
    }

    /// Windows of one axis for every pulse of an MCP sequence, in order.
    #[must_use]
    pub fn for_pulses(axis: &AxisParams, mcp: &[f64]) -> Vec<Self> {
        mcp.iter()
            .map(|&mcp_time| Self::for_pulse(axis, mcp_time))
            .collect()
    }

    /// True if `time` lies strictly inside the window.
    ///
    /// NaN never does.
    #[inline]
    #[must_use]
    pub fn contains(&self, time: f64) -> bool {
        time > self.low && time < self.high
    }

    /// Pulses inside the window with their positions in `pulses`, in input
    /// order.
    #[must_use]
    pub fn select(&self, pulses: &[f64]) -> Vec<(usize, f64)> {
        pulses
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, time)| self.contains(time))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    fn axis(diff_offset: f64) -> AxisParams {
        AxisParams::new(100.0, diff_offset, 50.0, 5.0, 1.0)
    }

    #[test]
    fn test_window_bounds() {
        let window = CoincidenceWindow::for_pulse(&axis(4.0), 1000.0);
        assert_eq!(window.low, 973.0);
        assert_eq!(window.high, 1077.0);
    }

    #[test]
    fn test_window_uses_offset_magnitude() {
        let positive = CoincidenceWindow::for_pulse(&axis(6.0), 1000.0);
        let negative = CoincidenceWindow::for_pulse(&axis(-6.0), 1000.0);
        assert_eq!(positive, negative);
        assert_eq!(negative.low, 972.0);
        assert_eq!(negative.high, 1078.0);
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let window = CoincidenceWindow::for_pulse(&axis(4.0), 1000.0);
        assert!(!window.contains(973.0));
        assert!(!window.contains(1077.0));
        assert!(window.contains(973.5));
        assert!(window.contains(1076.5));
        assert!(!window.contains(f64::NAN));
        assert!(!window.contains(f64::INFINITY));
    }

    #[test]
    fn test_select_keeps_order_and_indices() {
        let window = CoincidenceWindow::for_pulse(&axis(0.0), 1000.0);
        let pulses = [1060.0, 900.0, 1000.0, f64::NAN, 1074.0, 1100.0];
        assert_eq!(
            window.select(&pulses),
            vec![(0, 1060.0), (2, 1000.0), (4, 1074.0)]
        );
    }

    #[test]
    fn test_windows_for_sequence() {
        let windows = CoincidenceWindow::for_pulses(&axis(0.0), &[0.0, 1000.0]);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].low, -25.0);
        assert_eq!(windows[1].high, 1075.0);
        assert!(CoincidenceWindow::for_pulses(&axis(0.0), &[]).is_empty());
    }
}
