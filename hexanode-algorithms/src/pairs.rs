//! Time-sum pair matching on one delay-line axis.
//!
//! Every end-1 pulse inside the coincidence window is combined with every
//! end-2 pulse inside it. A combination is accepted when its time-sum,
//! relative to twice the MCP pulse time, lies strictly inside the axis gate.
//! Several pairs may survive; resolving that ambiguity is left to
//! position reconstruction.

use crate::window::CoincidenceWindow;
use hexanode_core::params::AxisParams;

/// An accepted (end-1, end-2) pulse pair of one axis.
///
/// Indices refer to the unfiltered input lists. The pair is only meaningful
/// relative to the MCP pulse it was matched against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidatePair {
    /// Position of the end-1 pulse in its input list.
    pub end1_index: usize,
    /// Position of the end-2 pulse in its input list.
    pub end2_index: usize,
    /// End-1 arrival time.
    pub end1: f64,
    /// End-2 arrival time.
    pub end2: f64,
}

impl CandidatePair {
    /// Raw end-to-end difference.
    #[inline]
    #[must_use]
    pub fn difference(&self) -> f64 {
        self.end1 - self.end2
    }

    /// Time-sum relative to the MCP pulse at `mcp_time`.
    #[inline]
    #[must_use]
    pub fn time_sum(&self, mcp_time: f64) -> f64 {
        self.end1 + self.end2 - 2.0 * mcp_time
    }
}

/// Finds the wire-end pairs of one axis that pass its time-sum gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairMatcher {
    tsum_low: f64,
    tsum_high: f64,
}

impl PairMatcher {
    /// Matcher using the gate of `axis`.
    #[must_use]
    pub fn new(axis: &AxisParams) -> Self {
        Self {
            tsum_low: axis.tsum_low(),
            tsum_high: axis.tsum_high(),
        }
    }

    /// True if `time_sum` lies strictly inside the gate.
    #[inline]
    #[must_use]
    pub fn accepts(&self, time_sum: f64) -> bool {
        time_sum > self.tsum_low && time_sum < self.tsum_high
    }

    /// Lazily enumerates accepted pairs in row-major order (end-1 major,
    /// end-2 minor).
    #[must_use]
    pub fn pairs(
        &self,
        end1: &[f64],
        end2: &[f64],
        mcp_time: f64,
        window: &CoincidenceWindow,
    ) -> PairIter {
        let firsts = window.select(end1);
        // Without end-1 candidates no row can yield a pair.
        let seconds = if firsts.is_empty() {
            Vec::new()
        } else {
            window.select(end2)
        };

        PairIter {
            matcher: *self,
            firsts,
            seconds,
            row: 0,
            col: 0,
            mcp_time,
        }
    }

    /// All accepted pairs in row-major order.
    #[must_use]
    pub fn matching_pairs(
        &self,
        end1: &[f64],
        end2: &[f64],
        mcp_time: f64,
        window: &CoincidenceWindow,
    ) -> Vec<CandidatePair> {
        self.pairs(end1, end2, mcp_time, window).collect()
    }
}

/// Row-major iterator over accepted pairs, see [`PairMatcher::pairs`].
#[derive(Debug, Clone)]
pub struct PairIter {
    matcher: PairMatcher,
    firsts: Vec<(usize, f64)>,
    seconds: Vec<(usize, f64)>,
    row: usize,
    col: usize,
    mcp_time: f64,
}

impl Iterator for PairIter {
    type Item = CandidatePair;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&(end1_index, end1)) = self.firsts.get(self.row) {
            while let Some(&(end2_index, end2)) = self.seconds.get(self.col) {
                self.col += 1;
                let pair = CandidatePair {
                    end1_index,
                    end2_index,
                    end1,
                    end2,
                };
                if self.matcher.accepts(pair.time_sum(self.mcp_time)) {
                    return Some(pair);
                }
            }
            self.row += 1;
            self.col = 0;
        }
        None
    }
}
