//! Per-shot hit finding.
//!
//! For each MCP pulse, in input order:
//! 1. derive the coincidence window of every axis,
//! 2. match wire-end pairs on u and v (and w when diagnostics are enabled),
//! 3. keep the first u/v combination that lands inside the detector radius.
//!
//! MCP pulses without such a combination produce no hit. The finder holds
//! only immutable configuration; every call returns a freshly allocated
//! [`HitList`].

use crate::pairs::{CandidatePair, PairMatcher};
use crate::position::PositionReconstructor;
use crate::window::CoincidenceWindow;
use hexanode_core::error::ShapeError;
use hexanode_core::params::{Axis, Parameters};
use hexanode_core::shot::PulseLists;
use hexanode_core::{Hit, HitList};

/// Delay-line hit finder for one detector configuration.
#[derive(Debug, Clone)]
pub struct HitFinder {
    params: Parameters,
    u: PairMatcher,
    v: PairMatcher,
    w: PairMatcher,
    reconstructor: PositionReconstructor,
}

impl HitFinder {
    /// Creates a hit finder from validated parameters.
    #[must_use]
    pub fn new(params: Parameters) -> Self {
        Self {
            u: PairMatcher::new(params.u()),
            v: PairMatcher::new(params.v()),
            w: PairMatcher::new(params.w()),
            reconstructor: PositionReconstructor::new(&params),
            params,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Reconstructs the hits of one shot.
    ///
    /// Empty or all-NaN channels are valid input and simply yield fewer hits.
    #[must_use]
    pub fn find_hits(&self, pulses: PulseLists<'_>) -> HitList {
        let diagnostics = self.params.diagnostics();
        let mut hits = HitList::with_diagnostics(diagnostics);

        let u_windows = CoincidenceWindow::for_pulses(self.params.u(), pulses.mcp);
        let v_windows = CoincidenceWindow::for_pulses(self.params.v(), pulses.mcp);
        let w_windows = if diagnostics.any() {
            CoincidenceWindow::for_pulses(self.params.w(), pulses.mcp)
        } else {
            Vec::new()
        };

        for (index, &mcp_time) in pulses.mcp.iter().enumerate() {
            let windows = AxisWindows {
                u: &u_windows[index],
                v: &v_windows[index],
                w: w_windows.get(index),
            };
            let position = if diagnostics.any() {
                self.resolve_recording(pulses, mcp_time, &windows, &mut hits)
            } else {
                self.resolve_first(pulses, mcp_time, &windows)
            };

            if let Some((x, y)) = position {
                hits.push(Hit::new(x, y, mcp_time));
            }
        }

        hits
    }

    /// Reconstructs the hits of one shot stored in packed layout.
    ///
    /// # Errors
    /// Returns [`ShapeError`] if `counts` does not describe `values`; see
    /// [`PulseLists::from_packed`].
    pub fn find_hits_packed(&self, values: &[f64], counts: &[i64]) -> Result<HitList, ShapeError> {
        let pulses = PulseLists::from_packed(values, counts)?;
        Ok(self.find_hits(pulses))
    }

    /// Hot path: u pairs are enumerated lazily and the search stops at the
    /// first in-radius combination.
    fn resolve_first(
        &self,
        pulses: PulseLists<'_>,
        mcp_time: f64,
        windows: &AxisWindows<'_>,
    ) -> Option<(f64, f64)> {
        let v_pairs = self
            .v
            .matching_pairs(pulses.v1, pulses.v2, mcp_time, windows.v);
        if v_pairs.is_empty() {
            return None;
        }
        let u_pairs = self.u.pairs(pulses.u1, pulses.u2, mcp_time, windows.u);
        self.reconstructor.first_within_radius(u_pairs, &v_pairs)
    }

    /// Diagnostics path: every accepted pair on every axis is recorded before
    /// the same first-match selection runs.
    fn resolve_recording(
        &self,
        pulses: PulseLists<'_>,
        mcp_time: f64,
        windows: &AxisWindows<'_>,
        hits: &mut HitList,
    ) -> Option<(f64, f64)> {
        let u_pairs = self
            .u
            .matching_pairs(pulses.u1, pulses.u2, mcp_time, windows.u);
        let v_pairs = self
            .v
            .matching_pairs(pulses.v1, pulses.v2, mcp_time, windows.v);
        let w_pairs = windows.w.map_or_else(Vec::new, |window| {
            self.w
                .matching_pairs(pulses.w1, pulses.w2, mcp_time, window)
        });

        self.record(Axis::U, &u_pairs, mcp_time, hits);
        self.record(Axis::V, &v_pairs, mcp_time, hits);
        self.record(Axis::W, &w_pairs, mcp_time, hits);

        self.reconstructor.first_within_radius(u_pairs, &v_pairs)
    }

    fn record(&self, axis: Axis, pairs: &[CandidatePair], mcp_time: f64, hits: &mut HitList) {
        let tsum_avg = self.params.axis(axis).tsum_avg();
        if let Some(tsum) = hits.tsum.as_mut() {
            for pair in pairs {
                tsum.push(axis, pair.time_sum(mcp_time) - tsum_avg);
            }
        }
        if let Some(diff) = hits.diff.as_mut() {
            for pair in pairs {
                diff.push(axis, pair.difference());
            }
        }
    }
}

/// Windows of one MCP pulse.
struct AxisWindows<'a> {
    u: &'a CoincidenceWindow,
    v: &'a CoincidenceWindow,
    w: Option<&'a CoincidenceWindow>,
}
