//! High-level helpers that run the hit finder over many shots.
//!
//! Shots are independent: a malformed shot never stops the run. It is logged,
//! counted, and replaced by an empty hit list so that output positions keep
//! lining up with input shots.

use crate::hit_finder::HitFinder;
use hexanode_core::{HitList, ShotPulses};
use rayon::prelude::*;
use std::fmt::Display;

/// Counters accumulated while processing shots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitStatistics {
    /// Shots seen, including failed ones.
    pub shots: usize,
    /// Shots replaced by an empty hit list.
    pub failed_shots: usize,
    /// MCP pulses in successfully processed shots.
    pub mcp_pulses: usize,
    /// Hits found.
    pub hits: usize,
}

impl HitStatistics {
    /// Counts one processed shot.
    pub fn record(&mut self, mcp_pulses: usize, hits: &HitList) {
        self.shots += 1;
        self.mcp_pulses += mcp_pulses;
        self.hits += hits.len();
    }

    /// Counts one failed shot.
    pub fn record_failure(&mut self) {
        self.shots += 1;
        self.failed_shots += 1;
    }

    /// Combines the counters of two partitions.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            shots: self.shots + other.shots,
            failed_shots: self.failed_shots + other.failed_shots,
            mcp_pulses: self.mcp_pulses + other.mcp_pulses,
            hits: self.hits + other.hits,
        }
    }

    /// Fraction of MCP pulses that produced a hit, 0 when none were seen.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_fraction(&self) -> f64 {
        if self.mcp_pulses == 0 {
            0.0
        } else {
            self.hits as f64 / self.mcp_pulses as f64
        }
    }
}

/// Hit lists of a run, one per input shot, with their counters.
#[derive(Debug, Clone, Default)]
pub struct ProcessedShots {
    /// One list per input shot, in input order.
    pub hits: Vec<HitList>,
    /// Counters over all shots.
    pub statistics: HitStatistics,
}

/// Processes shots sequentially.
///
/// Failed shots (`Err` items) are logged at warn level and produce an empty
/// hit list.
pub fn process_shots<I, E>(finder: &HitFinder, shots: I) -> ProcessedShots
where
    I: IntoIterator<Item = Result<ShotPulses, E>>,
    E: Display,
{
    let mut processed = ProcessedShots::default();
    for (index, shot) in shots.into_iter().enumerate() {
        let (hits, statistics) = process_one(finder, index, shot.as_ref());
        processed.statistics = processed.statistics.merge(statistics);
        processed.hits.push(hits);
    }
    log::debug!(
        "processed {} shots: {} hits, {} failed",
        processed.statistics.shots,
        processed.statistics.hits,
        processed.statistics.failed_shots
    );
    processed
}

/// Processes shots in parallel, preserving input order.
///
/// Failure handling matches [`process_shots`].
pub fn process_shots_parallel<E>(finder: &HitFinder, shots: &[Result<ShotPulses, E>]) -> ProcessedShots
where
    E: Display + Sync,
{
    let (hits, partials): (Vec<HitList>, Vec<HitStatistics>) = shots
        .par_iter()
        .enumerate()
        .map(|(index, shot)| process_one(finder, index, shot.as_ref()))
        .unzip();

    let statistics = partials
        .into_iter()
        .fold(HitStatistics::default(), HitStatistics::merge);
    log::debug!(
        "processed {} shots in parallel: {} hits, {} failed",
        statistics.shots,
        statistics.hits,
        statistics.failed_shots
    );
    ProcessedShots { hits, statistics }
}

/// Finds the hits of well-formed shots in parallel, preserving input order.
#[must_use]
pub fn find_hits_parallel(finder: &HitFinder, shots: &[ShotPulses]) -> Vec<HitList> {
    shots
        .par_iter()
        .map(|shot| finder.find_hits(shot.lists()))
        .collect()
}

/// Counts hits of well-formed shots in parallel without keeping the lists.
#[must_use]
pub fn hit_statistics_parallel(finder: &HitFinder, shots: &[ShotPulses]) -> HitStatistics {
    shots
        .par_iter()
        .fold(HitStatistics::default, |mut statistics, shot| {
            let hits = finder.find_hits(shot.lists());
            statistics.record(shot.mcp.len(), &hits);
            statistics
        })
        .reduce(HitStatistics::default, HitStatistics::merge)
}

fn process_one<E: Display>(
    finder: &HitFinder,
    index: usize,
    shot: Result<&ShotPulses, &E>,
) -> (HitList, HitStatistics) {
    let mut statistics = HitStatistics::default();
    match shot {
        Ok(shot) => {
            let hits = finder.find_hits(shot.lists());
            statistics.record(shot.mcp.len(), &hits);
            (hits, statistics)
        }
        Err(err) => {
            log::warn!("shot {index}: {err}; substituting an empty hit list");
            statistics.record_failure();
            (
                HitList::with_diagnostics(finder.params().diagnostics()),
                statistics,
            )
        }
    }
}
