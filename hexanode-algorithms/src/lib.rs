//! hexanode-algorithms: Hit finding for hexagonal delay-line anodes.
//!
//! The pipeline for one shot:
//! - **Window** - per-axis coincidence window around each MCP pulse
//! - **Pairs** - time-sum matched wire-end pairs
//! - **Position** - hexagonal u/v projection with a radius cut
//! - **Hit finder** - first-match selection per MCP pulse
//!
#![warn(missing_docs)]

mod hit_finder;
mod pairs;
mod position;
mod processing;
mod window;

pub use hit_finder::HitFinder;
pub use pairs::{CandidatePair, PairIter, PairMatcher};
pub use position::{corrected_difference, hex_position, PositionReconstructor, SQRT_3};
pub use processing::{
    find_hits_parallel, hit_statistics_parallel, process_shots, process_shots_parallel,
    HitStatistics, ProcessedShots,
};
pub use window::CoincidenceWindow;

// Re-export core types used in the public API
pub use hexanode_core::{HitList, Parameters, PulseLists, ShotPulses};
