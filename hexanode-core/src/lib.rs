//! hexanode-core: Core types for delay-line-anode hit reconstruction.
//!
//! This crate provides the detector parameters, per-shot pulse lists,
//! reconstructed hit types, and the error taxonomy shared by the
//! algorithm, I/O, and binding crates.
//!

pub mod error;
pub mod hit;
pub mod params;
pub mod shot;
pub mod soa;

pub use error::{ConfigError, Error, Result, ShapeError};
pub use hit::Hit;
pub use params::{Axis, AxisKeys, AxisParams, DiagnosticsConfig, ParameterValue, Parameters};
pub use shot::{Channel, PulseLists, ShotPulses};
pub use soa::{AxisSeries, HitList};
