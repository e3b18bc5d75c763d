//! hexanode-io: Shot file reading and hit file writing.
//!
//! Shots are read from JSON Lines files, one record per line. Hits are
//! written as CSV or compact little-endian binary; per-pair diagnostics go
//! to a separate CSV file.
//!

mod error;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use reader::{parse_shot_line, ShotFileReader, ShotReader};
pub use writer::{DiagnosticsWriter, HitFileWriter, HitFormat, HIT_RECORD_BYTES};
