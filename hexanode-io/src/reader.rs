//! JSON Lines shot readers.
//!
//! One shot per line:
//!
//! ```text
//! {"mcp": [1000.0], "u1": [1027.0], "u2": [1023.0], "v1": [...], "v2": [...], "w1": [], "w2": []}
//! ```
//!
//! Blank lines are skipped. A malformed line yields an error for that line
//! only; reading continues with the next one.

use crate::{Error, Result};
use hexanode_core::ShotPulses;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Streaming reader yielding one `Result<ShotPulses>` per non-blank line.
pub struct ShotReader<R> {
    lines: Lines<R>,
    line: usize,
    finished: bool,
}

/// Shot reader over a buffered file.
pub type ShotFileReader = ShotReader<BufReader<File>>;

impl<R: BufRead> ShotReader<R> {
    /// Wraps any buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
            finished: false,
        }
    }

    /// Number of lines consumed so far, including blank ones.
    #[must_use]
    pub fn lines_read(&self) -> usize {
        self.line
    }
}

impl ShotReader<BufReader<File>> {
    /// Opens a shot file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        log::debug!("reading shots from {}", path.as_ref().display());
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for ShotReader<R> {
    type Item = Result<ShotPulses>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(err) => {
                    // A failing stream does not recover; report once and stop.
                    self.finished = true;
                    return Some(Err(err.into()));
                }
            };
            self.line += 1;

            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(parse_shot_line(self.line, trimmed));
            }
        }
    }
}

/// Decodes one shot line; `line` is used for error reporting only.
///
/// # Errors
/// Returns [`Error::Json`] for invalid JSON and [`Error::Shape`] for a
/// record with missing, non-array, or non-numeric channels.
pub fn parse_shot_line(line: usize, text: &str) -> Result<ShotPulses> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|err| Error::Json {
        line,
        message: err.to_string(),
    })?;
    ShotPulses::from_json_value(&value).map_err(|source| Error::Shape { line, source })
}
