//! File writers for reconstructed hits.

use crate::Result;
use hexanode_core::params::Axis;
use hexanode_core::{AxisSeries, HitList};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Bytes per binary hit record.
pub const HIT_RECORD_BYTES: usize = 32;

/// On-disk layout of a hit file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitFormat {
    /// Text with a `shot,x,y,t` header.
    Csv,
    /// Little-endian records: u64 (shot) + f64 (x) + f64 (y) + f64 (t).
    Binary,
}

impl HitFormat {
    /// Picks the format from the file extension: `csv` (any case) or binary.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Binary,
        }
    }
}

/// Writer for per-shot hit lists.
///
/// Every hit is tagged with the index of the shot it came from, so shots
/// without hits leave no trace in the output.
pub struct HitFileWriter {
    writer: BufWriter<File>,
    format: HitFormat,
    hits_written: usize,
}

impl HitFileWriter {
    /// Creates a writer whose format follows the file extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let format = HitFormat::from_path(&path);
        Self::create_with_format(path, format)
    }

    /// Creates a writer with an explicit format.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create_with_format<P: AsRef<Path>>(path: P, format: HitFormat) -> Result<Self> {
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        if format == HitFormat::Csv {
            writeln!(writer, "shot,x,y,t")?;
        }
        log::debug!("writing {format:?} hits to {}", path.as_ref().display());
        Ok(Self {
            writer,
            format,
            hits_written: 0,
        })
    }

    /// Output format.
    #[must_use]
    pub fn format(&self) -> HitFormat {
        self.format
    }

    /// Number of hits written so far.
    #[must_use]
    pub fn hits_written(&self) -> usize {
        self.hits_written
    }

    /// Writes the hits of one shot.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_shot(&mut self, shot: u64, hits: &HitList) -> Result<()> {
        for hit in hits.iter() {
            match self.format {
                HitFormat::Csv => writeln!(self.writer, "{shot},{},{},{}", hit.x, hit.y, hit.t)?,
                HitFormat::Binary => {
                    self.writer.write_all(&shot.to_le_bytes())?;
                    self.writer.write_all(&hit.x.to_le_bytes())?;
                    self.writer.write_all(&hit.y.to_le_bytes())?;
                    self.writer.write_all(&hit.t.to_le_bytes())?;
                }
            }
        }
        self.hits_written += hits.len();
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// CSV writer for per-pair diagnostic series (`shot,kind,axis,value`).
pub struct DiagnosticsWriter {
    writer: BufWriter<File>,
}

impl DiagnosticsWriter {
    /// Creates the file and writes the header.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "shot,kind,axis,value")?;
        Ok(Self { writer })
    }

    /// Writes whichever diagnostic series the hit list carries.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_shot(&mut self, shot: u64, hits: &HitList) -> Result<()> {
        if let Some(tsum) = &hits.tsum {
            self.write_series(shot, "tsum", tsum)?;
        }
        if let Some(diff) = &hits.diff {
            self.write_series(shot, "diff", diff)?;
        }
        Ok(())
    }

    fn write_series(&mut self, shot: u64, kind: &str, series: &AxisSeries) -> Result<()> {
        for axis in Axis::ALL {
            for value in series.get(axis) {
                writeln!(self.writer, "{shot},{kind},{},{value}", axis.name())?;
            }
        }
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use hexanode_core::params::DiagnosticsConfig;
    use hexanode_core::Hit;
    use tempfile::{Builder, NamedTempFile};

    fn hits() -> HitList {
        [Hit::new(1.5, -2.5, 1000.0), Hit::new(10.25, 20.75, 2000.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(HitFormat::from_path("out.csv"), HitFormat::Csv);
        assert_eq!(HitFormat::from_path("OUT.CSV"), HitFormat::Csv);
        assert_eq!(HitFormat::from_path("out.bin"), HitFormat::Binary);
        assert_eq!(HitFormat::from_path("out"), HitFormat::Binary);
    }

    #[test]
    fn test_write_hits_csv() {
        let file = Builder::new().suffix(".csv").tempfile().unwrap();
        let mut writer = HitFileWriter::create(file.path()).unwrap();
        assert_eq!(writer.format(), HitFormat::Csv);

        writer.write_shot(0, &hits()).unwrap();
        writer.write_shot(1, &HitList::new()).unwrap();
        writer.write_shot(2, &hits()).unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.hits_written(), 4);

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "shot,x,y,t");
        assert_eq!(lines[1], "0,1.5,-2.5,1000");
        assert_eq!(lines[4], "2,10.25,20.75,2000");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_write_hits_binary() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = HitFileWriter::create_with_format(file.path(), HitFormat::Binary).unwrap();
        writer.write_shot(7, &hits()).unwrap();
        writer.flush().unwrap();

        let data = std::fs::read(file.path()).unwrap();
        assert_eq!(data.len(), 2 * HIT_RECORD_BYTES);
        assert_eq!(u64::from_le_bytes(data[0..8].try_into().unwrap()), 7);
        assert_eq!(f64::from_le_bytes(data[8..16].try_into().unwrap()), 1.5);
        assert_eq!(f64::from_le_bytes(data[56..64].try_into().unwrap()), 2000.0);
    }

    #[test]
    fn test_write_diagnostics() {
        let mut list = HitList::with_diagnostics(DiagnosticsConfig::none().with_tsum(true).with_diff(true));
        list.tsum.as_mut().unwrap().push(Axis::U, 0.5);
        list.diff.as_mut().unwrap().push(Axis::W, -3.0);

        let file = NamedTempFile::new().unwrap();
        let mut writer = DiagnosticsWriter::create(file.path()).unwrap();
        writer.write_shot(4, &list).unwrap();
        writer.write_shot(5, &HitList::new()).unwrap();
        writer.flush().unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "shot,kind,axis,value\n4,tsum,u,0.5\n4,diff,w,-3\n");
    }
}
