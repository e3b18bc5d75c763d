//! Raw pulse lists of one detector readout window.
//!
//! A shot holds seven independent pulse sequences: the MCP timing channel
//! and both ends of the three delay-line wires. Lengths are unrelated; wire-end
//! pulses are not pre-paired.

use crate::error::ShapeError;
use serde::Serialize;
use serde_json::Value;

/// One of the seven pulse channels of a delay-line detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Mcp,
    U1,
    U2,
    V1,
    V2,
    W1,
    W2,
}

impl Channel {
    /// All channels in packed-layout order.
    pub const ALL: [Channel; 7] = [
        Channel::Mcp,
        Channel::U1,
        Channel::U2,
        Channel::V1,
        Channel::V2,
        Channel::W1,
        Channel::W2,
    ];

    /// Channel name used in shot records.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Channel::Mcp => "mcp",
            Channel::U1 => "u1",
            Channel::U2 => "u2",
            Channel::V1 => "v1",
            Channel::V2 => "v2",
            Channel::W1 => "w1",
            Channel::W2 => "w2",
        }
    }
}

/// Borrowed view of one shot's pulse lists.
///
/// This is what the hit finder consumes, so owned shots and foreign buffers
/// (numpy arrays, packed digitizer records) share one code path.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseLists<'a> {
    pub mcp: &'a [f64],
    pub u1: &'a [f64],
    pub u2: &'a [f64],
    pub v1: &'a [f64],
    pub v2: &'a [f64],
    pub w1: &'a [f64],
    pub w2: &'a [f64],
}

impl<'a> PulseLists<'a> {
    /// Returns the pulses of one channel.
    #[must_use]
    pub fn channel(&self, channel: Channel) -> &'a [f64] {
        match channel {
            Channel::Mcp => self.mcp,
            Channel::U1 => self.u1,
            Channel::U2 => self.u2,
            Channel::V1 => self.v1,
            Channel::V2 => self.v2,
            Channel::W1 => self.w1,
            Channel::W2 => self.w2,
        }
    }

    /// Splits a packed record into channel views.
    ///
    /// `values` holds all channels back to back in [`Channel::ALL`] order and
    /// `counts` the length of each channel.
    ///
    /// # Errors
    /// Returns [`ShapeError`] if `counts` does not have seven entries, holds a
    /// negative length, or does not add up to `values.len()`.
    pub fn from_packed(values: &'a [f64], counts: &[i64]) -> Result<Self, ShapeError> {
        if counts.len() != Channel::ALL.len() {
            return Err(ShapeError::ChannelCount {
                expected: Channel::ALL.len(),
                found: counts.len(),
            });
        }

        let mut lengths = [0usize; 7];
        for ((length, &count), channel) in lengths.iter_mut().zip(counts).zip(Channel::ALL) {
            *length = usize::try_from(count).map_err(|_| ShapeError::NegativeLength {
                channel: channel.name(),
                length: count,
            })?;
        }

        let declared = lengths
            .iter()
            .try_fold(0usize, |acc, &len| acc.checked_add(len))
            .unwrap_or(usize::MAX);
        if declared != values.len() {
            return Err(ShapeError::LengthMismatch {
                declared,
                found: values.len(),
            });
        }

        let mut slices = [&values[..0]; 7];
        let mut rest = values;
        for (slice, len) in slices.iter_mut().zip(lengths) {
            let (head, tail) = rest.split_at(len);
            *slice = head;
            rest = tail;
        }
        let [mcp, u1, u2, v1, v2, w1, w2] = slices;

        Ok(Self {
            mcp,
            u1,
            u2,
            v1,
            v2,
            w1,
            w2,
        })
    }
}

/// Owned pulse lists of one shot.
///
/// Serializes to the record layout read by [`ShotPulses::from_json_value`];
/// NaN pulses are written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShotPulses {
    pub mcp: Vec<f64>,
    pub u1: Vec<f64>,
    pub u2: Vec<f64>,
    pub v1: Vec<f64>,
    pub v2: Vec<f64>,
    pub w1: Vec<f64>,
    pub w2: Vec<f64>,
}

impl ShotPulses {
    /// Borrows the shot as a [`PulseLists`] view.
    #[must_use]
    pub fn lists(&self) -> PulseLists<'_> {
        PulseLists {
            mcp: &self.mcp,
            u1: &self.u1,
            u2: &self.u2,
            v1: &self.v1,
            v2: &self.v2,
            w1: &self.w1,
            w2: &self.w2,
        }
    }

    /// Total number of pulses over all channels.
    #[must_use]
    pub fn pulse_count(&self) -> usize {
        let lists = self.lists();
        Channel::ALL
            .iter()
            .map(|&channel| lists.channel(channel).len())
            .sum()
    }

    /// Decodes a shot record such as `{"mcp": [..], "u1": [..], ...}`.
    ///
    /// `null` entries decode as NaN, which the hit finder treats as a pulse
    /// that never falls inside any window.
    ///
    /// # Errors
    /// Returns [`ShapeError`] if the record is not an object, a channel is
    /// missing or not an array, or an entry is neither a number nor `null`.
    pub fn from_json_value(value: &Value) -> Result<Self, ShapeError> {
        let record = value.as_object().ok_or(ShapeError::NotAnObject)?;
        let decode = |channel: Channel| -> Result<Vec<f64>, ShapeError> {
            let name = channel.name();
            let entries = record
                .get(name)
                .ok_or(ShapeError::MissingChannel(name))?
                .as_array()
                .ok_or(ShapeError::NotAnArray(name))?;
            entries
                .iter()
                .enumerate()
                .map(|(index, entry)| match entry {
                    Value::Null => Ok(f64::NAN),
                    other => other.as_f64().ok_or(ShapeError::NonNumeric {
                        channel: name,
                        index,
                    }),
                })
                .collect()
        };

        Ok(Self {
            mcp: decode(Channel::Mcp)?,
            u1: decode(Channel::U1)?,
            u2: decode(Channel::U2)?,
            v1: decode(Channel::V1)?,
            v2: decode(Channel::V2)?,
            w1: decode(Channel::W1)?,
            w2: decode(Channel::W2)?,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_packed_layout_split() {
        let values = [1.0, 2.0, 10.0, 11.0, 12.0, 20.0, 30.0];
        let lists = PulseLists::from_packed(&values, &[2, 3, 0, 1, 1, 0, 0]).unwrap();
        assert_eq!(lists.mcp, &[1.0, 2.0]);
        assert_eq!(lists.u1, &[10.0, 11.0, 12.0]);
        assert!(lists.u2.is_empty());
        assert_eq!(lists.v1, &[20.0]);
        assert_eq!(lists.v2, &[30.0]);
        assert!(lists.w2.is_empty());
    }

    #[test]
    fn test_packed_layout_errors() {
        let values = [1.0, 2.0];
        assert_eq!(
            PulseLists::from_packed(&values, &[1, 1]).unwrap_err(),
            ShapeError::ChannelCount {
                expected: 7,
                found: 2
            }
        );
        assert_eq!(
            PulseLists::from_packed(&values, &[1, -1, 0, 0, 0, 0, 2]).unwrap_err(),
            ShapeError::NegativeLength {
                channel: "u1",
                length: -1
            }
        );
        assert_eq!(
            PulseLists::from_packed(&values, &[1, 1, 1, 0, 0, 0, 0]).unwrap_err(),
            ShapeError::LengthMismatch {
                declared: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_json_record_decoding() {
        let record = json!({
            "mcp": [1000.0], "u1": [1027, null], "u2": [1023.0],
            "v1": [], "v2": [], "w1": [], "w2": []
        });
        let shot = ShotPulses::from_json_value(&record).unwrap();
        assert_eq!(shot.mcp, vec![1000.0]);
        assert_eq!(shot.u1[0], 1027.0);
        assert!(shot.u1[1].is_nan());
        assert_eq!(shot.pulse_count(), 4);
    }

    #[test]
    fn test_serialized_record_decodes_back() {
        let shot = ShotPulses {
            mcp: vec![1000.0],
            u1: vec![1027.5, f64::NAN],
            w2: vec![1019.25],
            ..ShotPulses::default()
        };
        let record = serde_json::to_value(&shot).unwrap();
        assert!(record["u1"][1].is_null());

        let decoded = ShotPulses::from_json_value(&record).unwrap();
        assert_eq!(decoded.u1[0], 1027.5);
        assert!(decoded.u1[1].is_nan());
        assert_eq!(decoded.w2, shot.w2);
        assert_eq!(decoded.pulse_count(), shot.pulse_count());
    }

    #[test]
    fn test_json_record_errors() {
        assert_eq!(
            ShotPulses::from_json_value(&json!([1.0])).unwrap_err(),
            ShapeError::NotAnObject
        );
        assert_eq!(
            ShotPulses::from_json_value(&json!({ "mcp": [] })).unwrap_err(),
            ShapeError::MissingChannel("u1")
        );

        let record = json!({
            "mcp": [1.0], "u1": [2.0, "x"], "u2": [], "v1": [], "v2": [], "w1": [], "w2": []
        });
        assert_eq!(
            ShotPulses::from_json_value(&record).unwrap_err(),
            ShapeError::NonNumeric {
                channel: "u1",
                index: 1
            }
        );

        let record = json!({
            "mcp": 5.0, "u1": [], "u2": [], "v1": [], "v2": [], "w1": [], "w2": []
        });
        assert_eq!(
            ShotPulses::from_json_value(&record).unwrap_err(),
            ShapeError::NotAnArray("mcp")
        );
    }
}
