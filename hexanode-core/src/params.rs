//! Detector parameters for hit reconstruction.
//!
//! A [`Parameters`] value is built once per detector configuration, validated
//! at construction and never mutated afterwards. It is `Send + Sync` and can be
//! shared by any number of workers processing disjoint shots.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Key of the detector acceptance radius.
pub const RADIUS_KEY: &str = "rMCP";
/// Key of the flag enabling time-sum residual diagnostics.
pub const TSUM_DIAGNOSTICS_KEY: &str = "emit_tsum_diagnostics";
/// Key of the flag enabling raw difference diagnostics.
pub const DIFF_DIAGNOSTICS_KEY: &str = "emit_diff_diagnostics";

/// One of the three delay-line wire pairs of a hexagonal anode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    U,
    V,
    W,
}

impl Axis {
    /// All axes in canonical order.
    pub const ALL: [Axis; 3] = [Axis::U, Axis::V, Axis::W];

    /// Lowercase axis name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Axis::U => "u",
            Axis::V => "v",
            Axis::W => "w",
        }
    }

    /// Configuration keys of this axis.
    #[must_use]
    pub fn keys(self) -> AxisKeys {
        match self {
            Axis::U => AxisKeys {
                runtime: "runtime_u",
                diff_offset: "u_diff_offset",
                tsum_avg: "tsum_avg_u",
                tsum_hw: "tsum_hw_u",
                scale: "f_u",
            },
            Axis::V => AxisKeys {
                runtime: "runtime_v",
                diff_offset: "v_diff_offset",
                tsum_avg: "tsum_avg_v",
                tsum_hw: "tsum_hw_v",
                scale: "f_v",
            },
            Axis::W => AxisKeys {
                runtime: "runtime_w",
                diff_offset: "w_diff_offset",
                tsum_avg: "tsum_avg_w",
                tsum_hw: "tsum_hw_w",
                scale: "f_w",
            },
        }
    }
}

/// Names of the per-axis configuration fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisKeys {
    pub runtime: &'static str,
    pub diff_offset: &'static str,
    pub tsum_avg: &'static str,
    pub tsum_hw: &'static str,
    pub scale: &'static str,
}

impl AxisKeys {
    /// All five keys, in configuration order.
    #[must_use]
    pub fn all(self) -> [&'static str; 5] {
        [
            self.runtime,
            self.diff_offset,
            self.tsum_avg,
            self.tsum_hw,
            self.scale,
        ]
    }
}

/// Calibration and gating constants of one wire pair.
///
/// The time-sum gate bounds are derived once here and reused for every shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisParams {
    runtime: f64,
    diff_offset: f64,
    tsum_avg: f64,
    tsum_hw: f64,
    scale: f64,
    tsum_low: f64,
    tsum_high: f64,
}

impl AxisParams {
    /// Creates axis constants. Validation happens in [`Parameters::new`].
    #[must_use]
    pub fn new(runtime: f64, diff_offset: f64, tsum_avg: f64, tsum_hw: f64, scale: f64) -> Self {
        Self {
            runtime,
            diff_offset,
            tsum_avg,
            tsum_hw,
            scale,
            tsum_low: tsum_avg - tsum_hw,
            tsum_high: tsum_avg + tsum_hw,
        }
    }

    /// Maximum signal propagation time along the wire.
    #[inline]
    #[must_use]
    pub fn runtime(&self) -> f64 {
        self.runtime
    }

    /// Offset centring the end-to-end difference at zero.
    #[inline]
    #[must_use]
    pub fn diff_offset(&self) -> f64 {
        self.diff_offset
    }

    /// Expected time-sum relative to the MCP pulse.
    #[inline]
    #[must_use]
    pub fn tsum_avg(&self) -> f64 {
        self.tsum_avg
    }

    /// Half-width of the time-sum gate.
    #[inline]
    #[must_use]
    pub fn tsum_hw(&self) -> f64 {
        self.tsum_hw
    }

    /// Time-to-length scale factor.
    #[inline]
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Lower (exclusive) bound of the time-sum gate.
    #[inline]
    #[must_use]
    pub fn tsum_low(&self) -> f64 {
        self.tsum_low
    }

    /// Upper (exclusive) bound of the time-sum gate.
    #[inline]
    #[must_use]
    pub fn tsum_high(&self) -> f64 {
        self.tsum_high
    }

    fn validate(&self, keys: AxisKeys) -> Result<(), ConfigError> {
        for (name, value) in keys.all().into_iter().zip([
            self.runtime,
            self.diff_offset,
            self.tsum_avg,
            self.tsum_hw,
            self.scale,
        ]) {
            require_finite(name, value)?;
        }
        require_non_negative(keys.runtime, self.runtime)?;
        require_non_negative(keys.tsum_hw, self.tsum_hw)?;
        Ok(())
    }
}

/// Which optional per-pair diagnostic series a hit finder emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Emit the time-sum residual of every accepted pair.
    pub tsum: bool,
    /// Emit the raw end-to-end difference of every accepted pair.
    pub diff: bool,
}

impl DiagnosticsConfig {
    /// Diagnostics fully disabled.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Sets time-sum residual emission.
    #[must_use]
    pub fn with_tsum(mut self, enabled: bool) -> Self {
        self.tsum = enabled;
        self
    }

    /// Sets raw difference emission.
    #[must_use]
    pub fn with_diff(mut self, enabled: bool) -> Self {
        self.diff = enabled;
        self
    }

    /// True when at least one series is emitted.
    #[must_use]
    pub fn any(&self) -> bool {
        self.tsum || self.diff
    }
}

/// A configuration value before it is checked against the field it fills.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// Any number, integral or not.
    Number(f64),
    /// A boolean.
    Flag(bool),
    /// An explicit null / `None`.
    Null,
    /// Anything else, kept in printable form for error messages.
    Other(String),
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Number(number) => write!(f, "{number}"),
            ParameterValue::Flag(enabled) => write!(f, "{enabled}"),
            ParameterValue::Null => f.write_str("null"),
            ParameterValue::Other(text) => f.write_str(text),
        }
    }
}

impl From<&Value> for ParameterValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ParameterValue::Null,
            Value::Bool(enabled) => ParameterValue::Flag(*enabled),
            Value::Number(number) => number
                .as_f64()
                .map_or_else(|| ParameterValue::Other(number.to_string()), ParameterValue::Number),
            other => ParameterValue::Other(other.to_string()),
        }
    }
}

/// Validated, immutable per-detector configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    u: AxisParams,
    v: AxisParams,
    w: AxisParams,
    radius: f64,
    diagnostics: DiagnosticsConfig,
}

impl Parameters {
    /// Builds a parameter set from already-typed values.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if any value is non-finite, or a runtime or
    /// time-sum half-width is negative.
    pub fn new(
        u: AxisParams,
        v: AxisParams,
        w: AxisParams,
        radius: f64,
        diagnostics: DiagnosticsConfig,
    ) -> Result<Self, ConfigError> {
        u.validate(Axis::U.keys())?;
        v.validate(Axis::V.keys())?;
        w.validate(Axis::W.keys())?;
        require_finite(RADIUS_KEY, radius)?;

        Ok(Self {
            u,
            v,
            w,
            radius,
            diagnostics,
        })
    }

    /// Every numeric key a configuration must provide.
    pub fn required_keys() -> impl Iterator<Item = &'static str> {
        Axis::ALL
            .into_iter()
            .flat_map(|axis| axis.keys().all())
            .chain(std::iter::once(RADIUS_KEY))
    }

    /// Builds a parameter set from a name-to-number mapping.
    ///
    /// Extra keys are ignored.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] for the first absent key, or any
    /// validation error from [`Parameters::new`].
    pub fn from_numbers(
        values: &HashMap<String, f64>,
        diagnostics: DiagnosticsConfig,
    ) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            values
                .get(name)
                .copied()
                .ok_or_else(|| ConfigError::Missing(name.to_string()))
        };
        let axis = |axis: Axis| -> Result<AxisParams, ConfigError> {
            let keys = axis.keys();
            Ok(AxisParams::new(
                get(keys.runtime)?,
                get(keys.diff_offset)?,
                get(keys.tsum_avg)?,
                get(keys.tsum_hw)?,
                get(keys.scale)?,
            ))
        };

        Self::new(
            axis(Axis::U)?,
            axis(Axis::V)?,
            axis(Axis::W)?,
            get(RADIUS_KEY)?,
            diagnostics,
        )
    }

    /// Builds a parameter set from loosely typed values, e.g. a mapping
    /// handed over by a scripting layer.
    ///
    /// Numeric fields must be [`ParameterValue::Number`]. The two diagnostics
    /// flags are optional; [`ParameterValue::Null`] counts as `false`. Extra
    /// keys are ignored.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for missing or non-numeric fields, malformed
    /// flags, or values failing validation.
    pub fn from_values(values: &HashMap<String, ParameterValue>) -> Result<Self, ConfigError> {
        let mut numbers = HashMap::new();
        for key in Self::required_keys() {
            let number = match values.get(key) {
                None => return Err(ConfigError::Missing(key.to_string())),
                Some(ParameterValue::Number(number)) => *number,
                Some(other) => {
                    return Err(ConfigError::NonNumeric {
                        name: key.to_string(),
                        found: other.to_string(),
                    })
                }
            };
            numbers.insert(key.to_string(), number);
        }

        let diagnostics = DiagnosticsConfig {
            tsum: flag(values, TSUM_DIAGNOSTICS_KEY)?,
            diff: flag(values, DIFF_DIAGNOSTICS_KEY)?,
        };

        Self::from_numbers(&numbers, diagnostics)
    }

    /// Builds a parameter set from a JSON object.
    ///
    /// Numeric fields must be JSON numbers. The two diagnostics flags are
    /// optional booleans and default to `false`.
    ///
    /// # Errors
    /// See [`Parameters::from_values`].
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ConfigError> {
        let values: HashMap<String, ParameterValue> = map
            .iter()
            .map(|(key, value)| (key.clone(), ParameterValue::from(value)))
            .collect();
        Self::from_values(&values)
    }

    /// Load parameters from a JSON string holding the flat parameter object.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the document is malformed or invalid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let document = parse_document(json)?;
        Self::from_value(&document)
    }

    /// Load parameters stored under `section` of a JSON document, e.g. one
    /// detector's block inside an algorithm configuration file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] if the section is absent, or any error
    /// of [`Parameters::from_map`].
    pub fn from_json_section(json: &str, section: &str) -> Result<Self, ConfigError> {
        let document = parse_document(json)?;
        let block = document
            .get(section)
            .ok_or_else(|| ConfigError::Missing(section.to_string()))?;
        Self::from_value(block)
    }

    /// Load parameters from a JSON file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, or any error of
    /// [`Parameters::from_json`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_json(&read_document(path.as_ref())?)
    }

    /// Load parameters from a named section of a JSON file.
    ///
    /// # Errors
    /// See [`Parameters::from_file`] and [`Parameters::from_json_section`].
    pub fn from_file_section<P: AsRef<Path>>(path: P, section: &str) -> Result<Self, ConfigError> {
        Self::from_json_section(&read_document(path.as_ref())?, section)
    }

    fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let map = value
            .as_object()
            .ok_or_else(|| ConfigError::Document("expected a JSON object".to_string()))?;
        Self::from_map(map)
    }

    /// Returns a copy with a different diagnostics selection.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Constants of the u wire pair.
    #[must_use]
    pub fn u(&self) -> &AxisParams {
        &self.u
    }

    /// Constants of the v wire pair.
    #[must_use]
    pub fn v(&self) -> &AxisParams {
        &self.v
    }

    /// Constants of the w wire pair.
    #[must_use]
    pub fn w(&self) -> &AxisParams {
        &self.w
    }

    /// Constants of the given wire pair.
    #[must_use]
    pub fn axis(&self, axis: Axis) -> &AxisParams {
        match axis {
            Axis::U => &self.u,
            Axis::V => &self.v,
            Axis::W => &self.w,
        }
    }

    /// Detector acceptance radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Diagnostics selection.
    #[must_use]
    pub fn diagnostics(&self) -> DiagnosticsConfig {
        self.diagnostics
    }
}

fn require_finite(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite {
            name: name.to_string(),
            value,
        })
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative {
            name: name.to_string(),
            value,
        })
    }
}

fn flag(values: &HashMap<String, ParameterValue>, key: &str) -> Result<bool, ConfigError> {
    match values.get(key) {
        None | Some(ParameterValue::Null) => Ok(false),
        Some(ParameterValue::Flag(enabled)) => Ok(*enabled),
        Some(other) => Err(ConfigError::InvalidFlag {
            name: key.to_string(),
            found: other.to_string(),
        }),
    }
}

fn parse_document(json: &str) -> Result<Value, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Document(e.to_string()))
}

fn read_document(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))
}
