//! hexanode-python: PyO3 Python bindings for hexanode.
#![allow(
    clippy::doc_markdown,
    clippy::needless_pass_by_value,
    clippy::uninlined_format_args,
    clippy::elidable_lifetime_names,
    clippy::too_many_arguments
)]
//!
//! This crate provides Python bindings using PyO3 and numpy
//! for efficient data exchange with Python.

use hexanode_algorithms::{process_shots_parallel, HitFinder};
use hexanode_core::params::{Axis, ParameterValue, Parameters};
use hexanode_core::{AxisSeries, ConfigError, HitList, PulseLists};
use hexanode_io::ShotFileReader;
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict};
use std::collections::HashMap;

fn io_error(context: &str, err: impl std::fmt::Display) -> PyErr {
    pyo3::exceptions::PyIOError::new_err(format!("{context}: {err}"))
}

fn value_error(context: &str, err: impl std::fmt::Display) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(format!("{context}: {err}"))
}

fn config_error(context: &str, err: ConfigError) -> PyErr {
    match err {
        ConfigError::Io(_) => io_error(context, err),
        other => value_error(context, other),
    }
}

/// Python wrapper for detector Parameters.
#[pyclass(name = "Parameters")]
#[derive(Clone)]
pub struct PyParameters {
    inner: Parameters,
}

#[pymethods]
impl PyParameters {
    /// Builds parameters from a mapping keyed like the configuration file.
    ///
    /// Flags given as keyword arguments are OR-ed with the mapping's flags.
    #[new]
    #[pyo3(signature = (values, emit_tsum_diagnostics=false, emit_diff_diagnostics=false))]
    fn new(
        values: &Bound<'_, PyDict>,
        emit_tsum_diagnostics: bool,
        emit_diff_diagnostics: bool,
    ) -> PyResult<Self> {
        let mut entries = HashMap::with_capacity(values.len());
        for (key, value) in values.iter() {
            let key: String = key
                .extract()
                .map_err(|_| value_error("Parameters", format!("non-string key {key}")))?;
            entries.insert(key, parameter_value(&value)?);
        }
        let parameters =
            Parameters::from_values(&entries).map_err(|e| config_error("Parameters", e))?;
        let configured = parameters.diagnostics();
        let diagnostics = configured
            .with_tsum(configured.tsum || emit_tsum_diagnostics)
            .with_diff(configured.diff || emit_diff_diagnostics);
        Ok(Self {
            inner: parameters.with_diagnostics(diagnostics),
        })
    }

    #[staticmethod]
    #[pyo3(signature = (path, section=None))]
    fn from_file(path: &str, section: Option<&str>) -> PyResult<Self> {
        let params = match section {
            Some(section) => Parameters::from_file_section(path, section),
            None => Parameters::from_file(path),
        };
        params
            .map(|inner| Self { inner })
            .map_err(|e| config_error(&format!("Parameters.from_file({path})"), e))
    }

    #[staticmethod]
    #[pyo3(signature = (json, section=None))]
    fn from_json(json: &str, section: Option<&str>) -> PyResult<Self> {
        let params = match section {
            Some(section) => Parameters::from_json_section(json, section),
            None => Parameters::from_json(json),
        };
        params
            .map(|inner| Self { inner })
            .map_err(|e| value_error("Parameters.from_json", e))
    }

    /// Names of the numeric parameters every configuration must define.
    #[staticmethod]
    fn required_keys() -> Vec<&'static str> {
        Parameters::required_keys().collect()
    }

    #[getter]
    fn radius(&self) -> f64 {
        self.inner.radius()
    }

    #[getter]
    fn emit_tsum_diagnostics(&self) -> bool {
        self.inner.diagnostics().tsum
    }

    #[getter]
    fn emit_diff_diagnostics(&self) -> bool {
        self.inner.diagnostics().diff
    }

    /// Axis parameters as a dict keyed like the configuration file.
    fn axis<'py>(&self, py: Python<'py>, axis: &str) -> PyResult<Bound<'py, PyDict>> {
        let axis = match axis {
            "u" => Axis::U,
            "v" => Axis::V,
            "w" => Axis::W,
            other => {
                return Err(value_error(
                    "Parameters.axis",
                    format!("unknown axis {other:?}, expected 'u', 'v' or 'w'"),
                ))
            }
        };
        let keys = axis.keys();
        let params = self.inner.axis(axis);
        let dict = PyDict::new(py);
        dict.set_item(keys.runtime, params.runtime())?;
        dict.set_item(keys.diff_offset, params.diff_offset())?;
        dict.set_item(keys.tsum_avg, params.tsum_avg())?;
        dict.set_item(keys.tsum_hw, params.tsum_hw())?;
        dict.set_item(keys.scale, params.scale())?;
        Ok(dict)
    }

    fn __repr__(&self) -> String {
        let diagnostics = self.inner.diagnostics();
        format!(
            "Parameters(rMCP={}, emit_tsum_diagnostics={}, emit_diff_diagnostics={})",
            self.inner.radius(),
            diagnostics.tsum,
            diagnostics.diff
        )
    }
}

// `bool` is checked first since Python booleans also extract as floats.
fn parameter_value(value: &Bound<'_, PyAny>) -> PyResult<ParameterValue> {
    if value.is_none() {
        return Ok(ParameterValue::Null);
    }
    if let Ok(flag) = value.downcast::<PyBool>() {
        return Ok(ParameterValue::Flag(flag.is_true()));
    }
    match value.extract::<f64>() {
        Ok(number) => Ok(ParameterValue::Number(number)),
        Err(_) => Ok(ParameterValue::Other(value.repr()?.to_string())),
    }
}

/// Python wrapper for HitFinder.
#[pyclass(name = "HitFinder")]
pub struct PyHitFinder {
    inner: HitFinder,
}

#[pymethods]
impl PyHitFinder {
    #[new]
    fn new(parameters: PyParameters) -> Self {
        Self {
            inner: HitFinder::new(parameters.inner),
        }
    }

    #[getter]
    fn parameters(&self) -> PyParameters {
        PyParameters {
            inner: self.inner.params().clone(),
        }
    }

    /// Reconstruct the hits of one shot from seven float64 arrays.
    fn find_hits<'py>(
        &self,
        py: Python<'py>,
        mcp: PyReadonlyArray1<f64>,
        u1: PyReadonlyArray1<f64>,
        u2: PyReadonlyArray1<f64>,
        v1: PyReadonlyArray1<f64>,
        v2: PyReadonlyArray1<f64>,
        w1: PyReadonlyArray1<f64>,
        w2: PyReadonlyArray1<f64>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let context = "HitFinder.find_hits";
        let pulses = PulseLists {
            mcp: mcp.as_slice().map_err(|e| value_error(context, e))?,
            u1: u1.as_slice().map_err(|e| value_error(context, e))?,
            u2: u2.as_slice().map_err(|e| value_error(context, e))?,
            v1: v1.as_slice().map_err(|e| value_error(context, e))?,
            v2: v2.as_slice().map_err(|e| value_error(context, e))?,
            w1: w1.as_slice().map_err(|e| value_error(context, e))?,
            w2: w2.as_slice().map_err(|e| value_error(context, e))?,
        };
        hits_dict(py, &self.inner.find_hits(pulses))
    }

    /// Reconstruct the hits of one shot from a packed value array and the
    /// seven per-channel counts.
    fn find_hits_packed<'py>(
        &self,
        py: Python<'py>,
        values: PyReadonlyArray1<f64>,
        counts: PyReadonlyArray1<i64>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let context = "HitFinder.find_hits_packed";
        let values = values.as_slice().map_err(|e| value_error(context, e))?;
        let counts = counts.as_slice().map_err(|e| value_error(context, e))?;
        let hits = self
            .inner
            .find_hits_packed(values, counts)
            .map_err(|e| value_error(context, e))?;
        hits_dict(py, &hits)
    }

    /// Process every shot of a JSON Lines file; malformed shots yield empty
    /// results.
    fn process_file<'py>(&self, py: Python<'py>, path: &str) -> PyResult<Vec<Bound<'py, PyDict>>> {
        let context = format!("HitFinder.process_file({path})");
        let finder = &self.inner;
        let processed = py.allow_threads(|| -> hexanode_io::Result<_> {
            let mut shots = Vec::new();
            for shot in ShotFileReader::open(path)? {
                match shot {
                    Err(err) if !err.is_per_shot() => return Err(err),
                    shot => shots.push(shot),
                }
            }
            Ok(process_shots_parallel(finder, &shots))
        });
        let processed = processed.map_err(|e| io_error(&context, e))?;
        processed.hits.iter().map(|hits| hits_dict(py, hits)).collect()
    }

    fn __repr__(&self) -> String {
        format!("HitFinder(rMCP={})", self.inner.params().radius())
    }
}

fn hits_dict<'py>(py: Python<'py>, hits: &HitList) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("x", PyArray1::from_slice(py, hits.x()))?;
    dict.set_item("y", PyArray1::from_slice(py, hits.y()))?;
    dict.set_item("t", PyArray1::from_slice(py, hits.t()))?;
    dict.set_item("n", hits.n())?;
    if let Some(tsum) = &hits.tsum {
        set_series(py, &dict, "tsum", tsum)?;
    }
    if let Some(diff) = &hits.diff {
        set_series(py, &dict, "diff", diff)?;
    }
    Ok(dict)
}

fn set_series<'py>(
    py: Python<'py>,
    dict: &Bound<'py, PyDict>,
    kind: &str,
    series: &AxisSeries,
) -> PyResult<()> {
    for axis in Axis::ALL {
        let key = format!("{kind}_{}", axis.name());
        dict.set_item(key, PyArray1::from_slice(py, series.get(axis)))?;
    }
    Ok(())
}

/// Python module for hexanode.
#[pymodule]
fn hexanode(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyParameters>()?;
    m.add_class::<PyHitFinder>()?;
    Ok(())
}
