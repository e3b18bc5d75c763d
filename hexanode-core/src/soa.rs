//! Structure of Arrays (`SoA`) hit lists.
//!
//! A [`HitList`] stores the hits of one shot in parallel columns (`x`, `y`,
//! `t`), the layout downstream histogramming consumes. Optional diagnostic
//! series ride along in the same value.

use crate::hit::Hit;
use crate::params::{Axis, DiagnosticsConfig};
use serde::{Deserialize, Serialize};

/// One diagnostic value series per delay-line axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisSeries {
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    pub w: Vec<f64>,
}

impl AxisSeries {
    /// Returns the series of one axis.
    #[must_use]
    pub fn get(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::U => &self.u,
            Axis::V => &self.v,
            Axis::W => &self.w,
        }
    }

    /// Appends a value to one axis.
    pub fn push(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::U => self.u.push(value),
            Axis::V => self.v.push(value),
            Axis::W => self.w.push(value),
        }
    }

    /// Appends all values of another series.
    pub fn append(&mut self, other: &AxisSeries) {
        self.u.extend_from_slice(&other.u);
        self.v.extend_from_slice(&other.v);
        self.w.extend_from_slice(&other.w);
    }
}

/// Hits of one shot in Structure of Arrays (`SoA`) format.
///
/// The three columns always have equal length and follow the order of the
/// originating MCP pulses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitList {
    x: Vec<f64>,
    y: Vec<f64>,
    t: Vec<f64>,
    /// Time-sum residual of every accepted pair, when enabled.
    pub tsum: Option<AxisSeries>,
    /// Raw end-to-end difference of every accepted pair, when enabled.
    pub diff: Option<AxisSeries>,
}

impl HitList {
    /// Creates an empty list without diagnostics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list carrying the diagnostic series `diagnostics`
    /// selects.
    #[must_use]
    pub fn with_diagnostics(diagnostics: DiagnosticsConfig) -> Self {
        Self {
            tsum: diagnostics.tsum.then(AxisSeries::default),
            diff: diagnostics.diff.then(AxisSeries::default),
            ..Self::default()
        }
    }

    /// Creates an empty list with room for `capacity` hits.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            t: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Number of hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Returns true if no hit was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Hit count, as published under `hit:n`.
    #[must_use]
    pub fn n(&self) -> usize {
        self.len()
    }

    /// X column.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Y column.
    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Arrival time column.
    #[must_use]
    pub fn t(&self) -> &[f64] {
        &self.t
    }

    /// Returns the hit at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Hit> {
        Some(Hit::new(
            *self.x.get(index)?,
            *self.y.get(index)?,
            *self.t.get(index)?,
        ))
    }

    /// Iterates over the hits in order.
    pub fn iter(&self) -> impl Iterator<Item = Hit> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.t)
            .map(|((&x, &y), &t)| Hit::new(x, y, t))
    }

    /// Pushes a single hit.
    pub fn push(&mut self, hit: Hit) {
        self.x.push(hit.x);
        self.y.push(hit.y);
        self.t.push(hit.t);
    }

    /// Appends all hits and diagnostics from another list.
    ///
    /// Diagnostic series are merged only where both lists carry them.
    pub fn append(&mut self, other: &HitList) {
        self.x.extend_from_slice(&other.x);
        self.y.extend_from_slice(&other.y);
        self.t.extend_from_slice(&other.t);
        if let (Some(mine), Some(theirs)) = (self.tsum.as_mut(), other.tsum.as_ref()) {
            mine.append(theirs);
        }
        if let (Some(mine), Some(theirs)) = (self.diff.as_mut(), other.diff.as_ref()) {
            mine.append(theirs);
        }
    }

    /// Hit columns keyed the way aggregation layers address them, e.g.
    /// `hit:x`, `hit:y`, `hit:t` for `prefix = "hit"`.
    #[must_use]
    pub fn keyed_columns(&self, prefix: &str) -> [(String, &[f64]); 3] {
        [
            (format!("{prefix}:x"), self.x.as_slice()),
            (format!("{prefix}:y"), self.y.as_slice()),
            (format!("{prefix}:t"), self.t.as_slice()),
        ]
    }

    /// Hit count under the same prefix, e.g. `hit:n`.
    #[must_use]
    pub fn keyed_count(&self, prefix: &str) -> (String, usize) {
        (format!("{prefix}:n"), self.n())
    }
}

impl FromIterator<Hit> for HitList {
    fn from_iter<I: IntoIterator<Item = Hit>>(iter: I) -> Self {
        let mut list = HitList::new();
        for hit in iter {
            list.push(hit);
        }
        list
    }
}
