//! Reconstructed hit type.

use serde::{Deserialize, Serialize};

/// One reconstructed particle impact.
///
/// `t` is exactly the MCP pulse time that produced the hit; `x` and `y` are
/// anode coordinates in the units set by the axis scale factors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Arrival time (the originating MCP pulse).
    pub t: f64,
}

impl Hit {
    /// Creates a new hit.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, t: f64) -> Self {
        Self { x, y, t }
    }

    /// Distance from the detector centre.
    #[inline]
    #[must_use]
    pub fn radius(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}
