//! Hexagonal-anode position reconstruction.
//!
//! Each accepted pair gives a corrected half-difference
//! `d = (end1 - end2 - offset) * f / 2`. The u and v layers, 60 degrees
//! apart, map onto Cartesian coordinates as
//!
//! ```text
//! x = d_u
//! y = (d_u - 2 d_v) / sqrt(3)
//! ```
//!
//! The w layer is not used for positions.

use crate::pairs::CandidatePair;
use hexanode_core::params::{AxisParams, Parameters};

/// `sqrt(3)`, the hexagonal projection factor.
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Calibrated half-difference of a wire pair.
#[inline]
#[must_use]
pub fn corrected_difference(axis: &AxisParams, pair: &CandidatePair) -> f64 {
    (pair.difference() - axis.diff_offset()) * axis.scale() / 2.0
}

/// Cartesian position from u and v half-differences.
#[inline]
#[must_use]
pub fn hex_position(d_u: f64, d_v: f64) -> (f64, f64) {
    (d_u, (d_u - 2.0 * d_v) / SQRT_3)
}

/// Turns u/v pair combinations into positions and applies the radius cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionReconstructor {
    u: AxisParams,
    v: AxisParams,
    radius: f64,
}

impl PositionReconstructor {
    /// Reconstructor for the u/v layers and acceptance radius of `params`.
    #[must_use]
    pub fn new(params: &Parameters) -> Self {
        Self {
            u: *params.u(),
            v: *params.v(),
            radius: params.radius(),
        }
    }

    /// Acceptance radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Position of one (u-pair, v-pair) combination.
    #[must_use]
    pub fn position(&self, u_pair: &CandidatePair, v_pair: &CandidatePair) -> (f64, f64) {
        hex_position(
            corrected_difference(&self.u, u_pair),
            corrected_difference(&self.v, v_pair),
        )
    }

    /// True if `(x, y)` lies strictly inside the detector radius.
    #[inline]
    #[must_use]
    pub fn within_radius(&self, x: f64, y: f64) -> bool {
        (x * x + y * y).sqrt() < self.radius
    }

    /// First in-radius position over the u x v product, in row-major order
    /// (u-pair major, v-pair minor).
    ///
    /// `u_pairs` is consumed lazily and enumeration stops at the first match,
    /// so an unexhausted pair iterator does no further work.
    pub fn first_within_radius<I>(&self, u_pairs: I, v_pairs: &[CandidatePair]) -> Option<(f64, f64)>
    where
        I: IntoIterator<Item = CandidatePair>,
    {
        if v_pairs.is_empty() {
            return None;
        }
        let v_diffs: Vec<f64> = v_pairs
            .iter()
            .map(|pair| corrected_difference(&self.v, pair))
            .collect();

        u_pairs.into_iter().find_map(|u_pair| {
            let d_u = corrected_difference(&self.u, &u_pair);
            v_diffs
                .iter()
                .map(|&d_v| hex_position(d_u, d_v))
                .find(|&(x, y)| self.within_radius(x, y))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use hexanode_core::params::DiagnosticsConfig;

    fn pair(end1: f64, end2: f64) -> CandidatePair {
        CandidatePair {
            end1_index: 0,
            end2_index: 0,
            end1,
            end2,
        }
    }

    fn reconstructor(radius: f64) -> PositionReconstructor {
        let u = AxisParams::new(100.0, 4.0, 50.0, 5.0, 1.0);
        let v = AxisParams::new(100.0, -6.0, 50.0, 5.0, 1.0);
        let w = AxisParams::new(100.0, 0.0, 50.0, 5.0, 1.0);
        let params = Parameters::new(u, v, w, radius, DiagnosticsConfig::none()).unwrap();
        PositionReconstructor::new(&params)
    }

    #[test]
    fn test_centre_hit() {
        let (x, y) = reconstructor(50.0).position(&pair(1027.0, 1023.0), &pair(1022.0, 1028.0));
        assert_abs_diff_eq!(x, 0.0);
        assert_abs_diff_eq!(y, 0.0);
    }

    #[test]
    fn test_scale_factor_applies() {
        let axis = AxisParams::new(100.0, 4.0, 50.0, 5.0, 0.5);
        // (34 - 4) * 0.5 / 2
        assert_abs_diff_eq!(corrected_difference(&axis, &pair(1042.0, 1008.0)), 7.5);
    }

    #[test]
    fn test_hex_projection() {
        let (x, y) = hex_position(2.0, -1.0);
        assert_abs_diff_eq!(x, 2.0);
        assert_abs_diff_eq!(y, 4.0 / SQRT_3, epsilon = 1e-12);
        assert_abs_diff_eq!(SQRT_3 * SQRT_3, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_radius_cut_is_strict() {
        let reco = reconstructor(5.0);
        assert!(reco.within_radius(3.0, 3.9));
        assert!(!reco.within_radius(3.0, 4.0));
        assert!(!reco.within_radius(f64::NAN, 0.0));
    }

    #[test]
    fn test_first_within_radius_is_row_major() {
        let reco = reconstructor(50.0);
        // d_u = 13 for the first u pair, 0 for the second.
        let u_pairs = [pair(1040.0, 1010.0), pair(1027.0, 1023.0)];
        let v_pairs = [pair(1022.0, 1028.0)];
        let (x, _) = reco.first_within_radius(u_pairs, &v_pairs).unwrap();
        assert_abs_diff_eq!(x, 13.0);

        // A tighter radius rejects the first row and falls through.
        let (x, y) = reconstructor(10.0)
            .first_within_radius(u_pairs, &v_pairs)
            .unwrap();
        assert_abs_diff_eq!(x, 0.0);
        assert_abs_diff_eq!(y, 0.0);
    }

    #[test]
    fn test_no_candidates() {
        let reco = reconstructor(50.0);
        assert_eq!(reco.first_within_radius([pair(1027.0, 1023.0)], &[]), None);
        assert_eq!(reco.first_within_radius(Vec::new(), &[pair(1022.0, 1028.0)]), None);
        assert_eq!(
            reconstructor(1.0).first_within_radius([pair(1040.0, 1010.0)], &[pair(1022.0, 1028.0)]),
            None
        );
    }
}
