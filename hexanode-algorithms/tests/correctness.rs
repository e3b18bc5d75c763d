#![allow(clippy::uninlined_format_args, clippy::float_cmp)]
use approx::assert_abs_diff_eq;
use hexanode_algorithms::{HitFinder, SQRT_3};
use hexanode_core::params::{Axis, AxisParams, DiagnosticsConfig, Parameters};
use hexanode_core::ShotPulses;

fn parameters(radius: f64, diagnostics: DiagnosticsConfig) -> Parameters {
    Parameters::new(
        AxisParams::new(100.0, 4.0, 50.0, 5.0, 1.0),
        AxisParams::new(100.0, -6.0, 50.0, 5.0, 1.0),
        AxisParams::new(100.0, 2.0, 50.0, 5.0, 1.0),
        radius,
        diagnostics,
    )
    .unwrap()
}

fn finder() -> HitFinder {
    HitFinder::new(parameters(50.0, DiagnosticsConfig::none()))
}

fn shot(mcp: &[f64], u: (&[f64], &[f64]), v: (&[f64], &[f64])) -> ShotPulses {
    ShotPulses {
        mcp: mcp.to_vec(),
        u1: u.0.to_vec(),
        u2: u.1.to_vec(),
        v1: v.0.to_vec(),
        v2: v.1.to_vec(),
        w1: Vec::new(),
        w2: Vec::new(),
    }
}

#[test]
fn test_single_clean_hit_at_centre() {
    let pulses = shot(&[1000.0], (&[1027.0], &[1023.0]), (&[1022.0], &[1028.0]));
    let hits = finder().find_hits(pulses.lists());
    assert_eq!(hits.n(), 1, "Found {} hits, expected 1", hits.n());
    assert_abs_diff_eq!(hits.x()[0], 0.0);
    assert_abs_diff_eq!(hits.y()[0], 0.0);
    assert_eq!(hits.t()[0], 1000.0);
}

#[test]
fn test_pulse_without_pairs_produces_no_hit() {
    let pulses = shot(
        &[1000.0, 3000.0],
        (&[1027.0], &[1023.0]),
        (&[1022.0], &[1028.0]),
    );
    let hits = finder().find_hits(pulses.lists());
    assert_eq!(hits.n(), 1);
    assert_eq!(hits.t(), &[1000.0]);
}

#[test]
fn test_pulse_outside_radius_produces_no_hit() {
    // Second pulse pairs cleanly but lands at d_u = 18.
    let pulses = shot(
        &[1000.0, 3000.0],
        (&[1027.0, 3045.0], &[1023.0, 3005.0]),
        (&[1022.0, 3022.0], &[1028.0, 3028.0]),
    );
    let hits = HitFinder::new(parameters(10.0, DiagnosticsConfig::none())).find_hits(pulses.lists());
    assert_eq!(hits.t(), &[1000.0]);

    let hits = finder().find_hits(pulses.lists());
    assert_eq!(hits.t(), &[1000.0, 3000.0]);
    assert_abs_diff_eq!(hits.x()[1], 18.0);
    assert_abs_diff_eq!(hits.y()[1], 18.0 / SQRT_3, epsilon = 1e-12);
}

#[test]
fn test_empty_wire_lists() {
    let pulses = shot(&[5.0], (&[], &[]), (&[], &[]));
    let hits = finder().find_hits(pulses.lists());
    assert_eq!(hits.n(), 0);
    assert!(hits.x().is_empty());
    assert!(hits.y().is_empty());
    assert!(hits.t().is_empty());
}

#[test]
fn test_ambiguous_pairs_take_first_in_row_major_order() {
    // Both (1027, 1023) and (1040, 1010) pass the time-sum gate.
    let forward = shot(
        &[1000.0],
        (&[1027.0, 1040.0], &[1023.0, 1010.0]),
        (&[1022.0], &[1028.0]),
    );
    let hits = finder().find_hits(forward.lists());
    assert_eq!(hits.n(), 1);
    assert_abs_diff_eq!(hits.x()[0], 0.0);
    assert_abs_diff_eq!(hits.y()[0], 0.0);

    let reversed = shot(
        &[1000.0],
        (&[1040.0, 1027.0], &[1010.0, 1023.0]),
        (&[1022.0], &[1028.0]),
    );
    let hits = finder().find_hits(reversed.lists());
    assert_eq!(hits.n(), 1);
    assert_abs_diff_eq!(hits.x()[0], 13.0);
    assert_abs_diff_eq!(hits.y()[0], 13.0 / SQRT_3, epsilon = 1e-12);
}

#[test]
fn test_time_sum_gate_boundaries_reject() {
    for (u1, u2) in [(1030.0, 1025.0), (1020.0, 1025.0)] {
        let pulses = shot(&[1000.0], (&[u1], &[u2]), (&[1022.0], &[1028.0]));
        assert_eq!(
            finder().find_hits(pulses.lists()).n(),
            0,
            "time-sum {} should be rejected",
            u1 + u2 - 2000.0
        );
    }
}

#[test]
fn test_nan_pulses_are_ignored() {
    let pulses = shot(
        &[1000.0, f64::NAN],
        (&[f64::NAN, 1027.0], &[1023.0, f64::NAN]),
        (&[1022.0], &[1028.0]),
    );
    let hits = finder().find_hits(pulses.lists());
    assert_eq!(hits.t(), &[1000.0]);
}

#[test]
fn test_diagnostics_cover_all_accepted_pairs() {
    let diagnostics = DiagnosticsConfig::none().with_tsum(true).with_diff(true);
    let mut pulses = shot(
        &[1000.0],
        (&[1027.0, 1040.0], &[1023.0, 1010.0]),
        (&[1022.0], &[1028.0]),
    );
    pulses.w1 = vec![1026.0];
    pulses.w2 = vec![1024.0];

    let hits = HitFinder::new(parameters(50.0, diagnostics)).find_hits(pulses.lists());
    assert_eq!(hits.n(), 1);

    let tsum = hits.tsum.as_ref().unwrap();
    assert_eq!(tsum.get(Axis::U), &[0.0, 0.0]);
    assert_eq!(tsum.get(Axis::V), &[0.0]);
    assert_eq!(tsum.get(Axis::W), &[0.0]);

    let diff = hits.diff.as_ref().unwrap();
    assert_eq!(diff.get(Axis::U), &[4.0, 30.0]);
    assert_eq!(diff.get(Axis::V), &[-6.0]);
    assert_eq!(diff.get(Axis::W), &[2.0]);
}

#[test]
fn test_diagnostics_recorded_without_hit() {
    // u pairs exist but v has none: series are filled, no hit is emitted.
    let pulses = shot(&[1000.0], (&[1027.0], &[1023.0]), (&[], &[]));
    let hits = HitFinder::new(parameters(50.0, DiagnosticsConfig::none().with_tsum(true)))
        .find_hits(pulses.lists());
    assert_eq!(hits.n(), 0);
    assert_eq!(hits.tsum.as_ref().unwrap().get(Axis::U), &[0.0]);
    assert!(hits.diff.is_none());
}
