/// Integrationstests: kompletter Lauf von Rohpunkten bis zur Validierung
use std::f64::consts::{FRAC_PI_2, TAU};
use std::path::Path;

use approx::assert_relative_eq;
use centerline_generator::core::heading::normalize_angle;
use centerline_generator::core::{calc_spline_lengths, interp_splines};
use centerline_generator::shared::{RegularizationOptions, StepsizeOptions};
use centerline_generator::{
    load_raw_track, run_pipeline, GeometryError, PipelineOptions, TrackError, TrackPoint,
    TrajectorySample, ValidationWarning,
};
use glam::DVec2;

fn circle_track(radius: f64, count: usize, width: f64) -> Vec<TrackPoint> {
    (0..count)
        .map(|i| {
            let phi = TAU * i as f64 / count as f64;
            TrackPoint::new(radius * phi.cos(), radius * phi.sin(), width, width)
        })
        .collect()
}

fn square_options() -> PipelineOptions {
    PipelineOptions {
        stepsize: StepsizeOptions {
            prep: Some(1.0),
            reg: 1.0,
            interp_after_opt: 1.0,
        },
        regularization: RegularizationOptions {
            lambda: 0.0,
            knot_count: None,
        },
        ..Default::default()
    }
}

/// Kurswinkeländerung von Punkt `from` bis `to` (zyklisch, vorwärts).
fn turning_between(trajectory: &[TrajectorySample], from: usize, to: usize) -> f64 {
    let n = trajectory.len();
    let mut total = 0.0;
    let mut i = from % n;
    while i != to % n {
        let j = (i + 1) % n;
        total += normalize_angle(trajectory[j].heading - trajectory[i].heading);
        i = j;
    }
    total
}

fn nearest_sample(trajectory: &[TrajectorySample], target: DVec2) -> usize {
    trajectory
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.position
                .distance(target)
                .total_cmp(&b.position.distance(target))
        })
        .map(|(i, _)| i)
        .expect("Trajektorie darf nicht leer sein")
}

#[test]
fn test_circle_curvature_matches_inverse_radius() {
    let radius = 50.0;
    let raw = circle_track(radius, 400, 5.0);
    let output = run_pipeline(&raw, &PipelineOptions::default()).expect("Pipeline sollte laufen");

    assert!(!output.trajectory.is_empty());
    for sample in &output.trajectory {
        let kappa = sample.curvature.expect("Kreis hat überall definierte Krümmung");
        assert!(
            (kappa - 1.0 / radius).abs() < 1e-3,
            "κ = {kappa} bei s = {}",
            sample.s
        );
    }
    assert_relative_eq!(output.total_length(), TAU * radius, max_relative = 5e-3);
}

#[test]
fn test_circle_heading_increments_are_constant() {
    let raw = circle_track(50.0, 400, 5.0);
    let output = run_pipeline(&raw, &PipelineOptions::default()).expect("Pipeline sollte laufen");
    let traj = &output.trajectory;

    let increments: Vec<f64> = traj
        .windows(2)
        .map(|w| normalize_angle(w[1].heading - w[0].heading))
        .collect();
    let mean = increments.iter().sum::<f64>() / increments.len() as f64;
    assert!(mean > 0.0, "Kreis gegen den Uhrzeigersinn dreht nach links");
    for inc in &increments {
        assert!((inc - mean).abs() < 0.05 * mean, "Inkrement {inc}, Mittel {mean}");
    }
}

#[test]
fn test_sample_spacing_within_five_percent() {
    let raw = circle_track(50.0, 400, 5.0);
    let options = PipelineOptions::default();
    let output = run_pipeline(&raw, &options).expect("Pipeline sollte laufen");
    let step = options.stepsize.interp_after_opt;

    for w in output.trajectory.windows(2) {
        let ds = w[1].s - w[0].s;
        assert!(ds > 0.0, "s muss streng steigen");
        assert!((ds - step).abs() < 0.05 * step, "ds = {ds}");
        let chord = w[0].position.distance(w[1].position);
        assert!((chord - step).abs() < 0.05 * step, "Sehne = {chord}");
    }
}

#[test]
fn test_heading_difference_matches_curvature_times_spacing() {
    let raw = circle_track(50.0, 400, 5.0);
    let output = run_pipeline(&raw, &PipelineOptions::default()).expect("Pipeline sollte laufen");

    for w in output.trajectory.windows(2) {
        let dh = normalize_angle(w[1].heading - w[0].heading);
        let kappa = 0.5 * (w[0].curvature.unwrap_or(0.0) + w[1].curvature.unwrap_or(0.0));
        let expected = kappa * (w[1].s - w[0].s);
        assert!(
            (dh - expected).abs() < 0.05 * expected.abs(),
            "Δψ = {dh}, κ·Δs = {expected}"
        );
    }
}

#[test]
fn test_segment_lengths_sum_to_last_station() {
    let raw = circle_track(30.0, 120, 4.0);
    let output = run_pipeline(&raw, &PipelineOptions::default()).expect("Pipeline sollte laufen");

    let lengths = calc_spline_lengths(&output.prepared.segments);
    let path = interp_splines(&lengths, &output.prepared.segments, 2.0, true)
        .expect("Abtastung sollte klappen");

    let last_s = *path.s_values.last().expect("mindestens ein Punkt");
    assert_relative_eq!(last_s, lengths.iter().sum::<f64>(), max_relative = 1e-12);
    let first = path.points[0];
    let last = *path.points.last().expect("mindestens ein Punkt");
    assert!(first.distance(last) < 1e-6, "Schlusspunkt fällt auf den Start");
}

#[test]
fn test_square_track_sample_count_and_range() {
    let raw = load_raw_track(Path::new("tests/fixtures/square_track.csv"))
        .expect("Fixture sollte lesbar sein");
    let output = run_pipeline(&raw, &square_options()).expect("Pipeline sollte laufen");
    let traj = &output.trajectory;

    assert!(
        (78..=81).contains(&traj.len()),
        "erwartet ≈ 80 Punkte, erhalten {}",
        traj.len()
    );
    assert_eq!(traj[0].s, 0.0);
    let total = output.total_length();
    assert!((total - 80.0).abs() < 1.0, "Gesamtlänge {total}");
    assert!(traj.last().map(|p| p.s).unwrap_or(f64::INFINITY) < total);
}

#[test]
fn test_four_corner_square_matches_densified_fixture() {
    let raw = load_raw_track(Path::new("tests/fixtures/square_corners.csv"))
        .expect("Fixture sollte lesbar sein");
    assert_eq!(raw.len(), 4);
    let output = run_pipeline(&raw, &square_options()).expect("Pipeline sollte laufen");
    let traj = &output.trajectory;
    let n = traj.len();

    assert!((78..=81).contains(&n), "erwartet ≈ 80 Punkte, erhalten {n}");
    assert_eq!(traj[0].s, 0.0);
    let total = output.total_length();
    assert!((total - 80.0).abs() < 1.0, "Gesamtlänge {total}");

    let turning = turning_between(traj, 0, n - 1)
        + normalize_angle(traj[0].heading - traj[n - 1].heading);
    assert_relative_eq!(turning, TAU, epsilon = 1e-9);
}

#[test]
fn test_tiny_output_stepsize_fails_without_panic() {
    let raw = load_raw_track(Path::new("tests/fixtures/square_corners.csv"))
        .expect("Fixture sollte lesbar sein");
    let mut options = square_options();
    options.stepsize.interp_after_opt = 1e-300;
    assert!(options.validate().is_ok());

    let result = run_pipeline(&raw, &options);
    assert!(matches!(
        result,
        Err(TrackError::Geometry(GeometryError::TooManySamples { .. }))
    ));
}

#[test]
fn test_square_track_turns_once_around() {
    let raw = load_raw_track(Path::new("tests/fixtures/square_track.csv"))
        .expect("Fixture sollte lesbar sein");
    let output = run_pipeline(&raw, &square_options()).expect("Pipeline sollte laufen");
    let n = output.trajectory.len();

    let total = turning_between(&output.trajectory, 0, n - 1)
        + normalize_angle(output.trajectory[0].heading - output.trajectory[n - 1].heading);
    assert_relative_eq!(total, TAU, epsilon = 1e-9);
}

#[test]
fn test_square_track_corners_turn_a_quarter_each() {
    let raw = load_raw_track(Path::new("tests/fixtures/square_track.csv"))
        .expect("Fixture sollte lesbar sein");
    let output = run_pipeline(&raw, &square_options()).expect("Pipeline sollte laufen");
    let traj = &output.trajectory;
    let n = traj.len();

    let corners = [
        DVec2::new(20.0, 0.0),
        DVec2::new(20.0, 20.0),
        DVec2::new(0.0, 20.0),
        DVec2::new(0.0, 0.0),
    ];
    for corner in corners {
        let c = nearest_sample(traj, corner);
        let turn = turning_between(traj, c + n - 5, c + 5);
        assert!(
            (turn - FRAC_PI_2).abs() < 0.05,
            "Ecke {corner}: Drehung {turn}"
        );

        let peak = (0..5)
            .map(|d| (c + n - 2 + d) % n)
            .filter_map(|i| traj[i].curvature)
            .fold(0.0_f64, |acc, k| acc.max(k.abs()));
        assert!(peak > 0.3, "Ecke {corner}: Spitze {peak}");
    }
}

#[test]
fn test_square_track_straights_have_near_zero_curvature() {
    let raw = load_raw_track(Path::new("tests/fixtures/square_track.csv"))
        .expect("Fixture sollte lesbar sein");
    let output = run_pipeline(&raw, &square_options()).expect("Pipeline sollte laufen");

    let corners = [
        DVec2::new(0.0, 0.0),
        DVec2::new(20.0, 0.0),
        DVec2::new(20.0, 20.0),
        DVec2::new(0.0, 20.0),
    ];
    let straight: Vec<&TrajectorySample> = output
        .trajectory
        .iter()
        .filter(|p| corners.iter().all(|c| c.distance(p.position) >= 5.0))
        .collect();

    assert!(!straight.is_empty());
    for sample in straight {
        let kappa = sample.curvature.expect("Gerade hat definierte Krümmung");
        assert!(kappa.abs() < 0.02, "κ = {kappa} bei {}", sample.position);
    }
}

#[test]
fn test_square_track_exceeds_curvature_limit() {
    let raw = load_raw_track(Path::new("tests/fixtures/square_track.csv"))
        .expect("Fixture sollte lesbar sein");
    let output = run_pipeline(&raw, &square_options()).expect("Pipeline sollte laufen");

    assert!(output
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::CurvatureLimitExceeded { .. })));
}

#[test]
fn test_wide_circle_has_no_validation_warnings() {
    let raw = circle_track(30.0, 120, 4.0);
    let output = run_pipeline(&raw, &PipelineOptions::default()).expect("Pipeline sollte laufen");

    assert!(
        output.validation.warnings.is_empty(),
        "unerwartete Warnungen: {:?}",
        output.validation.warnings
    );
    assert!(output.validation.min_boundary_distance > 1.0);
}

#[test]
fn test_narrow_track_is_reported() {
    let raw = circle_track(30.0, 120, 0.8);
    let output = run_pipeline(&raw, &PipelineOptions::default()).expect("Pipeline sollte laufen");

    assert!(output
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::NarrowTrack { .. })));
}

#[test]
fn test_flip_reverses_driving_direction() {
    let raw = circle_track(30.0, 120, 4.0);
    let mut options = PipelineOptions::default();
    options.import.flip = true;
    let output = run_pipeline(&raw, &options).expect("Pipeline sollte laufen");

    for sample in &output.trajectory {
        assert!(sample.curvature.unwrap_or(0.0) < 0.0, "Rechtskurve erwartet");
    }
}

#[test]
fn test_too_few_points_is_geometry_error() {
    let raw = vec![
        TrackPoint::new(0.0, 0.0, 1.0, 1.0),
        TrackPoint::new(1.0, 0.0, 1.0, 1.0),
        TrackPoint::new(0.0, 1.0, 1.0, 1.0),
    ];
    let mut options = PipelineOptions::default();
    options.stepsize.prep = None;

    let result = run_pipeline(&raw, &options);
    assert!(matches!(
        result,
        Err(TrackError::Geometry(GeometryError::TooFewPoints { found: 3 }))
    ));
}

#[test]
fn test_invalid_options_fail_before_geometry() {
    let mut options = PipelineOptions::default();
    options.stepsize.interp_after_opt = 0.0;

    // Leere Strecke: ohne Vorabprüfung käme ein Geometriefehler
    let result = run_pipeline(&[], &options);
    assert!(matches!(result, Err(TrackError::Config(_))));
}

#[test]
fn test_missing_track_file_is_io_error() {
    let result = load_raw_track(Path::new("tests/fixtures/does_not_exist.csv"));
    assert!(matches!(result, Err(TrackError::Io { .. })));
}
