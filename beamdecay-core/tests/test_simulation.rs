//! Population runs: counts, retention bound and per-event invariants

use beamdecay_core::tests::test_helpers::{events_consistent, reference_config, run_seeded};
use beamdecay_core::{
    run_simulation, run_simulation_chunked, run_with_source, ParticleKind, SimulationSettings,
    Verdict,
};
use rand::rngs::mock::StepRng;
use std::ops::ControlFlow;

#[test]
fn test_zero_events_produces_empty_result() {
    let result = run_seeded(reference_config(ParticleKind::Pion, 0), 1).expect("zero events is valid");

    assert_eq!(result.stats.total, 0);
    assert_eq!(result.stats.survived_count, 0);
    assert_eq!(result.stats.decayed_count, 0);
    assert!(result.events.is_empty());
    assert_eq!(result.consistency.verdict, Verdict::Undetermined);
    assert_eq!(result.curve.len(), 50, "theory curve does not depend on events");
}

#[test]
fn test_counts_cover_full_population() {
    for kind in ParticleKind::ALL {
        let result = run_seeded(reference_config(kind, 20_000), 3).expect("run");
        let stats = &result.stats;
        assert_eq!(stats.total, 20_000);
        assert_eq!(stats.survived_count + stats.decayed_count, stats.total);
        assert_eq!(result.events.len(), 200, "{} sample must be capped", kind);
        assert!(events_consistent(&result), "{} events violate survival invariant", kind);
    }
}

#[test]
fn test_sample_cap_is_configurable() {
    let settings = SimulationSettings {
        sample_cap: 25,
        seed: Some(4),
        ..SimulationSettings::default()
    };
    let result = run_simulation(reference_config(ParticleKind::Kaon, 1000), settings).expect("run");
    assert_eq!(result.events.len(), 25);
    assert_eq!(result.stats.total, 1000);
}

#[test]
fn test_proton_never_decays() {
    let result = run_seeded(reference_config(ParticleKind::Proton, 5000), 5).expect("run");
    assert_eq!(result.stats.decayed_count, 0);
    assert_eq!(result.stats.theoretical_survival_probability, 1.0);
    assert!(result.stats.decay_length.is_infinite());
    assert!(result.consistency.passed());
    assert!(result.simulated_curve.iter().all(|p| p.survival_fraction == 1.0));
}

#[test]
fn test_kaon_survival_near_theory() {
    let result = run_seeded(reference_config(ParticleKind::Kaon, 50_000), 6).expect("run");
    let observed = result.stats.survived_count as f64 / result.stats.total as f64;
    assert!((observed - 0.779).abs() < 0.01, "observed survival {}", observed);
    assert!(result.consistency.z_score.abs() < 4.0);
}

#[test]
fn test_simulated_curve_tracks_theory() {
    let result = run_seeded(reference_config(ParticleKind::Kaon, 50_000), 7).expect("run");
    assert_eq!(result.simulated_curve.len(), result.curve.len());
    for (sim, theory) in result.simulated_curve.iter().zip(&result.curve) {
        assert_eq!(sim.distance, theory.distance);
        assert!(
            (sim.survival_fraction - theory.survival_fraction).abs() < 0.01,
            "at {} m: simulated {} vs theory {}",
            sim.distance,
            sim.survival_fraction,
            theory.survival_fraction
        );
    }
}

#[test]
fn test_time_of_flight_only_for_survivors() {
    let result = run_seeded(reference_config(ParticleKind::Kaon, 500), 8).expect("run");
    for event in &result.events {
        assert_eq!(event.time_of_flight.is_some(), event.survived);
        if let Some(t) = event.time_of_flight {
            // 15 m at nearly c is just over 50 ns
            assert!(t > 50.0 && t < 50.2, "tof {}", t);
        }
    }
    let mean = result.stats.mean_time_of_flight.expect("some survivors");
    assert!(mean > 50.0 && mean < 50.2);
}

#[test]
fn test_detector_response_counts_hits() {
    let mut settings = SimulationSettings::default().with_seed(9);
    settings.detector.enabled = true;
    settings.detector.efficiency = 0.9;
    let result = run_simulation(reference_config(ParticleKind::Pion, 10_000), settings).expect("run");

    let detected = result.stats.detected_count.expect("detector enabled");
    let survived = result.stats.survived_count;
    assert!(detected <= survived);
    let efficiency = detected as f64 / survived as f64;
    assert!((efficiency - 0.9).abs() < 0.02, "efficiency {}", efficiency);
    assert!(result.events.iter().all(|e| e.detected.is_some()));
}

#[test]
fn test_detector_disabled_by_default() {
    let result = run_seeded(reference_config(ParticleKind::Pion, 100), 10).expect("run");
    assert!(result.stats.detected_count.is_none());
    assert!(result.events.iter().all(|e| e.detected.is_none() && e.decay_vertex.is_none()));
}

#[test]
fn test_degenerate_source_warns_and_stays_finite() {
    let mut rng = StepRng::new(0, 0);
    let result = run_with_source(
        reference_config(ParticleKind::Kaon, 100),
        SimulationSettings::default(),
        &mut rng,
    )
    .expect("degenerate draws are not fatal");

    assert_eq!(result.stats.survived_count, 100);
    assert!(result.seed.is_none());
    assert!(result.warnings.warnings().any(|w| w.message.contains("exactly zero")));
    assert!(result
        .events
        .iter()
        .all(|e| e.time_of_flight.map_or(false, f64::is_finite)));
}

#[test]
fn test_chunked_run_reports_progress() {
    let mut percents = Vec::new();
    let settings = SimulationSettings {
        chunk_size: 2500,
        ..SimulationSettings::default().with_seed(11)
    };
    let result = run_simulation_chunked(reference_config(ParticleKind::Pion, 10_000), settings, |p| {
        percents.push(p.percent());
        ControlFlow::Continue(())
    })
    .expect("run");

    assert_eq!(percents, vec![25, 50, 75, 100]);
    assert_eq!(result.stats.total, 10_000);
}

#[test]
fn test_inferred_lifetime_recovers_kaon_lifetime() {
    let result = run_seeded(reference_config(ParticleKind::Kaon, 100_000), 12).expect("run");
    let tau = result
        .consistency
        .inferred_proper_lifetime
        .expect("kaon run has decays and survivors");
    let relative = (tau - 1.2380e-8).abs() / 1.2380e-8;
    assert!(relative < 0.03, "inferred lifetime {} off by {}", tau, relative);
}

#[test]
fn test_decays_off_every_particle_survives() {
    let settings = SimulationSettings {
        decay_enabled: false,
        magnetic_field: 1.5,
        ..SimulationSettings::default().with_seed(21)
    };
    let result = run_simulation(reference_config(ParticleKind::Kaon, 5000), settings).expect("run");

    assert_eq!(result.stats.decayed_count, 0);
    assert_eq!(result.stats.survived_count, 5000);
    assert_eq!(result.stats.theoretical_survival_probability, 1.0);
    assert!(result.stats.decay_length.is_finite(), "physical decay length is still reported");
    assert!(result.consistency.passed());
    assert!(result.consistency.inferred_proper_lifetime.is_none());
    assert!(result.events.iter().all(|e| e.larmor_radius.is_some()));
}
