//! Reference-beam kinematics at 8 GeV/c over a 15 m beamline

use beamdecay_core::tests::test_helpers::{approx_eq, reference_config, rel_eq, run_seeded};
use beamdecay_core::{decay_length, kinematics, survival_probability, BeamError, ParticleKind};

fn reference(kind: ParticleKind) -> (f64, f64, f64, f64) {
    let species = kind.species();
    let kin = kinematics(8.0, species.rest_mass).expect("valid kinematics");
    let lambda = decay_length(&kin, species.proper_lifetime);
    (kin.gamma, kin.beta, lambda, survival_probability(15.0, lambda))
}

#[test]
fn test_pion_reference_beam() {
    let (gamma, beta, lambda, survival) = reference(ParticleKind::Pion);
    assert!(approx_eq(gamma, 57.3, 0.2), "gamma = {}", gamma);
    assert!(approx_eq(beta, 0.99985, 1e-5), "beta = {}", beta);
    assert!(approx_eq(lambda, 447.0, 1.5), "decay length = {}", lambda);
    assert!(approx_eq(survival, 0.967, 1e-3), "survival = {}", survival);
}

#[test]
fn test_kaon_reference_beam() {
    let (gamma, beta, lambda, survival) = reference(ParticleKind::Kaon);
    assert!(approx_eq(gamma, 16.24, 0.05), "gamma = {}", gamma);
    assert!(approx_eq(beta, 0.99810, 1e-5), "beta = {}", beta);
    assert!(approx_eq(lambda, 60.1, 0.3), "decay length = {}", lambda);
    assert!(approx_eq(survival, 0.779, 2e-3), "survival = {}", survival);
}

#[test]
fn test_muon_reference_beam() {
    let (gamma, _, lambda, survival) = reference(ParticleKind::Muon);
    assert!(approx_eq(gamma, 75.72, 0.05), "gamma = {}", gamma);
    assert!(rel_eq(lambda, 49_900.0, 0.005), "decay length = {}", lambda);
    assert!(approx_eq(survival, 0.9997, 1e-4), "survival = {}", survival);
}

#[test]
fn test_proton_is_stable() {
    let (gamma, _, lambda, survival) = reference(ParticleKind::Proton);
    assert!(gamma > 1.0);
    assert!(lambda.is_infinite());
    assert_eq!(survival, 1.0);
}

#[test]
fn test_stats_report_nominal_kinematics() {
    let result = run_seeded(reference_config(ParticleKind::Kaon, 1000), 1).expect("run");
    let (gamma, beta, lambda, survival) = reference(ParticleKind::Kaon);
    assert_eq!(result.stats.nominal_gamma, gamma);
    assert_eq!(result.stats.nominal_beta, beta);
    assert_eq!(result.stats.decay_length, lambda);
    assert_eq!(result.stats.theoretical_survival_probability, survival);
}

#[test]
fn test_invalid_momentum_is_parameter_error() {
    let err = kinematics(0.0, 0.13957).unwrap_err();
    assert!(matches!(err, BeamError::InvalidParameter(_)));
    assert!(err.to_string().contains("momentum"));
}
