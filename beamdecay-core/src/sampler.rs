//! Single-particle Monte Carlo draw
//!
//! Each event smears the nominal momentum, recomputes kinematics and
//! samples a decay position from the exponential decay law by inverse
//! transform. Draws per event, in order: three smear uniforms, one decay
//! uniform (unstable species with decays enabled), then the optional
//! detector and optics draws.

use crate::analyzer::validate_config;
use crate::config::{BeamConfiguration, SimulationSettings};
use crate::diagnostics::Diagnostics;
use crate::error::BeamResult;
use crate::kinematics::{kinematics, larmor_radius, time_of_flight_ns, SPEED_OF_LIGHT};
use crate::random::RandomSource;
use crate::species::ParticleSpecies;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// One sampled particle. Never mutated after sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationEvent {
    pub id: u64,
    /// Smeared momentum in GeV/c
    pub actual_momentum: f64,
    pub energy: f64,
    pub beta: f64,
    pub gamma: f64,
    /// Nanoseconds to the end of the beamline; only survivors have one
    pub time_of_flight: Option<f64>,
    pub survived: bool,
    /// Meters from injection; `None` iff the particle survived
    pub decay_position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decay_vertex: Option<DVec3>,
    /// Bending radius in meters; only present with a magnetic field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub larmor_radius: Option<f64>,
}

/// A sampled event plus whether its decay draw hit exactly zero
#[derive(Debug, Clone)]
pub struct EventDraw {
    pub event: SimulationEvent,
    pub degenerate: bool,
}

/// Draws events for one validated configuration
#[derive(Debug, Clone)]
pub struct EventSampler {
    config: BeamConfiguration,
    settings: SimulationSettings,
    species: &'static ParticleSpecies,
}

impl EventSampler {
    /// Validate the configuration and return the sampler with any warnings
    pub fn new(
        config: BeamConfiguration,
        settings: SimulationSettings,
    ) -> BeamResult<(Self, Diagnostics)> {
        let warnings = validate_config(&config, &settings)?;
        let species = config.species();
        Ok((
            Self {
                config,
                settings,
                species,
            },
            warnings,
        ))
    }

    pub fn config(&self) -> &BeamConfiguration {
        &self.config
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn species(&self) -> &'static ParticleSpecies {
        self.species
    }

    pub fn sample<R: RandomSource + ?Sized>(&self, id: u64, rng: &mut R) -> BeamResult<EventDraw> {
        let beam_length = self.config.beam_length;

        // Irwin-Hall(3) centered on zero approximates a truncated Gaussian
        let smear = rng.uniform() + rng.uniform() + rng.uniform() - 1.5;
        let momentum = self.config.momentum * (1.0 + smear * self.settings.spread_factor);
        let kin = kinematics(momentum, self.species.rest_mass)?;

        let mut degenerate = false;
        let decay_at = if self.species.is_stable() || !self.settings.decay_enabled {
            None
        } else {
            let lambda = kin.beta * SPEED_OF_LIGHT * kin.gamma * self.species.proper_lifetime;
            let mut u = rng.uniform();
            if u <= 0.0 {
                degenerate = true;
                u = f64::MIN_POSITIVE;
            }
            Some(-lambda * u.ln())
        };

        let survived = match decay_at {
            None => true,
            Some(x) => x > beam_length,
        };
        let decay_position = if survived { None } else { decay_at };
        let mut time_of_flight = survived.then(|| time_of_flight_ns(beam_length, kin.beta));

        let mut detected = None;
        let detector = &self.settings.detector;
        if detector.enabled {
            let hit = survived && rng.uniform() <= detector.efficiency;
            if hit {
                time_of_flight = time_of_flight
                    .map(|t| t + rng.gaussian(0.0, detector.timing_resolution) * 1e9);
            }
            detected = Some(hit);
        }

        let mut decay_vertex = None;
        let optics = &self.settings.optics;
        if optics.enabled {
            let origin = DVec3::new(
                rng.gaussian(0.0, optics.spot_sigma),
                rng.gaussian(0.0, optics.spot_sigma),
                0.0,
            );
            let px = rng.gaussian(0.0, optics.angular_divergence).sin();
            let py = rng.gaussian(0.0, optics.angular_divergence).sin();
            let pz = (1.0 - px * px - py * py).max(0.0).sqrt();
            let direction = DVec3::new(px, py, pz).normalize_or_zero();
            decay_vertex = decay_position.map(|x| origin + direction * x);
        }

        let field = self.settings.magnetic_field;
        let larmor_radius = (field > 0.0).then(|| larmor_radius(momentum, field));

        Ok(EventDraw {
            event: SimulationEvent {
                id,
                actual_momentum: momentum,
                energy: kin.energy,
                beta: kin.beta,
                gamma: kin.gamma,
                time_of_flight,
                survived,
                decay_position,
                detected,
                decay_vertex,
                larmor_radius,
            },
            degenerate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BeamError;
    use crate::random::seeded;
    use crate::species::ParticleKind;
    use rand::rngs::mock::StepRng;

    fn sampler(kind: ParticleKind, settings: SimulationSettings) -> EventSampler {
        let config = BeamConfiguration::new(kind, 8.0, 15.0, 100);
        EventSampler::new(config, settings).expect("valid config").0
    }

    #[test]
    fn test_rejects_bad_config_before_sampling() {
        let config = BeamConfiguration::new(ParticleKind::Pion, 8.0, -1.0, 100);
        let err = EventSampler::new(config, SimulationSettings::default()).unwrap_err();
        assert!(matches!(err, BeamError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_stable_species_always_survives() {
        let s = sampler(ParticleKind::Proton, SimulationSettings::default());
        let mut rng = seeded(9);
        for id in 0..1000 {
            let draw = s.sample(id, &mut rng).expect("sample");
            assert!(draw.event.survived);
            assert!(draw.event.decay_position.is_none());
            assert!(draw.event.time_of_flight.is_some());
        }
    }

    #[test]
    fn test_zero_draw_is_clamped_not_infinite() {
        // Every uniform is exactly 0: smear is -1.5 and ln(U) would be -inf
        let s = sampler(ParticleKind::Kaon, SimulationSettings::default());
        let mut rng = StepRng::new(0, 0);
        let draw = s.sample(0, &mut rng).expect("sample");
        assert!(draw.degenerate);
        assert!(draw.event.survived);
        assert!(draw.event.decay_position.is_none());
        assert!(draw.event.time_of_flight.map_or(false, f64::is_finite));
        assert!((draw.event.actual_momentum - 8.0 * (1.0 - 1.5 * 0.02)).abs() < 1e-12);
    }

    #[test]
    fn test_smear_stays_within_bounds() {
        let s = sampler(ParticleKind::Pion, SimulationSettings::default());
        let mut rng = seeded(11);
        for id in 0..5000 {
            let p = s.sample(id, &mut rng).expect("sample").event.actual_momentum;
            assert!(p >= 8.0 * 0.97 && p <= 8.0 * 1.03, "momentum {} out of band", p);
        }
    }

    #[test]
    fn test_decayed_events_have_no_time_of_flight() {
        let s = sampler(ParticleKind::Kaon, SimulationSettings::default());
        let mut rng = seeded(5);
        let mut decayed = 0;
        for id in 0..2000 {
            let event = s.sample(id, &mut rng).expect("sample").event;
            if !event.survived {
                decayed += 1;
                assert!(event.time_of_flight.is_none());
                let x = event.decay_position.expect("decayed event has a position");
                assert!(x >= 0.0 && x <= 15.0);
            }
        }
        assert!(decayed > 0);
    }

    #[test]
    fn test_detector_never_sees_decayed_particles() {
        let mut settings = SimulationSettings::default();
        settings.detector.enabled = true;
        settings.detector.efficiency = 0.5;
        let s = sampler(ParticleKind::Kaon, settings);
        let mut rng = seeded(17);
        let mut missed = 0;
        for id in 0..2000 {
            let event = s.sample(id, &mut rng).expect("sample").event;
            let detected = event.detected.expect("detector enabled");
            if !event.survived {
                assert!(!detected);
            } else if !detected {
                missed += 1;
            }
        }
        assert!(missed > 0, "50% efficiency should miss some survivors");
    }

    #[test]
    fn test_decays_off_consumes_no_decay_draw() {
        let settings = SimulationSettings {
            decay_enabled: false,
            ..SimulationSettings::default()
        };
        let s = sampler(ParticleKind::Kaon, settings);
        let mut rng = seeded(31);
        for id in 0..2000 {
            let event = s.sample(id, &mut rng).expect("sample").event;
            assert!(event.survived);
            assert!(event.decay_position.is_none());
        }

        // Only the three smear uniforms are drawn per event
        let mut a = seeded(31);
        let mut b = seeded(31);
        s.sample(0, &mut a).expect("sample");
        for _ in 0..3 {
            b.uniform();
        }
        assert_eq!(a.uniform().to_bits(), b.uniform().to_bits());
    }

    #[test]
    fn test_larmor_radius_follows_field() {
        let s = sampler(ParticleKind::Pion, SimulationSettings::default());
        let event = s.sample(0, &mut seeded(2)).expect("sample").event;
        assert!(event.larmor_radius.is_none());

        let settings = SimulationSettings {
            magnetic_field: 2.0,
            ..SimulationSettings::default()
        };
        let s = sampler(ParticleKind::Pion, settings);
        let event = s.sample(0, &mut seeded(2)).expect("sample").event;
        let r = event.larmor_radius.expect("field is on");
        assert!((r - event.actual_momentum * 3.33564 / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_optics_place_vertex_near_axis() {
        let mut settings = SimulationSettings::default();
        settings.optics.enabled = true;
        let s = sampler(ParticleKind::Kaon, settings);
        let mut rng = seeded(23);
        for id in 0..2000 {
            let event = s.sample(id, &mut rng).expect("sample").event;
            match (event.decay_position, event.decay_vertex) {
                (Some(x), Some(v)) => {
                    assert!((v.z - x).abs() < 1e-3 * x.max(1.0));
                    assert!(v.x.abs() < 0.2 && v.y.abs() < 0.2);
                }
                (None, None) => {}
                other => panic!("vertex must accompany a decay position: {:?}", other),
            }
        }
    }
}
