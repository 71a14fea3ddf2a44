//! Beam configuration and run settings
//!
//! `BeamConfiguration` is the request a caller makes; `SimulationSettings`
//! holds the engine tunables, all of which have defaults. Both deserialize
//! from the JSON shapes the front end produces.

use crate::error::{BeamError, BeamResult};
use crate::species::{ParticleKind, ParticleSpecies};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One simulation request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeamConfiguration {
    pub particle_type: ParticleKind,
    /// Nominal momentum in GeV/c
    pub momentum: f64,
    /// Flight distance in meters
    pub beam_length: f64,
    pub event_count: u64,
}

impl BeamConfiguration {
    pub fn new(particle_type: ParticleKind, momentum: f64, beam_length: f64, event_count: u64) -> Self {
        Self {
            particle_type,
            momentum,
            beam_length,
            event_count,
        }
    }

    /// Build from the external species name, e.g. `"kaon"`
    pub fn from_name(
        particle: &str,
        momentum: f64,
        beam_length: f64,
        event_count: u64,
    ) -> BeamResult<Self> {
        Ok(Self::new(particle.parse()?, momentum, beam_length, event_count))
    }

    pub fn species(&self) -> &'static ParticleSpecies {
        self.particle_type.species()
    }
}

/// Toy detector model at the end of the beamline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorResponse {
    pub enabled: bool,
    /// Probability that a surviving particle registers a hit
    pub efficiency: f64,
    /// Gaussian timing resolution in seconds
    pub timing_resolution: f64,
}

impl Default for DetectorResponse {
    fn default() -> Self {
        Self {
            enabled: false,
            efficiency: 0.95,
            timing_resolution: 50e-12,
        }
    }
}

/// Transverse beam profile at injection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BeamOptics {
    pub enabled: bool,
    /// Gaussian beam spot sigma in meters
    pub spot_sigma: f64,
    /// Gaussian angular divergence sigma in radians
    pub angular_divergence: f64,
}

impl Default for BeamOptics {
    fn default() -> Self {
        Self {
            enabled: false,
            spot_sigma: 0.01,
            angular_divergence: 2.0e-3,
        }
    }
}

/// Engine tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationSettings {
    /// Width of the Irwin-Hall momentum smear
    pub spread_factor: f64,
    /// Number of raw events kept for inspection and export
    pub sample_cap: usize,
    /// Points in the survival curve
    pub curve_resolution: usize,
    /// |z| below this passes the consistency check
    pub z_threshold: f64,
    /// Fixed seed; a fresh one is drawn and recorded when absent
    pub seed: Option<u64>,
    /// Events per chunk in chunked and parallel runs
    pub chunk_size: usize,
    /// Transverse dipole field in tesla; 0 disables bending
    pub magnetic_field: f64,
    /// With decays off every particle survives the beamline
    pub decay_enabled: bool,
    pub detector: DetectorResponse,
    pub optics: BeamOptics,
}

pub const DEFAULT_SAMPLE_CAP: usize = 200;

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            spread_factor: 0.02,
            sample_cap: DEFAULT_SAMPLE_CAP,
            curve_resolution: 50,
            z_threshold: 2.0,
            seed: None,
            chunk_size: 1000,
            magnetic_field: 0.0,
            decay_enabled: true,
            detector: DetectorResponse::default(),
            optics: BeamOptics::default(),
        }
    }
}

impl SimulationSettings {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// A beam request plus optional settings, as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFile {
    #[serde(flatten)]
    pub beam: BeamConfiguration,
    #[serde(default)]
    pub settings: SimulationSettings,
}

impl RunFile {
    pub fn from_file(path: impl AsRef<Path>) -> BeamResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a run file; bad values (unknown species, negative counts)
    /// are configuration errors rather than JSON errors.
    pub fn from_json(text: &str) -> BeamResult<Self> {
        serde_json::from_str(text).map_err(|e| {
            if e.is_data() {
                BeamError::configuration(e.to_string())
            } else {
                BeamError::Json(e)
            }
        })
    }
}
