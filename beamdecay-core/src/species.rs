//! Catalog of beam particle species
//!
//! Masses in GeV/c², proper lifetimes in seconds.

use crate::error::BeamError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Species selectable for a beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    Pion,
    Kaon,
    Muon,
    Proton,
}

/// Reference data for one species
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpecies {
    pub kind: ParticleKind,
    pub name: &'static str,
    pub rest_mass: f64,
    /// `f64::INFINITY` for stable species
    pub proper_lifetime: f64,
    pub pdg_code: i32,
}

impl ParticleSpecies {
    pub fn is_stable(&self) -> bool {
        self.proper_lifetime.is_infinite()
    }
}

pub static CATALOG: [ParticleSpecies; 4] = [
    ParticleSpecies {
        kind: ParticleKind::Pion,
        name: "Pion (π+)",
        rest_mass: 0.13957,
        proper_lifetime: 2.6033e-8,
        pdg_code: 211,
    },
    ParticleSpecies {
        kind: ParticleKind::Kaon,
        name: "Kaon (K+)",
        rest_mass: 0.49367,
        proper_lifetime: 1.2380e-8,
        pdg_code: 321,
    },
    ParticleSpecies {
        kind: ParticleKind::Muon,
        name: "Muon (μ+)",
        rest_mass: 0.10566,
        proper_lifetime: 2.1969e-6,
        pdg_code: -13,
    },
    ParticleSpecies {
        kind: ParticleKind::Proton,
        name: "Proton (p+)",
        rest_mass: 0.93827,
        proper_lifetime: f64::INFINITY,
        pdg_code: 2212,
    },
];

impl ParticleKind {
    pub const ALL: [ParticleKind; 4] = [
        ParticleKind::Pion,
        ParticleKind::Kaon,
        ParticleKind::Muon,
        ParticleKind::Proton,
    ];

    pub fn species(self) -> &'static ParticleSpecies {
        match self {
            ParticleKind::Pion => &CATALOG[0],
            ParticleKind::Kaon => &CATALOG[1],
            ParticleKind::Muon => &CATALOG[2],
            ParticleKind::Proton => &CATALOG[3],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParticleKind::Pion => "pion",
            ParticleKind::Kaon => "kaon",
            ParticleKind::Muon => "muon",
            ParticleKind::Proton => "proton",
        }
    }
}

impl fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticleKind {
    type Err = BeamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pion" => Ok(ParticleKind::Pion),
            "kaon" => Ok(ParticleKind::Kaon),
            "muon" => Ok(ParticleKind::Muon),
            "proton" => Ok(ParticleKind::Proton),
            other => Err(BeamError::configuration(format!(
                "unknown particle species '{}'",
                other
            ))),
        }
    }
}
