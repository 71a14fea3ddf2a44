//! Relativistic kinematics for a particle of known momentum and rest mass
//!
//! Units follow the natural convention of the beamline: momentum in GeV/c,
//! mass in GeV/c², energy in GeV, distances in meters, lifetimes in seconds.

use crate::error::{BeamError, BeamResult};
use serde::{Deserialize, Serialize};

/// Speed of light in m/s
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Velocity, Lorentz factor and total energy of a particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub beta: f64,
    pub gamma: f64,
    pub energy: f64,
}

/// Compute beta, gamma and energy from momentum and rest mass.
///
/// `energy = sqrt(p² + m²)`, `beta = p / E`, `gamma = E / m`.
pub fn kinematics(momentum: f64, mass: f64) -> BeamResult<Kinematics> {
    if !momentum.is_finite() || momentum <= 0.0 {
        return Err(BeamError::parameter(format!(
            "momentum must be positive and finite, got {}",
            momentum
        )));
    }
    if !mass.is_finite() || mass <= 0.0 {
        return Err(BeamError::parameter(format!(
            "mass must be positive and finite, got {}",
            mass
        )));
    }

    let energy = momentum.hypot(mass);
    Ok(Kinematics {
        beta: momentum / energy,
        gamma: energy / mass,
        energy,
    })
}

/// Mean lab-frame decay length `beta * c * gamma * tau`, infinite for stable species
pub fn decay_length(kin: &Kinematics, proper_lifetime: f64) -> f64 {
    if proper_lifetime.is_infinite() {
        return f64::INFINITY;
    }
    kin.beta * SPEED_OF_LIGHT * kin.gamma * proper_lifetime
}

/// Fraction of a population surviving past `distance`
pub fn survival_probability(distance: f64, decay_length: f64) -> f64 {
    if decay_length.is_infinite() {
        return 1.0;
    }
    (-distance / decay_length).exp()
}

/// Time to cover `distance` at velocity `beta`, in nanoseconds
pub fn time_of_flight_ns(distance: f64, beta: f64) -> f64 {
    distance / (beta * SPEED_OF_LIGHT) * 1e9
}

/// Radius of curvature in meters for momentum in GeV/c in a transverse
/// field in tesla; infinite without a field
pub fn larmor_radius(momentum: f64, field: f64) -> f64 {
    if field <= 0.0 {
        return f64::INFINITY;
    }
    momentum * 3.33564 / field
}
