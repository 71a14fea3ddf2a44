//! Survival-versus-distance curves
//!
//! The theoretical curve depends only on the configuration. The simulated
//! curve reads the decay histogram of a finished population run.

use crate::config::BeamConfiguration;
use crate::error::{BeamError, BeamResult};
use crate::kinematics::{decay_length, kinematics, survival_probability};
use crate::simulator::Tally;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurvivalCurvePoint {
    /// Meters from injection
    pub distance: f64,
    pub survival_fraction: f64,
}

/// Evenly spaced distances over `[0, beam_length]`, both ends included
fn distances(beam_length: f64, resolution: usize) -> impl Iterator<Item = f64> {
    let last = resolution.saturating_sub(1);
    let step = beam_length / last.max(1) as f64;
    (0..resolution).map(move |i| {
        if i == last {
            beam_length
        } else {
            i as f64 * step
        }
    })
}

/// Theoretical survival `exp(-d / λ)` at `resolution` points
pub fn build_curve(config: &BeamConfiguration, resolution: usize) -> BeamResult<Vec<SurvivalCurvePoint>> {
    if resolution < 2 {
        return Err(BeamError::configuration(format!(
            "curve resolution needs at least 2 points, got {}",
            resolution
        )));
    }
    let species = config.species();
    let nominal = kinematics(config.momentum, species.rest_mass)?;
    let lambda = decay_length(&nominal, species.proper_lifetime);

    Ok(distances(config.beam_length, resolution)
        .map(|distance| SurvivalCurvePoint {
            distance,
            survival_fraction: survival_probability(distance, lambda),
        })
        .collect())
}

/// Observed survival at the same distances, over the full population
pub fn simulated_curve(config: &BeamConfiguration, tally: &Tally) -> Vec<SurvivalCurvePoint> {
    let fractions = tally.surviving_fractions();
    distances(config.beam_length, fractions.len())
        .zip(fractions)
        .map(|(distance, survival_fraction)| SurvivalCurvePoint {
            distance,
            survival_fraction,
        })
        .collect()
}
