//! Binomial consistency check of observed against theoretical survival

use crate::config::BeamConfiguration;
use crate::kinematics::SPEED_OF_LIGHT;
use crate::simulator::AggregateStats;
use serde::{Deserialize, Serialize};

pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Consistent,
    Inconsistent,
    /// No events to judge
    Undetermined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    pub observed: f64,
    pub expected: f64,
    /// Binomial standard error of the expected fraction
    pub sigma: f64,
    pub z_score: f64,
    pub threshold: f64,
    pub verdict: Verdict,
    /// Proper lifetime in seconds implied by the observed survival
    pub inferred_proper_lifetime: Option<f64>,
}

impl ConsistencyReport {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Consistent
    }
}

/// Compare observed and expected survival with a two-sided z-test
pub fn validate(stats: &AggregateStats, threshold: f64) -> ConsistencyReport {
    let expected = stats.theoretical_survival_probability;
    if stats.total == 0 {
        return ConsistencyReport {
            observed: 0.0,
            expected,
            sigma: 0.0,
            z_score: 0.0,
            threshold,
            verdict: Verdict::Undetermined,
            inferred_proper_lifetime: None,
        };
    }

    let n = stats.total as f64;
    let observed = stats.survived_count as f64 / n;
    let sigma = (expected * (1.0 - expected) / n).sqrt();
    let z_score = if sigma > 0.0 {
        (observed - expected) / sigma
    } else {
        0.0
    };
    let verdict = if z_score.abs() < threshold {
        Verdict::Consistent
    } else {
        Verdict::Inconsistent
    };

    ConsistencyReport {
        observed,
        expected,
        sigma,
        z_score,
        threshold,
        verdict,
        inferred_proper_lifetime: None,
    }
}

/// Same as [`validate`], plus the time-dilation estimate of the proper
/// lifetime: `τ = -L / (β c γ ln(observed))` at nominal kinematics.
pub fn validate_run(
    config: &BeamConfiguration,
    stats: &AggregateStats,
    threshold: f64,
) -> ConsistencyReport {
    let mut report = validate(stats, threshold);
    if report.verdict != Verdict::Undetermined && report.observed > 0.0 && report.observed < 1.0 {
        let velocity = stats.nominal_beta * SPEED_OF_LIGHT;
        report.inferred_proper_lifetime =
            Some(-config.beam_length / (velocity * stats.nominal_gamma * report.observed.ln()));
    }
    report
}
