//! Static checks on a beam request before any sampling happens
//!
//! Errors here mean a run must not start; warnings flag runs that will
//! execute but whose statistics are weak or slow to produce.

use crate::config::{BeamConfiguration, SimulationSettings};
use crate::diagnostics::{format_errors, Diagnostic, Diagnostics};
use crate::error::{BeamError, BeamResult};

/// Below this many events the binomial z-test is unreliable
const MIN_EVENTS_FOR_CONSISTENCY: u64 = 30;

/// Largest run expected to finish within an interactive budget
pub const INTERACTIVE_EVENT_BUDGET: u64 = 50_000;

/// Analyze a configuration and return diagnostics
pub fn analyze_config(config: &BeamConfiguration, settings: &SimulationSettings) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    if !config.momentum.is_finite() || config.momentum <= 0.0 {
        diagnostics.push(Diagnostic::error(
            format!("must be positive and finite, got {}", config.momentum),
            Some("momentum"),
        ));
    }
    if !config.beam_length.is_finite() || config.beam_length <= 0.0 {
        diagnostics.push(Diagnostic::error(
            format!("must be positive and finite, got {}", config.beam_length),
            Some("beamLength"),
        ));
    }

    // The smear is (U1+U2+U3-1.5) * spread, bottoming out at 1 - 1.5 * spread
    if !(0.0..0.5).contains(&settings.spread_factor) {
        diagnostics.push(Diagnostic::error(
            format!("must lie in [0, 0.5), got {}", settings.spread_factor),
            Some("spreadFactor"),
        ));
    }
    if settings.sample_cap == 0 {
        diagnostics.push(Diagnostic::error("must be at least 1", Some("sampleCap")));
    }
    if settings.curve_resolution < 2 {
        diagnostics.push(Diagnostic::error(
            format!("needs at least 2 points, got {}", settings.curve_resolution),
            Some("curveResolution"),
        ));
    }
    if !settings.z_threshold.is_finite() || settings.z_threshold <= 0.0 {
        diagnostics.push(Diagnostic::error(
            format!("must be positive, got {}", settings.z_threshold),
            Some("zThreshold"),
        ));
    }
    if settings.chunk_size == 0 {
        diagnostics.push(Diagnostic::error("must be at least 1", Some("chunkSize")));
    }
    if !settings.magnetic_field.is_finite() || settings.magnetic_field < 0.0 {
        diagnostics.push(Diagnostic::error(
            format!("must be non-negative and finite, got {}", settings.magnetic_field),
            Some("magneticField"),
        ));
    }

    let detector = &settings.detector;
    if detector.enabled {
        if !(0.0..=1.0).contains(&detector.efficiency) {
            diagnostics.push(Diagnostic::error(
                format!("must lie in [0, 1], got {}", detector.efficiency),
                Some("detector.efficiency"),
            ));
        }
        if !detector.timing_resolution.is_finite() || detector.timing_resolution < 0.0 {
            diagnostics.push(Diagnostic::error(
                format!("must be non-negative, got {}", detector.timing_resolution),
                Some("detector.timingResolution"),
            ));
        }
    }

    let optics = &settings.optics;
    if optics.enabled {
        if !optics.spot_sigma.is_finite() || optics.spot_sigma < 0.0 {
            diagnostics.push(Diagnostic::error(
                format!("must be non-negative, got {}", optics.spot_sigma),
                Some("optics.spotSigma"),
            ));
        }
        if !optics.angular_divergence.is_finite() || optics.angular_divergence < 0.0 {
            diagnostics.push(Diagnostic::error(
                format!("must be non-negative, got {}", optics.angular_divergence),
                Some("optics.angularDivergence"),
            ));
        }
    }

    if config.event_count > 0 && config.event_count < MIN_EVENTS_FOR_CONSISTENCY {
        diagnostics.push(Diagnostic::warning(
            format!(
                "only {} events; the consistency check needs at least {} to be meaningful",
                config.event_count, MIN_EVENTS_FOR_CONSISTENCY
            ),
            Some("eventCount"),
        ));
    }
    if config.event_count > INTERACTIVE_EVENT_BUDGET {
        diagnostics.push(Diagnostic::warning(
            format!(
                "{} events exceeds the interactive budget of {}; consider a chunked run",
                config.event_count, INTERACTIVE_EVENT_BUDGET
            ),
            Some("eventCount"),
        ));
    }

    diagnostics
}

/// Run the analysis and turn any error into `InvalidConfiguration`.
/// Returns the remaining warnings on success.
pub fn validate_config(
    config: &BeamConfiguration,
    settings: &SimulationSettings,
) -> BeamResult<Diagnostics> {
    let diagnostics = analyze_config(config, settings);
    if diagnostics.has_errors() {
        return Err(BeamError::configuration(format_errors(&diagnostics)));
    }
    Ok(diagnostics.into_warnings())
}
