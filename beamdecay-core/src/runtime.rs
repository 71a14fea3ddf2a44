use crate::config::{BeamConfiguration, RunFile, SimulationSettings};
use crate::curve::{build_curve, simulated_curve, SurvivalCurvePoint};
use crate::diagnostics::Diagnostics;
use crate::error::BeamResult;
use crate::random::{entropy_seed, seeded, RandomSource};
use crate::sampler::SimulationEvent;
use crate::simulator::{AggregateStats, PopulationOutcome, PopulationSimulator, Progress};
use crate::validator::{validate_run, ConsistencyReport};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;

/// Final result of one run. Owned by the caller and replaced on the next run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub config: BeamConfiguration,
    /// Seed of the generator that produced this run, when one was used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub stats: AggregateStats,
    /// Theoretical survival over the beamline
    pub curve: Vec<SurvivalCurvePoint>,
    /// Observed survival over the full population at the same distances
    pub simulated_curve: Vec<SurvivalCurvePoint>,
    pub consistency: ConsistencyReport,
    /// First `sample_cap` events
    pub events: Vec<SimulationEvent>,
    #[serde(default, skip_serializing_if = "Diagnostics::is_empty")]
    pub warnings: Diagnostics,
}

/// Main entry point: run a configuration with the seed from `settings`,
/// drawing a fresh one when none is set
pub fn run_simulation(
    config: BeamConfiguration,
    settings: SimulationSettings,
) -> BeamResult<SimulationResult> {
    let seed = settings.seed.unwrap_or_else(entropy_seed);
    let simulator = PopulationSimulator::new(config, settings)?;
    let outcome = simulator.run(&mut seeded(seed))?;
    assemble(&simulator, outcome, Some(seed))
}

/// Run with a caller-supplied random source
pub fn run_with_source<R: RandomSource + ?Sized>(
    config: BeamConfiguration,
    settings: SimulationSettings,
    rng: &mut R,
) -> BeamResult<SimulationResult> {
    let simulator = PopulationSimulator::new(config, settings)?;
    let outcome = simulator.run(rng)?;
    assemble(&simulator, outcome, None)
}

/// Chunked run that reports progress and may be cancelled
pub fn run_simulation_chunked<F>(
    config: BeamConfiguration,
    settings: SimulationSettings,
    on_progress: F,
) -> BeamResult<SimulationResult>
where
    F: FnMut(Progress) -> ControlFlow<()>,
{
    let seed = settings.seed.unwrap_or_else(entropy_seed);
    let simulator = PopulationSimulator::new(config, settings)?;
    let outcome = simulator.run_chunked(&mut seeded(seed), on_progress)?;
    assemble(&simulator, outcome, Some(seed))
}

/// Run on the rayon pool
pub fn run_simulation_parallel(
    config: BeamConfiguration,
    settings: SimulationSettings,
) -> BeamResult<SimulationResult> {
    let seed = settings.seed.unwrap_or_else(entropy_seed);
    let simulator = PopulationSimulator::new(config, settings)?;
    let outcome = simulator.run_parallel(seed)?;
    assemble(&simulator, outcome, Some(seed))
}

/// Load a run file and execute it
pub fn run_file(path: impl AsRef<std::path::Path>) -> BeamResult<SimulationResult> {
    let run = RunFile::from_file(path)?;
    run_simulation(run.beam, run.settings)
}

fn assemble(
    simulator: &PopulationSimulator,
    outcome: PopulationOutcome,
    seed: Option<u64>,
) -> BeamResult<SimulationResult> {
    let config = *simulator.config();
    let settings = simulator.settings();
    let curve = build_curve(&config, settings.curve_resolution)?;
    let simulated_curve = simulated_curve(&config, &outcome.tally);
    let consistency = validate_run(&config, &outcome.stats, settings.z_threshold);

    Ok(SimulationResult {
        config,
        seed,
        stats: outcome.stats,
        curve,
        simulated_curve,
        consistency,
        events: outcome.events,
        warnings: outcome.warnings,
    })
}
