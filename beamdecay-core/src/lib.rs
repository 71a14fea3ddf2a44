pub mod analyzer;
pub mod config;
pub mod curve;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod kinematics;
pub mod random;
pub mod runtime;
pub mod sampler;
pub mod simulator;
pub mod species;
pub mod validator;

pub use analyzer::{analyze_config, validate_config};
pub use config::{BeamConfiguration, BeamOptics, DetectorResponse, RunFile, SimulationSettings};
pub use curve::{build_curve, simulated_curve, SurvivalCurvePoint};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics};
pub use error::{BeamError, BeamResult};
pub use export::{from_json, to_csv, to_json, write_csv, write_json};
pub use kinematics::{
    decay_length, kinematics, larmor_radius, survival_probability, time_of_flight_ns, Kinematics,
    SPEED_OF_LIGHT,
};
pub use random::RandomSource;
pub use runtime::{
    run_file, run_simulation, run_simulation_chunked, run_simulation_parallel, run_with_source,
    SimulationResult,
};
pub use sampler::{EventDraw, EventSampler, SimulationEvent};
pub use simulator::{AggregateStats, PopulationOutcome, PopulationSimulator, Progress, Tally};
pub use species::{ParticleKind, ParticleSpecies, CATALOG};
pub use validator::{validate, validate_run, ConsistencyReport, Verdict};
