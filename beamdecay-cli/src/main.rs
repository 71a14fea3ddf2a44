use beamdecay_core::{
    build_curve, decay_length, kinematics, run_simulation, run_simulation_parallel, write_csv,
    write_json, BeamConfiguration, ParticleKind, RunFile, SimulationResult, SimulationSettings,
    Verdict,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "beamdecay")]
#[command(about = "Relativistic decay Monte Carlo for a particle beamline", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a beam and print the summary
    Run {
        /// JSON run file; flags below override its beam fields
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        beam: BeamArgs,

        /// Number of particles to simulate
        #[arg(long)]
        events: Option<u64>,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Sample on all cores
        #[arg(long)]
        parallel: bool,

        /// Enable the toy detector model at the end of the beamline
        #[arg(long)]
        detector: bool,

        /// Transverse magnetic field in tesla
        #[arg(long)]
        field: Option<f64>,

        /// Switch decays off; every particle survives
        #[arg(long)]
        no_decay: bool,

        /// Write sampled events as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the full result as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// List the particle catalog with decay lengths at a momentum
    Species {
        /// Momentum in GeV/c
        #[arg(long, default_value_t = 8.0)]
        momentum: f64,
    },
    /// Print the theoretical survival curve
    Curve {
        #[command(flatten)]
        beam: BeamArgs,

        /// Number of points
        #[arg(long, default_value_t = 20)]
        points: usize,
    },
}

#[derive(Args)]
struct BeamArgs {
    /// pion, kaon, muon or proton
    #[arg(long)]
    particle: Option<String>,

    /// Nominal momentum in GeV/c
    #[arg(long)]
    momentum: Option<f64>,

    /// Beamline length in meters
    #[arg(long)]
    length: Option<f64>,
}

impl BeamArgs {
    /// Apply the flags on top of `base`, or on the 8 GeV/c, 15 m pion beam
    fn resolve(
        &self,
        base: Option<BeamConfiguration>,
    ) -> Result<BeamConfiguration, Box<dyn std::error::Error>> {
        let mut config =
            base.unwrap_or_else(|| BeamConfiguration::new(ParticleKind::Pion, 8.0, 15.0, 10_000));
        if let Some(particle) = &self.particle {
            config.particle_type = particle.parse()?;
        }
        if let Some(momentum) = self.momentum {
            config.momentum = momentum;
        }
        if let Some(length) = self.length {
            config.beam_length = length;
        }
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Commands::Run {
            config,
            beam,
            events,
            seed,
            parallel,
            detector,
            field,
            no_decay,
            csv,
            json,
        } => run_command(RunOptions {
            config,
            beam,
            events,
            seed,
            parallel,
            detector,
            field,
            no_decay,
            csv,
            json,
        }),
        Commands::Species { momentum } => list_species(momentum),
        Commands::Curve { beam, points } => print_curve(&beam, points),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct RunOptions {
    config: Option<PathBuf>,
    beam: BeamArgs,
    events: Option<u64>,
    seed: Option<u64>,
    parallel: bool,
    detector: bool,
    field: Option<f64>,
    no_decay: bool,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
}

fn run_command(opts: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let (base, mut settings) = match &opts.config {
        Some(path) => {
            let run = RunFile::from_file(path)?;
            (Some(run.beam), run.settings)
        }
        None => (None, SimulationSettings::default()),
    };

    let mut config = opts.beam.resolve(base)?;
    if let Some(events) = opts.events {
        config.event_count = events;
    }
    if opts.seed.is_some() {
        settings.seed = opts.seed;
    }
    if opts.detector {
        settings.detector.enabled = true;
    }
    if let Some(field) = opts.field {
        settings.magnetic_field = field;
    }
    if opts.no_decay {
        settings.decay_enabled = false;
    }

    info!(
        particle = %config.particle_type,
        events = config.event_count,
        parallel = opts.parallel,
        "starting run"
    );
    let result = if opts.parallel {
        run_simulation_parallel(config, settings)?
    } else {
        run_simulation(config, settings)?
    };

    print_summary(&result);

    if let Some(path) = &opts.csv {
        write_csv(&result, path)?;
        info!(events = result.events.len(), path = %path.display(), "wrote CSV export");
    }
    if let Some(path) = &opts.json {
        write_json(&result, path)?;
        info!(path = %path.display(), "wrote JSON export");
    }

    Ok(())
}

fn print_summary(result: &SimulationResult) {
    let config = &result.config;
    let stats = &result.stats;
    let report = &result.consistency;

    println!(
        "{} at {} GeV/c over {} m",
        config.species().name,
        config.momentum,
        config.beam_length
    );
    if let Some(seed) = result.seed {
        println!("seed            = {}", seed);
    }
    println!("events          = {}", stats.total);
    println!("survived        = {}", stats.survived_count);
    println!("decayed         = {}", stats.decayed_count);
    if let Some(detected) = stats.detected_count {
        println!("detected        = {}", detected);
    }
    println!("beta (nominal)  = {:.6}", stats.nominal_beta);
    println!("gamma (nominal) = {:.3}", stats.nominal_gamma);
    if stats.decay_length.is_finite() {
        println!("decay length    = {:.2} m", stats.decay_length);
    } else {
        println!("decay length    = stable");
    }
    if let Some(tof) = stats.mean_time_of_flight {
        println!("mean TOF        = {:.4} ns", tof);
    }
    println!("P(survive) theo = {:.5}", report.expected);
    println!("P(survive) obs  = {:.5}", report.observed);

    let verdict = match report.verdict {
        Verdict::Consistent => "consistent",
        Verdict::Inconsistent => "INCONSISTENT",
        Verdict::Undetermined => "undetermined",
    };
    println!(
        "z-score         = {:.3} ({} at |z| < {})",
        report.z_score, verdict, report.threshold
    );
    if let Some(tau) = report.inferred_proper_lifetime {
        println!("inferred tau0   = {:.4e} s", tau);
    }

    for warning in result.warnings.iter() {
        eprintln!("{}", warning);
    }
}

fn list_species(momentum: f64) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{:<8} {:>6} {:>12} {:>12} {:>10} {:>14}",
        "name", "pdg", "mass GeV", "tau0 s", "gamma", "decay len m"
    );
    for kind in ParticleKind::ALL {
        let species = kind.species();
        let kin = kinematics(momentum, species.rest_mass)?;
        let lambda = decay_length(&kin, species.proper_lifetime);
        let lambda = if lambda.is_finite() {
            format!("{:.2}", lambda)
        } else {
            "stable".to_string()
        };
        println!(
            "{:<8} {:>6} {:>12.5} {:>12.4e} {:>10.3} {:>14}",
            kind, species.pdg_code, species.rest_mass, species.proper_lifetime, kin.gamma, lambda
        );
    }
    Ok(())
}

fn print_curve(beam: &BeamArgs, points: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = beam.resolve(None)?;
    for point in build_curve(&config, points)? {
        println!("{:>10.3} {:.6}", point.distance, point.survival_fraction);
    }
    Ok(())
}
