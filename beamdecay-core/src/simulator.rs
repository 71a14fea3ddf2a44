//! Population-level Monte Carlo
//!
//! Folds independent event draws into a `Tally` and a bounded sample
//! buffer. Aggregates always cover every event; only the first
//! `sample_cap` events are retained verbatim.

use crate::config::{BeamConfiguration, SimulationSettings};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{BeamError, BeamResult};
use crate::kinematics::{decay_length, kinematics, survival_probability};
use crate::random::{chunk_seed, seeded, RandomSource};
use crate::sampler::{EventDraw, EventSampler, SimulationEvent};
use crate::species::ParticleSpecies;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use tracing::{debug, info, warn};

/// Running counts over a population
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    pub total: u64,
    pub survived: u64,
    pub decayed: u64,
    pub detected: u64,
    pub degenerate_draws: u64,
    sum_beta: f64,
    sum_gamma: f64,
    sum_time_of_flight: f64,
    /// `decay_bins[k]` counts decays in `(d[k-1], d[k]]` for curve distances `d`
    decay_bins: Vec<u64>,
    bin_width: f64,
}

impl Tally {
    pub fn new(beam_length: f64, curve_resolution: usize) -> Self {
        let points = curve_resolution.max(2);
        Self {
            total: 0,
            survived: 0,
            decayed: 0,
            detected: 0,
            degenerate_draws: 0,
            sum_beta: 0.0,
            sum_gamma: 0.0,
            sum_time_of_flight: 0.0,
            decay_bins: vec![0; points],
            bin_width: beam_length / (points - 1) as f64,
        }
    }

    fn absorb(mut self, draw: &EventDraw) -> Self {
        let event = &draw.event;
        self.total += 1;
        self.sum_beta += event.beta;
        self.sum_gamma += event.gamma;
        if event.survived {
            self.survived += 1;
        } else {
            self.decayed += 1;
        }
        if let Some(t) = event.time_of_flight {
            self.sum_time_of_flight += t;
        }
        if event.detected == Some(true) {
            self.detected += 1;
        }
        if draw.degenerate {
            self.degenerate_draws += 1;
        }
        if let Some(x) = event.decay_position {
            let last = self.decay_bins.len() - 1;
            let bin = ((x / self.bin_width).ceil() as usize).min(last);
            self.decay_bins[bin] += 1;
        }
        self
    }

    /// Combine two disjoint partitions of a population
    pub fn merge(mut self, other: &Tally) -> Self {
        self.total += other.total;
        self.survived += other.survived;
        self.decayed += other.decayed;
        self.detected += other.detected;
        self.degenerate_draws += other.degenerate_draws;
        self.sum_beta += other.sum_beta;
        self.sum_gamma += other.sum_gamma;
        self.sum_time_of_flight += other.sum_time_of_flight;
        for (mine, theirs) in self.decay_bins.iter_mut().zip(&other.decay_bins) {
            *mine += theirs;
        }
        self
    }

    pub fn mean_beta(&self) -> Option<f64> {
        (self.total > 0).then(|| self.sum_beta / self.total as f64)
    }

    pub fn mean_gamma(&self) -> Option<f64> {
        (self.total > 0).then(|| self.sum_gamma / self.total as f64)
    }

    /// Mean time of flight over survivors
    pub fn mean_time_of_flight(&self) -> Option<f64> {
        (self.survived > 0).then(|| self.sum_time_of_flight / self.survived as f64)
    }

    /// Fraction of the population still alive at each curve distance
    pub fn surviving_fractions(&self) -> Vec<f64> {
        if self.total == 0 {
            return vec![1.0; self.decay_bins.len()];
        }
        let total = self.total as f64;
        self.decay_bins
            .iter()
            .scan(0u64, |decayed_so_far, &n| {
                *decayed_so_far += n;
                Some(1.0 - *decayed_so_far as f64 / total)
            })
            .collect()
    }
}

/// Population summary derived from a configuration and its tally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total: u64,
    pub survived_count: u64,
    pub decayed_count: u64,
    /// Kinematics at the nominal (unsmeared) momentum
    pub nominal_beta: f64,
    pub nominal_gamma: f64,
    pub theoretical_survival_probability: f64,
    /// Meters; `+∞` for stable species
    #[serde(with = "crate::export::infinite_as_null")]
    pub decay_length: f64,
    /// Averages over every sampled event
    pub mean_beta: Option<f64>,
    pub mean_gamma: Option<f64>,
    /// Nanoseconds, averaged over survivors
    pub mean_time_of_flight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_count: Option<u64>,
}

impl AggregateStats {
    pub fn from_tally(
        config: &BeamConfiguration,
        settings: &SimulationSettings,
        tally: &Tally,
    ) -> BeamResult<Self> {
        let species = config.species();
        let nominal = kinematics(config.momentum, species.rest_mass)?;
        let lambda = decay_length(&nominal, species.proper_lifetime);
        let theoretical_survival_probability = if settings.decay_enabled {
            survival_probability(config.beam_length, lambda)
        } else {
            1.0
        };
        Ok(Self {
            total: tally.total,
            survived_count: tally.survived,
            decayed_count: tally.decayed,
            nominal_beta: nominal.beta,
            nominal_gamma: nominal.gamma,
            theoretical_survival_probability,
            decay_length: lambda,
            mean_beta: tally.mean_beta(),
            mean_gamma: tally.mean_gamma(),
            mean_time_of_flight: tally.mean_time_of_flight(),
            detected_count: settings.detector.enabled.then_some(tally.detected),
        })
    }
}

/// Everything a population run produces before curves and checks
#[derive(Debug, Clone)]
pub struct PopulationOutcome {
    pub tally: Tally,
    pub stats: AggregateStats,
    pub events: Vec<SimulationEvent>,
    pub warnings: Diagnostics,
}

/// Chunked-run progress report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: u64,
    pub total: u64,
}

impl Progress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.completed as u128 * 100 / self.total as u128) as u8
    }
}

/// Runs `event_count` independent draws for one configuration
#[derive(Debug, Clone)]
pub struct PopulationSimulator {
    sampler: EventSampler,
    warnings: Diagnostics,
}

struct Accumulator {
    tally: Tally,
    events: Vec<SimulationEvent>,
    cap: usize,
}

impl Accumulator {
    fn new(sampler: &EventSampler) -> Self {
        let settings = sampler.settings();
        let expected = sampler.config().event_count.min(settings.sample_cap as u64) as usize;
        Self {
            tally: Tally::new(sampler.config().beam_length, settings.curve_resolution),
            events: Vec::with_capacity(expected),
            cap: settings.sample_cap,
        }
    }

    fn absorb(mut self, draw: EventDraw) -> Self {
        self.tally = self.tally.absorb(&draw);
        if self.events.len() < self.cap {
            self.events.push(draw.event);
        }
        self
    }

    fn draw_range<R: RandomSource + ?Sized>(
        self,
        sampler: &EventSampler,
        mut ids: std::ops::Range<u64>,
        rng: &mut R,
    ) -> BeamResult<Self> {
        ids.try_fold(self, |acc, id| Ok(acc.absorb(sampler.sample(id, rng)?)))
    }
}

impl PopulationSimulator {
    /// Validates the configuration; fails with `InvalidConfiguration`
    pub fn new(config: BeamConfiguration, settings: SimulationSettings) -> BeamResult<Self> {
        let (sampler, warnings) = EventSampler::new(config, settings)?;
        Ok(Self { sampler, warnings })
    }

    pub fn config(&self) -> &BeamConfiguration {
        self.sampler.config()
    }

    pub fn settings(&self) -> &SimulationSettings {
        self.sampler.settings()
    }

    pub fn species(&self) -> &'static ParticleSpecies {
        self.sampler.species()
    }

    /// Sample every event synchronously
    pub fn run<R: RandomSource + ?Sized>(&self, rng: &mut R) -> BeamResult<PopulationOutcome> {
        let n = self.config().event_count;
        debug!(
            particle = %self.config().particle_type,
            momentum = self.config().momentum,
            beam_length = self.config().beam_length,
            events = n,
            "starting population run"
        );
        let acc = Accumulator::new(&self.sampler).draw_range(&self.sampler, 0..n, rng)?;
        self.finish(acc)
    }

    /// Sample in chunks of `chunk_size`, reporting after each chunk.
    ///
    /// Draws the same sequence as [`run`](Self::run), so a run that is not
    /// cancelled produces an identical outcome. Returning `Break` from the
    /// callback abandons the run with `Cancelled`.
    pub fn run_chunked<R, F>(&self, rng: &mut R, mut on_progress: F) -> BeamResult<PopulationOutcome>
    where
        R: RandomSource + ?Sized,
        F: FnMut(Progress) -> ControlFlow<()>,
    {
        let n = self.config().event_count;
        let chunk = self.settings().chunk_size as u64;
        let mut acc = Accumulator::new(&self.sampler);
        let mut start = 0;
        while start < n {
            let end = (start + chunk).min(n);
            acc = acc.draw_range(&self.sampler, start..end, rng)?;
            if on_progress(Progress { completed: end, total: n }).is_break() {
                info!(completed = end, total = n, "population run cancelled");
                return Err(BeamError::Cancelled { completed: end });
            }
            start = end;
        }
        self.finish(acc)
    }

    /// Sample chunks on the rayon pool.
    ///
    /// Each chunk draws from its own generator seeded by `seed` and the chunk
    /// index, and chunks merge in index order, so the outcome depends only on
    /// the seed. It differs from a sequential run with the same seed.
    pub fn run_parallel(&self, seed: u64) -> BeamResult<PopulationOutcome> {
        let n = self.config().event_count;
        let chunk = self.settings().chunk_size as u64;
        let chunks = n.div_ceil(chunk);
        debug!(events = n, chunks, "starting parallel population run");

        let partials = (0..chunks)
            .into_par_iter()
            .map(|k| {
                let mut rng = seeded(chunk_seed(seed, k));
                let start = k * chunk;
                let end = (start + chunk).min(n);
                Accumulator::new(&self.sampler).draw_range(&self.sampler, start..end, &mut rng)
            })
            .collect::<BeamResult<Vec<_>>>()?;

        let merged = partials
            .into_iter()
            .fold(Accumulator::new(&self.sampler), |mut acc, part| {
                acc.tally = acc.tally.merge(&part.tally);
                let room = acc.cap - acc.events.len();
                acc.events.extend(part.events.into_iter().take(room));
                acc
            });
        self.finish(merged)
    }

    fn finish(&self, acc: Accumulator) -> BeamResult<PopulationOutcome> {
        let stats = AggregateStats::from_tally(self.config(), self.settings(), &acc.tally)?;
        let mut warnings = self.warnings.clone();
        if acc.tally.degenerate_draws > 0 {
            warn!(
                count = acc.tally.degenerate_draws,
                "random source returned exactly zero for a decay draw; clamped"
            );
            warnings.push(Diagnostic::warning(
                format!(
                    "{} decay draw(s) returned exactly zero and were clamped to the smallest positive value",
                    acc.tally.degenerate_draws
                ),
                None,
            ));
        }
        info!(
            total = stats.total,
            survived = stats.survived_count,
            decayed = stats.decayed_count,
            "population run complete"
        );
        Ok(PopulationOutcome {
            tally: acc.tally,
            stats,
            events: acc.events,
            warnings,
        })
    }
}
