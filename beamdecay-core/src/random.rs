//! Random source used by the sampler
//!
//! Every draw goes through an explicit `RandomSource`, so runs are
//! repeatable given a seeded generator. Any `rand::Rng` is a source.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

pub trait RandomSource {
    /// Uniform draw on `[0, 1)`
    fn uniform(&mut self) -> f64;

    /// Gaussian draw; a zero sigma returns the mean unchanged
    fn gaussian(&mut self, mean: f64, sigma: f64) -> f64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn gaussian(&mut self, mean: f64, sigma: f64) -> f64 {
        if sigma <= 0.0 {
            return mean;
        }
        match Normal::new(mean, sigma) {
            Ok(normal) => normal.sample(self),
            Err(_) => mean,
        }
    }
}

/// Seeded generator for a run
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Seed for one chunk of a partitioned run. Chunks get independent streams
/// that depend only on the run seed and the chunk index.
pub fn chunk_seed(seed: u64, chunk: u64) -> u64 {
    // splitmix64 finalizer
    let mut z = seed ^ chunk.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Fresh seed from the operating system
pub fn entropy_seed() -> u64 {
    rand::thread_rng().gen()
}
