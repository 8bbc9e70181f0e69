//! Uniform random sources feeding the offer sampler.
//!
//! Sessions own their source, so two sessions never share generator state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform variates in `[0, 1)`.
pub trait UniformSource: Send {
    fn next_f64(&mut self) -> f64;
}

/// Draws from the thread-local generator. Not reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl UniformSource for ThreadRngSource {
    fn next_f64(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Seeded generator for reproducible sessions and tests.
#[derive(Debug, Clone)]
pub struct SeededSource {
    seed: u64,
    inner: StdRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl UniformSource for SeededSource {
    fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }
}

/// Build the session-local source: seeded when a seed is given.
pub fn source_for(seed: Option<u64>) -> Box<dyn UniformSource> {
    match seed {
        Some(seed) => Box::new(SeededSource::new(seed)),
        None => Box::new(ThreadRngSource),
    }
}
