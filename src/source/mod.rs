//! AQI data sources
//!
//! A data source turns a location into an AQI value, asynchronously and
//! possibly failing. Randomness and waiting are injected through
//! [`RandomSource`] and [`DelaySource`] so simulated lookups can run
//! deterministically under test.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::Result;
use crate::models::LocationQuery;

pub mod simulated;

pub use simulated::SimulatedSource;

/// Anything that can look up the current AQI for a location
#[async_trait]
pub trait AqiSource: Send + Sync {
    /// Resolve the AQI for `location`, or fail with a fetch error.
    async fn fetch(&self, location: &LocationQuery) -> Result<i32>;
}

#[async_trait]
impl<T: AqiSource + ?Sized> AqiSource for Arc<T> {
    async fn fetch(&self, location: &LocationQuery) -> Result<i32> {
        (**self).fetch(location).await
    }
}

/// Source of uniform random numbers
pub trait RandomSource: Send {
    /// Next value, uniform in `[0, 1)`
    fn next_unit(&mut self) -> f64;
}

/// Random source backed by a seedable `rand` generator
pub struct RngSource {
    rng: StdRng,
}

impl RngSource {
    /// Reproducible source: the same seed yields the same lookups
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from the thread-local generator
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::seeded(rand::rng().random())
    }

    /// Seeded when a seed is given, from entropy otherwise
    #[must_use]
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl RandomSource for RngSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of values in order, starting over when exhausted
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: VecDeque<f64>,
}

impl SequenceRandom {
    /// An empty list behaves like a constant `0.0`
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f64 {
        match self.values.pop_front() {
            Some(value) => {
                self.values.push_back(value);
                value
            }
            None => 0.0,
        }
    }
}

/// Something that can wait for a duration
#[async_trait]
pub trait DelaySource: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Waits on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl DelaySource for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl DelaySource for NoDelay {
    async fn sleep(&self, _duration: Duration) {}
}
