//! Simulated AQI lookups
//!
//! Stands in for a real air quality API: waits a random delay, then either
//! fails or returns a uniformly random AQI. Locations on the deny-list always
//! fail with a "no data" error.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

use super::{AqiSource, DelaySource, RandomSource, RngSource, TokioDelay};
use crate::config::SimulationConfig;
use crate::models::LocationQuery;
use crate::{AirQualityError, Result};

const RANDOM_FAILURE_MESSAGE: &str = "Simulated random server error. Please try again.";

/// Data source producing random AQI values after a random delay
pub struct SimulatedSource<R = RngSource, D = TokioDelay> {
    settings: SimulationConfig,
    random: Mutex<R>,
    delay: D,
}

impl SimulatedSource {
    /// Simulated source on the tokio timer, seeded from the settings
    #[must_use]
    pub fn from_config(settings: SimulationConfig) -> Self {
        let random = RngSource::from_seed_option(settings.seed);
        Self::new(settings, random, TokioDelay)
    }
}

impl<R: RandomSource, D: DelaySource> SimulatedSource<R, D> {
    pub fn new(settings: SimulationConfig, random: R, delay: D) -> Self {
        Self {
            settings,
            random: Mutex::new(random),
            delay,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SimulationConfig {
        &self.settings
    }

    fn random(&self) -> MutexGuard<'_, R> {
        self.random.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unit(&self) -> f64 {
        self.random().next_unit().clamp(0.0, 1.0)
    }

    /// Delay in `[min_delay, max_delay)`, or exactly `min_delay` when the
    /// two are equal
    fn draw_delay(&self) -> Duration {
        let span = self
            .settings
            .max_delay_ms
            .saturating_sub(self.settings.min_delay_ms);
        let extra = ((self.unit() * span as f64).floor() as u64).min(span.saturating_sub(1));
        Duration::from_millis(self.settings.min_delay_ms + extra)
    }

    /// Uniform AQI in `[0, max_aqi]`
    fn draw_aqi(&self) -> i32 {
        let max_aqi = self.settings.max_aqi.max(0);
        let value = (self.unit() * (f64::from(max_aqi) + 1.0)).floor();
        // float-to-int `as` saturates, so i32::MAX stays in range
        (value as i32).min(max_aqi)
    }

    fn is_denied(&self, location: &LocationQuery) -> bool {
        let normalized = location.normalized();
        self.settings
            .deny_list
            .iter()
            .any(|entry| entry.trim().to_lowercase() == normalized)
    }
}

#[async_trait]
impl<R: RandomSource, D: DelaySource> AqiSource for SimulatedSource<R, D> {
    #[tracing::instrument(name = "simulated_fetch", skip_all, fields(location = %location))]
    async fn fetch(&self, location: &LocationQuery) -> Result<i32> {
        let delay = self.draw_delay();
        debug!(delay_ms = delay.as_millis() as u64, "Simulating network delay");
        self.delay.sleep(delay).await;

        if self.is_denied(location) {
            debug!("Location is on the deny-list");
            return Err(AirQualityError::no_data(location.name()));
        }

        let roll = self.unit();
        if roll < self.settings.failure_probability {
            debug!(roll, "Simulated random failure");
            return Err(AirQualityError::fetch(RANDOM_FAILURE_MESSAGE));
        }

        let aqi = self.draw_aqi();
        debug!(aqi, "Simulated lookup succeeded");
        Ok(aqi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{NoDelay, SequenceRandom};
    use std::sync::Arc;

    /// Records every requested delay instead of waiting
    #[derive(Default, Clone)]
    struct RecordingDelay {
        requested: Arc<Mutex<Vec<Duration>>>,
    }

    #[async_trait]
    impl DelaySource for RecordingDelay {
        async fn sleep(&self, duration: Duration) {
            self.requested.lock().unwrap().push(duration);
        }
    }

    fn settings(failure_probability: f64) -> SimulationConfig {
        SimulationConfig {
            failure_probability,
            ..SimulationConfig::default()
        }
    }

    fn query(name: &str) -> LocationQuery {
        LocationQuery::parse(name).unwrap()
    }

    #[tokio::test]
    async fn test_zero_failure_probability_always_succeeds() {
        let source = SimulatedSource::new(settings(0.0), RngSource::seeded(1), NoDelay);
        for _ in 0..500 {
            let aqi = source.fetch(&query("Berlin")).await.unwrap();
            assert!((0..=300).contains(&aqi));
        }
    }

    #[tokio::test]
    async fn test_full_failure_probability_always_fails() {
        let source = SimulatedSource::new(settings(1.0), RngSource::seeded(2), NoDelay);
        for _ in 0..200 {
            let err = source.fetch(&query("Berlin")).await.unwrap_err();
            assert!(matches!(err, AirQualityError::Fetch { .. }));
            assert_eq!(err.user_message(), RANDOM_FAILURE_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_deny_list_fails_regardless_of_seed() {
        for seed in 0..50 {
            let source = SimulatedSource::new(settings(0.0), RngSource::seeded(seed), NoDelay);
            for name in ["london", "London", "  PARIS ", "tokyo"] {
                let err = source.fetch(&query(name)).await.unwrap_err();
                assert!(matches!(err, AirQualityError::NoData { .. }), "{name}");
            }
        }
    }

    #[tokio::test]
    async fn test_no_data_error_keeps_input_spelling() {
        let source = SimulatedSource::new(settings(0.0), SequenceRandom::new([0.5]), NoDelay);
        let err = source.fetch(&query("London")).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "Simulated error: No data is available for London."
        );
    }

    #[tokio::test]
    async fn test_empty_deny_list() {
        let config = SimulationConfig {
            deny_list: Vec::new(),
            ..settings(0.0)
        };
        let source = SimulatedSource::new(config, SequenceRandom::new([0.5]), NoDelay);
        assert!(source.fetch(&query("london")).await.is_ok());
    }

    #[tokio::test]
    async fn test_scripted_draws() {
        // delay, failure roll, aqi
        let random = SequenceRandom::new([0.25, 0.5, 0.999]);
        let delay = RecordingDelay::default();
        let source = SimulatedSource::new(settings(0.2), random, delay.clone());

        let aqi = source.fetch(&query("Berlin")).await.unwrap();
        assert_eq!(aqi, 300);
        assert_eq!(
            *delay.requested.lock().unwrap(),
            vec![Duration::from_millis(1250)]
        );
    }

    #[tokio::test]
    async fn test_roll_below_probability_fails() {
        let random = SequenceRandom::new([0.0, 0.19, 0.5]);
        let source = SimulatedSource::new(settings(0.2), random, NoDelay);
        let err = source.fetch(&query("Berlin")).await.unwrap_err();
        assert!(matches!(err, AirQualityError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_aqi_extremes() {
        let source = SimulatedSource::new(settings(0.0), SequenceRandom::new([0.0]), NoDelay);
        assert_eq!(source.fetch(&query("Berlin")).await.unwrap(), 0);

        // out-of-contract draws are clamped into range
        let source = SimulatedSource::new(settings(0.0), SequenceRandom::new([1.0]), NoDelay);
        assert_eq!(source.fetch(&query("Berlin")).await.unwrap(), 300);
    }

    #[tokio::test]
    async fn test_delay_stays_within_bounds() {
        let delay = RecordingDelay::default();
        let config = SimulationConfig {
            min_delay_ms: 1000,
            max_delay_ms: 3000,
            ..settings(0.0)
        };
        let source = SimulatedSource::new(config, RngSource::seeded(9), delay.clone());
        for _ in 0..100 {
            source.fetch(&query("Berlin")).await.unwrap();
        }
        for requested in delay.requested.lock().unwrap().iter() {
            assert!(*requested >= Duration::from_millis(1000));
            assert!(*requested < Duration::from_millis(3000));
        }
    }

    #[tokio::test]
    async fn test_fixed_delay() {
        let delay = RecordingDelay::default();
        let config = SimulationConfig {
            min_delay_ms: 500,
            max_delay_ms: 500,
            ..settings(0.0)
        };
        let source = SimulatedSource::new(config, SequenceRandom::new([0.9]), delay.clone());
        source.fetch(&query("Berlin")).await.unwrap();
        assert_eq!(
            *delay.requested.lock().unwrap(),
            vec![Duration::from_millis(500)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_config_waits_on_timer() {
        let config = SimulationConfig {
            seed: Some(3),
            ..settings(0.0)
        };
        let source = SimulatedSource::from_config(config);
        let start = tokio::time::Instant::now();
        source.fetch(&query("Berlin")).await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(2100));
    }

    #[tokio::test]
    async fn test_largest_max_aqi_does_not_overflow() {
        let config = SimulationConfig {
            max_aqi: i32::MAX,
            ..settings(0.0)
        };
        let source = SimulatedSource::new(config, SequenceRandom::new([1.0]), NoDelay);
        assert_eq!(source.fetch(&query("Berlin")).await.unwrap(), i32::MAX);

        let config = SimulationConfig {
            max_aqi: i32::MAX,
            ..settings(0.0)
        };
        let source = SimulatedSource::new(config, RngSource::seeded(4), NoDelay);
        for _ in 0..50 {
            assert!(source.fetch(&query("Berlin")).await.unwrap() >= 0);
        }
    }
}
