//! Bounded retry with uniform-random jitter
//!
//! Every network-facing call in the pipeline goes through the same
//! `RetryPolicy`. Call sites are classified as fatal-on-exhaustion (dedup
//! index load, tabular appends, session init) or recoverable-on-exhaustion
//! (detail fetches, reference fetches, blob uploads, scroll-to-stable); the
//! classification controls the logging register here, while the caller
//! decides whether to propagate the final error or degrade to a sentinel.
//!
//! The jittered inter-attempt delay doubles as the pipeline's pacing delay:
//! the same uniform range is used at every mandatory wait point (login,
//! scroll, detail-page load) to avoid a deterministic automated-access
//! signature.

use crate::config::RetryConfig;
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// What exhausting all attempts at a call site means for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnExhaustion {
    /// The run cannot meaningfully continue; the caller propagates the error
    Fatal,
    /// The caller degrades to a sentinel or partial result and continues
    Recover,
}

/// Bounded-retry configuration applied identically at every call site
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay_min: Duration,
    delay_max: Duration,
}

impl RetryPolicy {
    /// Creates a policy with `max_attempts >= 1` and a jitter range in
    /// seconds. Ranges are validated at config load; this constructor
    /// clamps rather than panics.
    pub fn new(max_attempts: u32, delay_min_secs: f64, delay_max_secs: f64) -> Self {
        let min = delay_min_secs.max(0.0);
        let max = delay_max_secs.max(min);
        Self {
            max_attempts: max_attempts.max(1),
            delay_min: Duration::from_secs_f64(min),
            delay_max: Duration::from_secs_f64(max),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.delay_min_secs,
            config.delay_max_secs,
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Sleeps for a uniformly random duration drawn from the jitter range.
    ///
    /// This is the single mandatory wait point primitive: login pauses,
    /// scroll pauses, and inter-attempt delays all come through here.
    pub async fn pause(&self) {
        let min_ms = self.delay_min.as_millis() as u64;
        let max_ms = self.delay_max.as_millis() as u64;
        let jitter = rand::rng().random_range(min_ms..=max_ms);
        sleep(Duration::from_millis(jitter)).await;
    }

    /// Runs `op` up to `max_attempts` times with a jittered delay between
    /// attempts.
    ///
    /// On success the value is returned immediately. On exhaustion the last
    /// error is returned either way; `on_exhaustion` only selects the
    /// logging register (`error!` for fatal call sites, `warn!` for
    /// best-effort ones).
    pub async fn run<T, E, F, Fut>(
        &self,
        label: &str,
        on_exhaustion: OnExhaustion,
        mut op: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt < self.max_attempts {
                        tracing::warn!(
                            "{}: attempt {}/{} failed: {}. Retrying after jittered delay.",
                            label,
                            attempt,
                            self.max_attempts,
                            error
                        );
                        self.pause().await;
                    } else {
                        match on_exhaustion {
                            OnExhaustion::Fatal => tracing::error!(
                                "{}: all {} attempts failed: {}",
                                label,
                                self.max_attempts,
                                error
                            ),
                            OnExhaustion::Recover => tracing::warn!(
                                "{}: all {} attempts failed: {}. Continuing degraded.",
                                label,
                                self.max_attempts,
                                error
                            ),
                        }
                        return Err(error);
                    }
                }
            }
        }
    }
}
