//! Resilient submission of a review to the analysis service.
//!
//! The [`ResilientClient`] wraps a [`Transport`] with a bounded retry loop:
//! rate limits (HTTP 429) and transport failures are retried with exponential
//! backoff from one shared budget, everything else is terminal. Each
//! submission produces exactly one [`AnalysisOutcome`].
//!
//! Submissions can be abandoned through a cancellation token, either directly
//! ([`ResilientClient::analyze_until_cancelled`]) or through a spawned
//! [`Submission`] handle. An abandoned submission never yields an outcome.

mod outcome;
mod resilient;
mod submission;
mod transport;

#[cfg(test)]
mod testing;

pub use outcome::AnalysisOutcome;
pub use resilient::ResilientClient;
pub use submission::{Submission, SubmissionSlot};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};

use review_common::ClientSettings;
use std::time::Duration;

/// Retry behavior for a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResilienceConfig {
    /// Retries after the first attempt. `0` means a single attempt.
    pub max_retries: u32,
    /// Base backoff delay in milliseconds (doubles with each retry).
    pub base_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff_ms: 1000,
            max_backoff_ms: 60_000,
        }
    }
}

impl ResilienceConfig {
    /// Total attempts the budget allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay after attempt `attempt` (zero-based): `base * 2^attempt`, capped.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self
            .base_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Everything needed to build a client against a real endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub resilience: ResilienceConfig,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from(&ClientSettings::default())
    }
}

impl From<&ClientSettings> for ClientConfig {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            resilience: ResilienceConfig {
                max_retries: settings.max_retries,
                base_backoff_ms: settings.base_backoff_ms,
                max_backoff_ms: settings.max_backoff_ms,
            },
            timeout: Duration::from_secs(settings.timeout_secs),
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs),
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_resilience(mut self, resilience: ResilienceConfig) -> Self {
        self.resilience = resilience;
        self
    }
}
