//! Retry loop around a single submission.
//!
//! Rate limits and transport failures draw from one shared attempt budget and
//! back off exponentially; any other HTTP status ends the submission at once.

use review_common::logging::generate_trace_id;
use review_common::util::truncate_with_ellipsis;
use review_common::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::submission::Submission;
use super::{AnalysisOutcome, ClientConfig, HttpTransport, ResilienceConfig, Transport};
use super::{TransportError, TransportResponse};
use crate::model::{AnalysisRequest, AspectResult};

/// Longest response body excerpt written to logs.
const LOG_BODY_CHARS: usize = 200;

/// Failure that the budget allows retrying.
enum Retryable {
    RateLimited,
    Transport(TransportError),
}

/// Client that submits reviews with bounded retries.
///
/// Cloning is cheap and clones share the transport.
#[derive(Clone)]
pub struct ResilientClient {
    transport: Arc<dyn Transport>,
    config: ResilienceConfig,
}

impl ResilientClient {
    /// Create a client that posts to `config.endpoint` over HTTP.
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(
            Arc::new(HttpTransport::new(config)),
            config.resilience.clone(),
        )
    }

    /// Create a client over any transport.
    pub fn with_transport(transport: Arc<dyn Transport>, config: ResilienceConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ResilienceConfig {
        &self.config
    }

    /// Calculate backoff delay after a given zero-based attempt.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.config.backoff_delay(attempt)
    }

    /// Validate `text` and submit it, running the retry loop to completion.
    pub async fn analyze(&self, text: &str) -> AnalysisOutcome {
        self.analyze_with_id(&generate_trace_id(), text).await
    }

    /// Like [`analyze`](Self::analyze), but gives up as soon as `cancel` fires.
    ///
    /// Returns `None` when the submission was abandoned. Cancellation drops the
    /// pending backoff timer or in-flight request, so nothing runs afterwards.
    pub async fn analyze_until_cancelled(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Option<AnalysisOutcome> {
        self.run_until_cancelled(&generate_trace_id(), text, cancel).await
    }

    pub(crate) async fn run_until_cancelled(
        &self,
        id: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Option<AnalysisOutcome> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(submission = %id, "Submission abandoned");
                None
            }
            outcome = self.analyze_with_id(id, text) => Some(outcome),
        }
    }

    /// Run one submission inside a `submission` span tagged with `id`.
    async fn analyze_with_id(&self, id: &str, text: &str) -> AnalysisOutcome {
        let span = tracing::info_span!("submission", id = %id);
        async {
            let request = match AnalysisRequest::new(text) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!(error = %e, "Rejected review before sending");
                    let reason = match e {
                        Error::InvalidInput(reason) => reason,
                        other => other.to_string(),
                    };
                    return AnalysisOutcome::ValidationError { reason };
                }
            };

            tracing::debug!(chars = request.text().chars().count(), "Submitting review");
            self.submit(&request).await
        }
        .instrument(span)
        .await
    }

    /// Run the submission on the tokio runtime and return a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, text: impl Into<String>) -> Submission {
        Submission::spawn(self.clone(), text.into())
    }

    /// Send an already validated request through the retry loop.
    pub async fn submit(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        let max_attempts = self.config.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            let attempts = attempt + 1;

            let failure = match self.transport.send(request).await {
                Ok(response) if response.is_success() => {
                    return self.decode(response, attempts);
                }
                Ok(response) if response.is_rate_limited() => Retryable::RateLimited,
                Ok(response) => {
                    tracing::warn!(
                        status = response.status,
                        attempt = attempts,
                        body = %truncate_with_ellipsis(&response.body, LOG_BODY_CHARS),
                        "Analysis request rejected"
                    );
                    return AnalysisOutcome::HttpError {
                        status: response.status,
                        body: response.body,
                        attempts,
                    };
                }
                Err(e) => Retryable::Transport(e),
            };

            if attempts >= max_attempts {
                return match failure {
                    Retryable::RateLimited => {
                        tracing::warn!(attempts, "Still rate limited, giving up");
                        AnalysisOutcome::RetriesExhausted { attempts }
                    }
                    Retryable::Transport(e) => {
                        tracing::error!(attempts, error = %e, "Analysis service unreachable");
                        AnalysisOutcome::NetworkError {
                            cause: e.to_string(),
                            attempts,
                        }
                    }
                };
            }

            let delay = self.backoff_delay(attempt);
            match &failure {
                Retryable::RateLimited => tracing::warn!(
                    attempt = attempts,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, retrying"
                ),
                Retryable::Transport(e) => tracing::warn!(
                    attempt = attempts,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Request failed, retrying"
                ),
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn decode(&self, response: TransportResponse, attempts: u32) -> AnalysisOutcome {
        match serde_json::from_str::<Vec<AspectResult>>(&response.body) {
            Ok(results) => {
                if attempts > 1 {
                    tracing::info!(attempt = attempts, "Analysis recovered after retries");
                }
                tracing::debug!(aspects = results.len(), "Analysis succeeded");
                AnalysisOutcome::Success { results, attempts }
            }
            Err(e) => {
                tracing::warn!(
                    status = response.status,
                    error = %e,
                    body = %truncate_with_ellipsis(&response.body, LOG_BODY_CHARS),
                    "Malformed analysis response"
                );
                AnalysisOutcome::HttpError {
                    status: response.status,
                    body: response.body,
                    attempts,
                }
            }
        }
    }
}
