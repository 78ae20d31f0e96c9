use serde::Serialize;
use std::fmt;

use crate::aggregate::{aggregate, AggregateSummary};
use crate::model::AspectResult;

/// Terminal result of one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// 2xx response decoded into aspect results.
    Success {
        results: Vec<AspectResult>,
        attempts: u32,
    },
    /// Non-2xx status other than 429, or a 2xx body that failed to decode.
    HttpError {
        status: u16,
        body: String,
        attempts: u32,
    },
    /// Still rate limited after the last attempt the budget allowed.
    RetriesExhausted { attempts: u32 },
    /// The last attempt failed below HTTP (DNS, refused connection, timeout).
    NetworkError { cause: String, attempts: u32 },
    /// Rejected locally; no request was sent.
    ValidationError { reason: String },
}

impl AnalysisOutcome {
    /// Number of requests issued for this submission.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. }
            | Self::HttpError { attempts, .. }
            | Self::RetriesExhausted { attempts }
            | Self::NetworkError { attempts, .. } => *attempts,
            Self::ValidationError { .. } => 0,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn results(&self) -> Option<&[AspectResult]> {
        match self {
            Self::Success { results, .. } => Some(results.as_slice()),
            _ => None,
        }
    }

    /// Summary of a successful outcome.
    pub fn summary(&self) -> Option<AggregateSummary> {
        self.results().map(aggregate)
    }

    /// The server answered 2xx but the body was not an aspect list.
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::HttpError { status, .. } if (200..300).contains(status))
    }

    /// Human-readable reason for a failed outcome.
    ///
    /// For HTTP errors this prefers the `error` field of a JSON body such as
    /// `{"error": "Review text cannot be empty."}`, falling back to the raw body.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { body, .. } => Some(
                serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                    .unwrap_or_else(|| body.trim().to_string()),
            ),
            Self::RetriesExhausted { .. } => {
                Some("the analysis service is rate limiting requests".into())
            }
            Self::NetworkError { cause, .. } => Some(cause.clone()),
            Self::ValidationError { reason } => Some(reason.clone()),
        }
    }
}

impl fmt::Display for AnalysisOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { results, attempts } => write!(
                f,
                "analysis succeeded with {} aspect(s) after {} attempt(s)",
                results.len(),
                attempts
            ),
            Self::HttpError { status, attempts, .. } if self.is_malformed_response() => write!(
                f,
                "malformed response (HTTP {}) after {} attempt(s)",
                status, attempts
            ),
            Self::HttpError { status, .. } => write!(
                f,
                "HTTP {}: {}",
                status,
                self.error_message().unwrap_or_default()
            ),
            Self::RetriesExhausted { attempts } => write!(
                f,
                "rate limited; gave up after {} attempt(s)",
                attempts
            ),
            Self::NetworkError { cause, attempts } => write!(
                f,
                "network error after {} attempt(s): {}",
                attempts, cause
            ),
            Self::ValidationError { reason } => write!(f, "invalid input: {}", reason),
        }
    }
}
