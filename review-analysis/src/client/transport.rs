use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::ClientConfig;
use crate::model::AnalysisRequest;

/// Raw HTTP answer, before any classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// Failure below HTTP: no status code was received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// One outbound request to the analysis service.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &AnalysisRequest) -> Result<TransportResponse, TransportError>;
}

/// Transport that posts the review as a form to a fixed endpoint.
pub struct HttpTransport {
    endpoint: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            client: Client::builder()
                .timeout(config.timeout)
                .connect_timeout(config.connect_timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &AnalysisRequest) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&request.form())
            .send()
            .await?;

        // Once a status line has arrived the answer is classified by it, even
        // if the body is cut off.
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(status, error = %e, "Failed to read response body");
                String::new()
            }
        };

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(TransportResponse::new(200, "[]").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(429, "").is_success());
        assert!(TransportResponse::new(429, "").is_rate_limited());
        assert!(!TransportResponse::new(500, "").is_rate_limited());
    }

    #[test]
    fn keeps_configured_endpoint() {
        let config = ClientConfig::default().with_endpoint("http://127.0.0.1:9999/work/single");
        let transport = HttpTransport::new(&config);
        assert_eq!(transport.endpoint(), "http://127.0.0.1:9999/work/single");
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            TransportError::Connect("refused".into()).to_string(),
            "connection failed: refused"
        );
        assert_eq!(
            TransportError::Timeout("30s".into()).to_string(),
            "request timed out: 30s"
        );
    }
}
