//! Configuration validation.
//!
//! Checks that configuration values are present and within valid ranges
//! before a client is built from them.

use thiserror::Error;

use crate::config::{ClientSettings, Config, ObservabilityConfig};
use crate::error::Error;

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Config(e.to_string())
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["json", "pretty"];

fn invalid(field: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    if errors.is_empty() {
        Ok(())
    } else if errors.len() == 1 {
        Err(errors.remove(0))
    } else {
        Err(ValidationError::Multiple(errors))
    }
}

impl Validate for ClientSettings {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if self.endpoint.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                field: "client.endpoint".into(),
            });
        } else {
            match url::Url::parse(&self.endpoint) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => errors.push(invalid(
                    "client.endpoint",
                    format!("unsupported scheme '{}'", url.scheme()),
                )),
                Err(e) => errors.push(invalid("client.endpoint", e.to_string())),
            }
        }

        if self.base_backoff_ms == 0 {
            errors.push(invalid("client.base_backoff_ms", "must be greater than 0"));
        }

        if self.max_backoff_ms < self.base_backoff_ms {
            errors.push(invalid(
                "client.max_backoff_ms",
                format!(
                    "must be at least base_backoff_ms ({})",
                    self.base_backoff_ms
                ),
            ));
        }

        if self.timeout_secs == 0 {
            errors.push(invalid("client.timeout_secs", "must be greater than 0"));
        }

        collect(errors)
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(invalid(
                "observability.log_level",
                format!("expected one of {:?}", LOG_LEVELS),
            ));
        }

        if !LOG_FORMATS.contains(&self.log_format.as_str()) {
            errors.push(invalid(
                "observability.log_format",
                format!("expected one of {:?}", LOG_FORMATS),
            ));
        }

        collect(errors)
    }
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.client.validate() {
            errors.push(e);
        }

        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }

        collect(errors)
    }

    /// Validate and hand the configuration back, or fail with [`Error::Config`].
    pub fn validated(self) -> crate::Result<Self> {
        self.validate()?;
        Ok(self)
    }
}
