//! Request and response types exchanged with the analysis service.

use review_common::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::aggregate::SentimentBucket;

/// A single review to analyze.
///
/// Holds the trimmed text; construction rejects empty or whitespace-only input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    text: String,
}

impl AnalysisRequest {
    /// Form field the analysis service reads the review from.
    pub const FIELD: &'static str = "review";

    pub fn new(text: impl AsRef<str>) -> Result<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("review text cannot be empty".into()));
        }
        Ok(Self {
            text: trimmed.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Body fields for the form-encoded POST.
    pub fn form(&self) -> [(&'static str, &str); 1] {
        [(Self::FIELD, self.text.as_str())]
    }
}

/// Sentiment judgment for one aspect of a review.
///
/// Decoding is lenient: missing or `null` text fields become empty strings and
/// a score that is not a number (or a numeric string) becomes `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub aspect: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub opinion: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sentiment: String,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub context: String,
}

impl AspectResult {
    pub fn new(aspect: impl Into<String>, sentiment: impl Into<String>, score: f64) -> Self {
        Self {
            aspect: aspect.into(),
            opinion: String::new(),
            sentiment: sentiment.into(),
            score,
            context: String::new(),
        }
    }

    pub fn with_opinion(mut self, opinion: impl Into<String>) -> Self {
        self.opinion = opinion.into();
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Display bucket for this aspect alone.
    pub fn bucket(&self) -> SentimentBucket {
        SentimentBucket::classify(&self.sentiment)
    }

    /// Score usable for averaging; non-finite values count as zero.
    pub fn confidence(&self) -> f64 {
        if self.score.is_finite() {
            self.score
        } else {
            0.0
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_score<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let score = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if score.is_finite() { score } else { 0.0 })
}
