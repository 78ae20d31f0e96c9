//! Aspect aggregation.
//!
//! Reduces a list of per-aspect judgments to one summary: counts per
//! sentiment bucket, an overall verdict by majority vote, and the mean
//! confidence as a percentage.

use serde::Serialize;
use std::fmt;

use crate::model::AspectResult;

/// One of the three buckets a free-form sentiment label falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentBucket {
    Positive,
    Negative,
    Neutral,
}

impl SentimentBucket {
    /// Classify a label by case-insensitive substring match.
    ///
    /// "positive" is checked before "negative"; anything matching neither,
    /// including empty or garbled labels, is neutral.
    pub fn classify(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("positive") {
            Self::Positive
        } else if label.contains("negative") {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for SentimentBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        })
    }
}

/// Overall verdict for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallSentiment {
    Positive,
    Negative,
    Mixed,
    Neutral,
}

impl OverallSentiment {
    /// Majority vote with the tie-break order:
    /// strict positive majority, strict negative majority, any non-neutral
    /// judgment (mixed), otherwise neutral.
    pub fn decide(positive: usize, negative: usize, neutral: usize) -> Self {
        if positive > negative && positive > neutral {
            Self::Positive
        } else if negative > positive && negative > neutral {
            Self::Negative
        } else if positive > 0 || negative > 0 {
            Self::Mixed
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for OverallSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Mixed => "Mixed",
            Self::Neutral => "Neutral",
        })
    }
}

/// Summary derived from one analysis result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub total_aspects: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub overall_sentiment: OverallSentiment,
    /// `100 * mean(score)`; 0 when there are no aspects.
    pub average_confidence_pct: f64,
}

impl AggregateSummary {
    /// True when the service identified no aspects; render a
    /// "no aspects identified" state instead of a report.
    pub fn is_empty(&self) -> bool {
        self.total_aspects == 0
    }

    pub fn bucket_count(&self, bucket: SentimentBucket) -> usize {
        match bucket {
            SentimentBucket::Positive => self.positive_count,
            SentimentBucket::Negative => self.negative_count,
            SentimentBucket::Neutral => self.neutral_count,
        }
    }
}

/// Aggregate a result list into a fresh summary.
pub fn aggregate(results: &[AspectResult]) -> AggregateSummary {
    let mut positive = 0;
    let mut negative = 0;
    let mut neutral = 0;

    for result in results {
        match SentimentBucket::classify(&result.sentiment) {
            SentimentBucket::Positive => positive += 1,
            SentimentBucket::Negative => negative += 1,
            SentimentBucket::Neutral => neutral += 1,
        }
    }

    let average_confidence_pct = if results.is_empty() {
        0.0
    } else {
        let total: f64 = results.iter().map(AspectResult::confidence).sum();
        100.0 * total / results.len() as f64
    };

    AggregateSummary {
        total_aspects: results.len(),
        positive_count: positive,
        negative_count: negative,
        neutral_count: neutral,
        overall_sentiment: OverallSentiment::decide(positive, negative, neutral),
        average_confidence_pct,
    }
}
