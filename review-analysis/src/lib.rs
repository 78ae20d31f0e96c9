//! Review Analysis - submit a review for aspect-based sentiment analysis and
//! summarize the result.
//!
//! Two pieces, used in sequence:
//! - [`client`]: a resilient client that posts one review to the analysis
//!   endpoint, retries rate limits and transport failures with exponential
//!   backoff, and reports exactly one [`AnalysisOutcome`]
//! - [`aggregate`]: a pure reduction from the returned aspect list to an
//!   [`AggregateSummary`] (majority vote plus average confidence)
//!
//! ```no_run
//! use review_analysis::{aggregate, AnalysisOutcome, ClientConfig, ResilientClient};
//!
//! # async fn run() {
//! let client = ResilientClient::new(&ClientConfig::default());
//! if let AnalysisOutcome::Success { results, .. } = client.analyze("The battery is great").await {
//!     let summary = aggregate(&results);
//!     println!("{} ({} aspects)", summary.overall_sentiment, summary.total_aspects);
//! }
//! # }
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod aggregate;
pub mod client;
pub mod model;

pub use aggregate::{aggregate, AggregateSummary, OverallSentiment, SentimentBucket};
pub use client::{
    AnalysisOutcome, ClientConfig, HttpTransport, ResilienceConfig, ResilientClient, Submission,
    SubmissionSlot, Transport, TransportError, TransportResponse,
};
pub use model::{AnalysisRequest, AspectResult};
