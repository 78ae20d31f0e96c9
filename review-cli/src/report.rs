//! Plain-text rendering of analysis outcomes.

use review_analysis::{aggregate, AnalysisOutcome, AspectResult};
use review_common::util::{format_percent, truncate_with_ellipsis};
use std::fmt::Write;

const CONTEXT_CHARS: usize = 80;

/// Render an outcome the way the result page shows it.
pub fn render(outcome: &AnalysisOutcome) -> String {
    match outcome.results() {
        Some(results) => render_report(results),
        None => format!("Analysis failed: {}\n", outcome),
    }
}

fn render_report(results: &[AspectResult]) -> String {
    let summary = aggregate(results);
    let mut out = String::new();

    if summary.is_empty() {
        out.push_str("No aspects identified in this review.\n");
        return out;
    }

    let _ = writeln!(out, "Overall sentiment: {}", summary.overall_sentiment);
    let _ = writeln!(
        out,
        "Average confidence: {}",
        format_percent(summary.average_confidence_pct)
    );
    let _ = writeln!(
        out,
        "Aspects: {} ({} positive, {} negative, {} neutral)",
        summary.total_aspects, summary.positive_count, summary.negative_count, summary.neutral_count
    );
    out.push('\n');

    for result in results {
        let _ = write!(
            out,
            "  [{}] {} ({})",
            result.bucket(),
            result.aspect,
            format_percent(result.confidence() * 100.0)
        );
        if !result.opinion.is_empty() && result.opinion != "N/A" {
            let _ = write!(out, " - {}", result.opinion);
        }
        out.push('\n');
        if !result.context.is_empty() {
            let _ = writeln!(
                out,
                "      \"{}\"",
                truncate_with_ellipsis(&result.context, CONTEXT_CHARS)
            );
        }
    }

    out
}
