//! Monthly pipeline: aggregated summary in, summary with narrative out

use crate::client::{request_completion, Completion};
use crate::identity::{enforce_identity, Identity};
use crate::prompt::build_monthly_prompt;
use crate::schema::MonthlyNarrative;
use crate::validator::{parse_structured, Parsed};
use insights_core::MonthlySummary;
use std::time::Duration;

/// Ask for a monthly narrative; a failed call or unusable completion yields
/// the deterministic fallback.
pub async fn request_monthly_narrative<G: Completion>(
    generator: &G,
    summary: &MonthlySummary,
    identity: &Identity,
    timeout: Duration,
) -> Parsed<MonthlyNarrative> {
    let prompt = build_monthly_prompt(summary, identity);
    let fallback = || MonthlyNarrative::fallback(summary, identity);

    let parsed = match request_completion(generator, &prompt, timeout).await {
        Ok(text) => parse_structured(&text, fallback),
        Err(e) => {
            tracing::warn!(
                error = %e,
                window = %summary.window.label(),
                "monthly generation failed, using fallback"
            );
            Parsed::Fallback(fallback())
        }
    };

    // Counts and identity come from the data, not the model
    parsed.map(|mut narrative| {
        narrative.student_name = identity.name.clone();
        narrative.total_observations = summary.total_observations;
        narrative.observations = enforce_identity(&narrative.observations, identity);
        narrative
    })
}

/// Fold a narrative into the summary's text fields
pub fn apply_narrative(
    mut summary: MonthlySummary,
    narrative: Parsed<MonthlyNarrative>,
) -> MonthlySummary {
    match narrative {
        Parsed::Structured(n) => {
            summary.narrative_text = n.observations;
            if !n.recommendations.is_empty() {
                summary.recommendations = n.recommendations;
            }
            summary.progress_insights = n.progress_insights;
        }
        Parsed::Fallback(n) => {
            // The aggregator's own narrative already states the month's numbers
            if summary.recommendations.is_empty() {
                summary.recommendations = n.recommendations;
            }
            summary.progress_insights = n.progress_insights;
        }
    }
    summary
}

/// Attach a generated monthly narrative to `summary`. Never fails.
pub async fn synthesize_monthly<G: Completion>(
    generator: &G,
    summary: MonthlySummary,
    identity: &Identity,
    timeout: Duration,
) -> MonthlySummary {
    let narrative = request_monthly_narrative(generator, &summary, identity, timeout).await;
    tracing::info!(
        window = %summary.window.label(),
        fallback = narrative.is_fallback(),
        "monthly narrative ready"
    );
    apply_narrative(summary, narrative)
}
