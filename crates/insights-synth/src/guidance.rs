//! Observer guidance: session topic suggestions and listening reviews

use crate::client::{request_completion, Completion};
use crate::identity::Identity;
use crate::prompt::{build_review_prompt, build_topic_prompt};
use crate::schema::{CommunicationReview, TopicSuggestions};
use crate::validator::{parse_structured, Parsed};
use insights_core::ObservationRecord;
use std::time::Duration;

/// Suggest topics for the next session from `history` (oldest first). Never fails.
pub async fn suggest_topics<G: Completion>(
    generator: &G,
    history: &[ObservationRecord],
    identity: &Identity,
    timeout: Duration,
) -> Parsed<TopicSuggestions> {
    let prompt = build_topic_prompt(history, identity);
    let fallback = || TopicSuggestions::fallback(identity);

    let parsed = match request_completion(generator, &prompt, timeout).await {
        Ok(text) => parse_structured(&text, fallback),
        Err(e) => {
            tracing::warn!(error = %e, "topic suggestion failed, using fallback");
            Parsed::Fallback(fallback())
        }
    };
    tracing::info!(
        history = history.len(),
        topics = parsed.value().topics.len(),
        fallback = parsed.is_fallback(),
        "topics suggested"
    );
    parsed
}

/// Review the observer's side of a conversation transcript. Never fails.
pub async fn review_communication<G: Completion>(
    generator: &G,
    transcript: &str,
    identity: &Identity,
    observer: &str,
    timeout: Duration,
) -> Parsed<CommunicationReview> {
    let prompt = build_review_prompt(transcript, identity, observer);
    let fallback = || CommunicationReview::fallback(identity);

    let parsed = match request_completion(generator, &prompt, timeout).await {
        Ok(text) => parse_structured(&text, fallback),
        Err(e) => {
            tracing::warn!(error = %e, observer, "communication review failed, using fallback");
            Parsed::Fallback(fallback())
        }
    };
    tracing::info!(
        red_flags = parsed.value().red_flags.len(),
        fallback = parsed.is_fallback(),
        "communication review ready"
    );
    parsed
}
