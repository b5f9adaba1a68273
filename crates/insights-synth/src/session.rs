//! Daily session pipeline: notes in, immutable observation record out

use crate::client::{request_completion, Completion};
use crate::identity::{enforce_identity, Identity};
use crate::prompt::{build_prompt, ReportTemplate};
use crate::schema::SessionFields;
use crate::validator::{parse_structured, Parsed};
use chrono::{DateTime, NaiveDate, Utc};
use insights_core::{NarrativeReport, ObservationRecord};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

static NAME_HEADER_RE: OnceLock<Regex> = OnceLock::new();
static METRIC_LABEL_RE: OnceLock<Regex> = OnceLock::new();

fn name_header_re() -> &'static Regex {
    NAME_HEADER_RE.get_or_init(|| Regex::new(r"(?im)^\W*child['’]?s\s+name\s*:").unwrap())
}

fn metric_label_re() -> &'static Regex {
    METRIC_LABEL_RE.get_or_init(|| {
        Regex::new(r"(?i)(?:engagement|curiosity\s+response)\s+index|growth\s+score").unwrap()
    })
}

/// A daily narrative must carry the name header and a metric label the extractor reads
pub fn is_template_conformant(narrative: &str) -> bool {
    name_header_re().is_match(narrative) && metric_label_re().is_match(narrative)
}

/// Template-shaped narrative used when generation fails. Carries no metrics.
pub fn fallback_narrative(raw_text: &str, identity: &Identity, date: NaiveDate) -> String {
    let notes = raw_text.trim();
    let notes = if notes.is_empty() { "(no notes recorded)" } else { notes };
    format!(
        "Child's Name: {name}\n\
         Date: [{date}]\n\n\
         Daily Insights could not be generated for this session. \
         The observer's notes are kept below for review.\n\n\
         Observer Notes:\n{notes}\n",
        name = identity.name,
    )
}

/// Alternate `Observer:` and `Child:` over the non-empty lines of `raw_text`
pub fn basic_dialogue(raw_text: &str) -> String {
    let lines: Vec<String> = raw_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
        .map(|(i, line)| {
            let speaker = if i % 2 == 0 { "Observer" } else { "Child" };
            format!("{speaker}: {line}")
        })
        .collect();

    if lines.is_empty() {
        return [
            "Observer: Can you tell me about what you learned today?",
            "Child: I learned something new today.",
            "Observer: That's wonderful! Can you tell me more about it?",
            "Child: Yes, I enjoyed learning about this topic.",
        ]
        .join("\n");
    }
    lines.join("\n")
}

fn record_id(created_at: DateTime<Utc>) -> String {
    format!("obs_{:x}", created_at.timestamp_nanos_opt().unwrap_or_default())
}

/// Generate the narrative and structured fields for one session.
///
/// Never fails: a generation problem yields a record whose narrative is
/// marked as fallback and whose lists are empty.
pub async fn synthesize_session<G: Completion>(
    generator: &G,
    raw_text: &str,
    identity: &Identity,
    subject_id: &str,
    date: NaiveDate,
    timeout: Duration,
) -> ObservationRecord {
    let narrative_prompt = build_prompt(
        raw_text,
        identity,
        ReportTemplate::DailyNarrative { session_date: date },
    );
    let fields_prompt = build_prompt(
        raw_text,
        identity,
        ReportTemplate::SessionFields { session_date: date },
    );

    let (narrative, fields) = tokio::join!(
        request_completion(generator, &narrative_prompt, timeout),
        request_completion(generator, &fields_prompt, timeout),
    );

    let narrative_report = match narrative {
        Ok(text) if is_template_conformant(&text) => {
            NarrativeReport::Generated(enforce_identity(text.trim(), identity))
        }
        Ok(text) => {
            tracing::warn!(
                subject = subject_id,
                chars = text.chars().count(),
                "narrative ignored the report template, using fallback"
            );
            NarrativeReport::Fallback(fallback_narrative(raw_text, identity, date))
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                subject = subject_id,
                "narrative generation failed, using fallback"
            );
            NarrativeReport::Fallback(fallback_narrative(raw_text, identity, date))
        }
    };

    let fallback_fields = || SessionFields::fallback(raw_text, identity, date);
    let parsed = match fields {
        Ok(text) => parse_structured(&text, fallback_fields),
        Err(e) => {
            tracing::warn!(
                error = %e,
                subject = subject_id,
                "field extraction failed, using fallback"
            );
            Parsed::Fallback(fallback_fields())
        }
    };
    let mut fields = parsed.into_inner();
    fields.student_name = identity.name.clone();

    let created_at = Utc::now();
    let record = ObservationRecord {
        id: record_id(created_at),
        subject_id: subject_id.to_string(),
        date,
        created_at,
        raw_text: raw_text.to_string(),
        narrative_report,
        structured_fields: fields.into_structured_fields(),
    };
    tracing::info!(
        id = %record.id,
        subject = subject_id,
        %date,
        fallback = record.narrative_report.is_fallback(),
        "session synthesized"
    );
    record
}
