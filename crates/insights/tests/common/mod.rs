#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use insights_core::{
    Goal, GoalAlignment, GoalStatus, NarrativeReport, ObservationRecord, StructuredFields,
};
use insights_synth::{Completion, GenerationError};

pub const SUBJECT: &str = "child-1";

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn observation(
    id: &str,
    date: NaiveDate,
    narrative: &str,
    strengths: &[&str],
) -> ObservationRecord {
    ObservationRecord {
        id: id.to_string(),
        subject_id: SUBJECT.to_string(),
        date,
        created_at: Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap()),
        raw_text: format!("notes for {id}"),
        narrative_report: NarrativeReport::Generated(narrative.to_string()),
        structured_fields: StructuredFields {
            strengths: strengths.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        },
    }
}

pub fn goal(id: &str, status: GoalStatus, scores: &[(&str, f64)]) -> Goal {
    Goal {
        id: id.to_string(),
        subject_id: SUBJECT.to_string(),
        text: format!("Goal {id}"),
        status,
        alignments: scores
            .iter()
            .map(|(observation_id, score)| GoalAlignment {
                observation_id: observation_id.to_string(),
                score: *score,
            })
            .collect(),
    }
}

/// A narrative shaped like the daily template
pub fn template_narrative(name: &str, engagement: u8, growth: u8) -> String {
    format!(
        "🧒 Child's Name: {name}\n\
         📅 Date: [2025-03-04]\n\
         🗣️ Communication Skills:\n\
         Confidence level: Strong\n\
         Clarity of thought: Clear\n\
         📊 Growth Metrics:\n\
         🧠 Intellectual | ✅ Good\n\
         🤝 Social | 🟢 Excellent\n\
         🌈 Engagement Index: {engagement}/10\n\
         Overall Growth Score: {growth}/7\n\
         Legend: Engagement Index: 5/10 means average\n"
    )
}

/// Replies with a fixed completion regardless of prompt
pub struct Fixed(pub String);

impl Completion for Fixed {
    async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(self.0.clone())
    }
}

/// Answers field-extraction prompts with `fields` and everything else with `narrative`
pub struct Scripted {
    pub narrative: String,
    pub fields: String,
}

impl Completion for Scripted {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        if prompt.starts_with("Extract structured information") {
            Ok(self.fields.clone())
        } else {
            Ok(self.narrative.clone())
        }
    }
}
