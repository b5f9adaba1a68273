//! Observation, goal and metric records

use crate::ratings::{CommunicationLevel, CommunicationSkill, GrowthArea, GrowthRating};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Narrative text attached to an observation.
///
/// A fallback narrative is template filler written when generation failed; it
/// carries no numeric signal and is skipped by metric extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum NarrativeReport {
    Generated(String),
    Fallback(String),
}

impl NarrativeReport {
    pub fn text(&self) -> &str {
        match self {
            NarrativeReport::Generated(text) | NarrativeReport::Fallback(text) => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, NarrativeReport::Fallback(_))
    }
}

/// Lists and tags recovered from a session's notes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredFields {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_of_development: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub theme_of_day: Option<String>,
    #[serde(default)]
    pub curiosity_seed: Option<String>,
}

/// One recorded session. Immutable once created; corrections are new records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRecord {
    pub id: String,
    pub subject_id: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub raw_text: String,
    pub narrative_report: NarrativeReport,
    #[serde(default)]
    pub structured_fields: StructuredFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Achieved,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Achieved => "achieved",
        }
    }
}

/// Evidence linking one observation to a goal, scored 0-10
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalAlignment {
    pub observation_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub subject_id: String,
    pub text: String,
    pub status: GoalStatus,
    #[serde(default)]
    pub alignments: Vec<GoalAlignment>,
}

/// Metrics recovered from one narrative. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    pub date: Option<NaiveDate>,
    /// 0-10
    pub engagement_index: Option<u8>,
    /// 0-7
    pub growth_score: Option<u8>,
    pub communication_ratings: BTreeMap<CommunicationSkill, CommunicationLevel>,
    pub growth_area_ratings: BTreeMap<GrowthArea, GrowthRating>,
}

impl MetricSample {
    pub fn is_empty(&self) -> bool {
        self.engagement_index.is_none()
            && self.growth_score.is_none()
            && self.communication_ratings.is_empty()
            && self.growth_area_ratings.is_empty()
    }
}
