//! Closed rating vocabularies used by the narrative template

use serde::{Serialize, Serializer};
use std::fmt;

/// Communication skills tracked in the daily narrative
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationSkill {
    Confidence,
    Clarity,
    Participation,
    Sequencing,
}

impl CommunicationSkill {
    pub const ALL: [CommunicationSkill; 4] = [
        CommunicationSkill::Confidence,
        CommunicationSkill::Clarity,
        CommunicationSkill::Participation,
        CommunicationSkill::Sequencing,
    ];

    /// Heading used in rendered tables
    pub fn label(self) -> &'static str {
        match self {
            CommunicationSkill::Confidence => "Confidence Level",
            CommunicationSkill::Clarity => "Clarity of Thought",
            CommunicationSkill::Participation => "Participation & Engagement",
            CommunicationSkill::Sequencing => "Sequence of Explanation",
        }
    }

    /// The words a narrative may use for this skill
    pub fn vocabulary(self) -> &'static [CommunicationLevel] {
        use CommunicationLevel::*;
        match self {
            CommunicationSkill::Confidence => &[Strong, Moderate, Weak],
            CommunicationSkill::Clarity => &[Clear, Moderate, Unclear],
            CommunicationSkill::Participation => &[Active, Moderate, Passive],
            CommunicationSkill::Sequencing => &[Logical, Moderate, Disorganized],
        }
    }
}

/// A single communication rating word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationLevel {
    Strong,
    Moderate,
    Weak,
    Clear,
    Unclear,
    Active,
    Passive,
    Logical,
    Disorganized,
}

impl CommunicationLevel {
    pub fn label(self) -> &'static str {
        match self {
            CommunicationLevel::Strong => "Strong",
            CommunicationLevel::Moderate => "Moderate",
            CommunicationLevel::Weak => "Weak",
            CommunicationLevel::Clear => "Clear",
            CommunicationLevel::Unclear => "Unclear",
            CommunicationLevel::Active => "Active",
            CommunicationLevel::Passive => "Passive",
            CommunicationLevel::Logical => "Logical",
            CommunicationLevel::Disorganized => "Disorganized",
        }
    }

    /// Case-insensitive lookup of a captured word
    pub fn parse(word: &str) -> Option<Self> {
        let word = word.trim().to_ascii_lowercase();
        [
            CommunicationLevel::Strong,
            CommunicationLevel::Moderate,
            CommunicationLevel::Weak,
            CommunicationLevel::Clear,
            CommunicationLevel::Unclear,
            CommunicationLevel::Active,
            CommunicationLevel::Passive,
            CommunicationLevel::Logical,
            CommunicationLevel::Disorganized,
        ]
        .into_iter()
        .find(|level| level.label().eq_ignore_ascii_case(&word))
    }
}

impl fmt::Display for CommunicationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Developmental growth areas rated in the narrative
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum GrowthArea {
    Intellectual,
    Emotional,
    Social,
    Creativity,
    Physical,
    #[serde(rename = "Character/Values")]
    CharacterValues,
    #[serde(rename = "Planning/Independence")]
    PlanningIndependence,
}

impl GrowthArea {
    pub const ALL: [GrowthArea; 7] = [
        GrowthArea::Intellectual,
        GrowthArea::Emotional,
        GrowthArea::Social,
        GrowthArea::Creativity,
        GrowthArea::Physical,
        GrowthArea::CharacterValues,
        GrowthArea::PlanningIndependence,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GrowthArea::Intellectual => "Intellectual",
            GrowthArea::Emotional => "Emotional",
            GrowthArea::Social => "Social",
            GrowthArea::Creativity => "Creativity",
            GrowthArea::Physical => "Physical",
            GrowthArea::CharacterValues => "Character/Values",
            GrowthArea::PlanningIndependence => "Planning/Independence",
        }
    }

    /// Regex fragment matching the area's line label
    pub(crate) fn pattern(self) -> &'static str {
        match self {
            GrowthArea::Intellectual => r"intellectual",
            GrowthArea::Emotional => r"emotional",
            GrowthArea::Social => r"social",
            GrowthArea::Creativity => r"creativity",
            GrowthArea::Physical => r"physical",
            GrowthArea::CharacterValues => r"character(?:\s*/\s*values)?",
            GrowthArea::PlanningIndependence => r"planning(?:\s*/\s*independence)?",
        }
    }
}

/// Per-area rating word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthRating {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl GrowthRating {
    pub fn label(self) -> &'static str {
        match self {
            GrowthRating::Excellent => "Excellent",
            GrowthRating::Good => "Good",
            GrowthRating::Fair => "Fair",
            GrowthRating::NeedsWork => "Needs Work",
        }
    }

    /// Accepts "needs work", "needs-work" and "needswork"
    pub fn parse(word: &str) -> Option<Self> {
        let normalized: String = word
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "excellent" => Some(GrowthRating::Excellent),
            "good" => Some(GrowthRating::Good),
            "fair" => Some(GrowthRating::Fair),
            "needswork" => Some(GrowthRating::NeedsWork),
            _ => None,
        }
    }
}

impl fmt::Display for GrowthRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Most frequent rating for a dimension over a window.
///
/// `NoData` means the dimension was looked for and never found, which differs
/// from the dimension being absent from the summary altogether.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingSummary<T> {
    Observed(T),
    NoData,
}

impl<T> RatingSummary<T> {
    pub fn observed(&self) -> Option<&T> {
        match self {
            RatingSummary::Observed(value) => Some(value),
            RatingSummary::NoData => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for RatingSummary<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingSummary::Observed(value) => value.fmt(f),
            RatingSummary::NoData => f.write_str("no data"),
        }
    }
}

impl<T: Serialize> Serialize for RatingSummary<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RatingSummary::Observed(value) => value.serialize(serializer),
            RatingSummary::NoData => serializer.serialize_str("no data"),
        }
    }
}
