//! Pattern-based recovery of metrics from template-bound narrative text
//!
//! Narratives follow a fixed template: an engagement line shaped like
//! `Engagement Index: 8/10` (older reports say `Curiosity Response Index`), a
//! growth line shaped like `Overall Growth Score ... 5/7`, one line per
//! communication skill and one line per growth area, each carrying a word from
//! a closed vocabulary. Every field is searched independently and only the
//! first match counts, so a legend repeated at the bottom of a report never
//! overrides the real value.

use crate::ratings::{CommunicationLevel, CommunicationSkill, GrowthArea, GrowthRating};
use crate::types::{MetricSample, ObservationRecord};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const ENGAGEMENT_MAX: u16 = 10;
const GROWTH_MAX: u16 = 7;

static ENGAGEMENT_RE: OnceLock<Regex> = OnceLock::new();
static GROWTH_SCORE_RE: OnceLock<Regex> = OnceLock::new();
static COMMUNICATION_RES: OnceLock<Vec<(CommunicationSkill, Regex)>> = OnceLock::new();
static GROWTH_AREA_RES: OnceLock<Vec<(GrowthArea, Regex)>> = OnceLock::new();

fn engagement_re() -> &'static Regex {
    // Up to three digits so "12/10" is captured and rejected instead of read as "2/10"
    ENGAGEMENT_RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:engagement|curiosity\s+response)\s+index\s*:?\s*\[?\s*(\d{1,3})\s*\]?\s*/\s*10\b",
        )
        .unwrap()
    })
}

fn growth_score_re() -> &'static Regex {
    // The score may sit on the line after the label; the gap is bounded and digit-free
    GROWTH_SCORE_RE.get_or_init(|| {
        Regex::new(r"(?i)growth\s+score\b[^\d]{0,120}?(\d{1,2})\s*\]?\s*/\s*7\b").unwrap()
    })
}

fn communication_label(skill: CommunicationSkill) -> &'static str {
    match skill {
        CommunicationSkill::Confidence => r"confidence\s+level\s*:",
        CommunicationSkill::Clarity => r"clarity\s+of\s+thought\s*:",
        CommunicationSkill::Participation => r"participation[^\n:]*:",
        CommunicationSkill::Sequencing => r"sequence\s+of\s+explanation\s*:",
    }
}

fn communication_res() -> &'static [(CommunicationSkill, Regex)] {
    COMMUNICATION_RES.get_or_init(|| {
        CommunicationSkill::ALL
            .iter()
            .map(|&skill| {
                let words = skill
                    .vocabulary()
                    .iter()
                    .map(|level| level.label().to_ascii_lowercase())
                    .collect::<Vec<_>>()
                    .join("|");
                let pattern = format!(
                    r"(?i){}[^\n]*?\b({})\b",
                    communication_label(skill),
                    words
                );
                (skill, Regex::new(&pattern).unwrap())
            })
            .collect()
    })
}

fn growth_area_res() -> &'static [(GrowthArea, Regex)] {
    GROWTH_AREA_RES.get_or_init(|| {
        GrowthArea::ALL
            .iter()
            .map(|&area| {
                // Table rows only: the area name leads its line after any emoji or pipes
                let pattern = format!(
                    concat!(
                        r"(?im)^[^\p{{L}}\p{{N}}\n]*{}\b",
                        r"[^\n]*?\b(excellent|good|fair|needs[ \t-]*work)\b"
                    ),
                    area.pattern()
                );
                (area, Regex::new(&pattern).unwrap())
            })
            .collect()
    })
}

/// Capture the first integer for `re` and keep it only when within `0..=max`
fn bounded_capture(re: &Regex, text: &str, max: u16, field: &str) -> Option<u8> {
    let raw = re.captures(text)?.get(1)?.as_str();
    match raw.parse::<u16>() {
        Ok(value) if value <= max => u8::try_from(value).ok(),
        _ => {
            tracing::debug!(field, raw, max, "discarding out-of-range capture");
            None
        }
    }
}

/// Recover a metric sample from one narrative. Never fails; misses are `None`.
pub fn extract(narrative: &str) -> MetricSample {
    let engagement_index =
        bounded_capture(engagement_re(), narrative, ENGAGEMENT_MAX, "engagement");
    let growth_score = bounded_capture(growth_score_re(), narrative, GROWTH_MAX, "growth");

    let mut communication_ratings = BTreeMap::new();
    for (skill, re) in communication_res() {
        let level = re
            .captures(narrative)
            .and_then(|c| c.get(1))
            .and_then(|m| CommunicationLevel::parse(m.as_str()));
        if let Some(level) = level {
            communication_ratings.insert(*skill, level);
        }
    }

    let mut growth_area_ratings = BTreeMap::new();
    for (area, re) in growth_area_res() {
        let rating = re
            .captures(narrative)
            .and_then(|c| c.get(1))
            .and_then(|m| GrowthRating::parse(m.as_str()));
        if let Some(rating) = rating {
            growth_area_ratings.insert(*area, rating);
        }
    }

    MetricSample {
        date: None,
        engagement_index,
        growth_score,
        communication_ratings,
        growth_area_ratings,
    }
}

/// Date-ordered samples for charting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSeries {
    pub by_date: BTreeMap<NaiveDate, MetricSample>,
}

impl MetricSeries {
    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    pub fn engagement_points(&self) -> Vec<(NaiveDate, u8)> {
        self.by_date
            .iter()
            .filter_map(|(date, s)| s.engagement_index.map(|v| (*date, v)))
            .collect()
    }

    pub fn growth_points(&self) -> Vec<(NaiveDate, u8)> {
        self.by_date
            .iter()
            .filter_map(|(date, s)| s.growth_score.map(|v| (*date, v)))
            .collect()
    }

    pub fn communication_rows(
        &self,
    ) -> Vec<(NaiveDate, &BTreeMap<CommunicationSkill, CommunicationLevel>)> {
        self.by_date
            .iter()
            .filter(|(_, s)| !s.communication_ratings.is_empty())
            .map(|(date, s)| (*date, &s.communication_ratings))
            .collect()
    }
}

/// Apply [`extract`] to every generated narrative and key the samples by date.
///
/// Fallback narratives are skipped. When two records share a date the one with
/// the later `created_at` wins; equal timestamps resolve to the later record in
/// iteration order.
pub fn extract_across_corpus<'a>(
    observations: impl IntoIterator<Item = &'a ObservationRecord>,
) -> MetricSeries {
    let mut chosen: BTreeMap<NaiveDate, &ObservationRecord> = BTreeMap::new();

    for record in observations {
        if record.narrative_report.is_fallback() {
            continue;
        }
        let replace = chosen
            .get(&record.date)
            .map_or(true, |current| record.created_at >= current.created_at);
        if replace {
            chosen.insert(record.date, record);
        }
    }

    let by_date = chosen
        .into_iter()
        .map(|(date, record)| {
            let mut sample = extract(record.narrative_report.text());
            if sample.is_empty() {
                tracing::debug!(id = %record.id, %date, "no metrics found in narrative");
            }
            sample.date = Some(date);
            (date, sample)
        })
        .collect();

    MetricSeries { by_date }
}
