//! Monthly aggregation over observation records and goals

use crate::extractor::{extract_across_corpus, MetricSeries};
use crate::ratings::{
    CommunicationLevel, CommunicationSkill, GrowthArea, GrowthRating, RatingSummary,
};
use crate::types::{Goal, GoalStatus, ObservationRecord};
use crate::visuals::{suggest_visualizations, ChartDescriptor};
use crate::window::MonthWindow;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const MAX_WEEKS: u32 = 5;
const MAX_RECOMMENDATIONS: usize = 5;
const ALIGNMENT_MAX: f64 = 10.0;

/// One row of a frequency table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub goal_id: String,
    pub goal_text: String,
    pub status: GoalStatus,
    /// Mean of in-window alignment scores, 0-10
    pub average_score: f64,
    pub observation_count: usize,
    /// Scores in chronological order of their source observation
    pub trend: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalStatusCounts {
    pub active: usize,
    pub achieved: usize,
    /// achieved / (active + achieved) * 100
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Consistency {
    High,
    Medium,
    Low,
}

impl Consistency {
    pub fn from_sessions(sessions: usize) -> Self {
        match sessions {
            n if n > 15 => Consistency::High,
            n if n > 8 => Consistency::Medium,
            _ => Consistency::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Consistency::High => "High",
            Consistency::Medium => "Medium",
            Consistency::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningMetrics {
    pub session_frequency: usize,
    /// Distinct themes of the day
    pub theme_diversity: usize,
    /// Distinct curiosity seeds explored
    pub curiosity_engagement: usize,
    pub consistency: Consistency,
}

/// Aggregate for one subject over one calendar month. Computed, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub window: MonthWindow,
    pub total_observations: usize,
    pub strength_frequencies: Vec<FrequencyEntry>,
    pub development_frequencies: Vec<FrequencyEntry>,
    pub goal_progress: Vec<GoalProgress>,
    pub goal_status: GoalStatusCounts,
    pub weekly_trend: BTreeMap<String, usize>,
    pub communication_summary: BTreeMap<CommunicationSkill, RatingSummary<CommunicationLevel>>,
    pub growth_summary: BTreeMap<GrowthArea, RatingSummary<GrowthRating>>,
    pub learning_metrics: Option<LearningMetrics>,
    pub narrative_text: String,
    pub recommendations: Vec<String>,
    pub progress_insights: Vec<String>,
    pub suggested_visualizations: Vec<ChartDescriptor>,
}

impl MonthlySummary {
    /// Mean of the per-goal averages
    pub fn average_goal_score(&self) -> Option<f64> {
        if self.goal_progress.is_empty() {
            return None;
        }
        let total: f64 = self.goal_progress.iter().map(|g| g.average_score).sum();
        Some(total / self.goal_progress.len() as f64)
    }

    pub fn top_strengths(&self, n: usize) -> impl Iterator<Item = &str> {
        self.strength_frequencies.iter().take(n).map(|e| e.label.as_str())
    }

    pub fn top_development_areas(&self, n: usize) -> impl Iterator<Item = &str> {
        self.development_frequencies.iter().take(n).map(|e| e.label.as_str())
    }

    /// Whether any communication skill was rated this month
    pub fn has_communication_data(&self) -> bool {
        self.communication_summary.values().any(|r| r.observed().is_some())
    }

    pub fn has_growth_data(&self) -> bool {
        self.growth_summary.values().any(|r| r.observed().is_some())
    }
}

/// Summarize one month of observations and goal evidence.
///
/// Pure and deterministic: the same inputs always give the same summary.
pub fn summarize(
    observations: &[ObservationRecord],
    goals: &[Goal],
    window: MonthWindow,
) -> MonthlySummary {
    let in_window: Vec<&ObservationRecord> = observations
        .iter()
        .filter(|o| window.contains(o.date))
        .collect();

    tracing::debug!(
        window = %window.label(),
        total = observations.len(),
        in_window = in_window.len(),
        "summarizing observations"
    );

    let series = extract_across_corpus(in_window.iter().copied());

    let strength_frequencies =
        frequency_table(in_window.iter().flat_map(|o| &o.structured_fields.strengths));
    let development_frequencies = frequency_table(
        in_window
            .iter()
            .flat_map(|o| &o.structured_fields.areas_of_development),
    );

    let goal_progress = goal_progress(&in_window, goals);
    let goal_status = goal_status_counts(&goal_progress);

    let mut summary = MonthlySummary {
        window,
        total_observations: in_window.len(),
        strength_frequencies,
        development_frequencies,
        goal_progress,
        goal_status,
        weekly_trend: weekly_trend(&in_window),
        communication_summary: communication_summary(&series),
        growth_summary: growth_summary(&series),
        learning_metrics: learning_metrics(&in_window),
        narrative_text: String::new(),
        recommendations: collect_recommendations(&in_window),
        progress_insights: Vec::new(),
        suggested_visualizations: Vec::new(),
    };
    summary.narrative_text = default_narrative(&summary);
    summary.suggested_visualizations = suggest_visualizations(&summary, &series);
    summary
}

/// Count trimmed labels, descending by count, ties in first-seen order
fn frequency_table<'a>(labels: impl Iterator<Item = &'a String>) -> Vec<FrequencyEntry> {
    let mut entries: Vec<FrequencyEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        match index.get(label) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(label.to_string(), entries.len());
                entries.push(FrequencyEntry {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

fn goal_progress(in_window: &[&ObservationRecord], goals: &[Goal]) -> Vec<GoalProgress> {
    let dates: HashMap<&str, NaiveDate> = in_window
        .iter()
        .map(|o| (o.id.as_str(), o.date))
        .collect();

    let mut progress = Vec::new();
    for goal in goals {
        let mut scored: Vec<(NaiveDate, f64)> = Vec::new();
        for alignment in &goal.alignments {
            let Some(date) = dates.get(alignment.observation_id.as_str()) else {
                continue;
            };
            if !(0.0..=ALIGNMENT_MAX).contains(&alignment.score) {
                tracing::warn!(
                    goal = %goal.id,
                    observation = %alignment.observation_id,
                    score = alignment.score,
                    "discarding out-of-range alignment score"
                );
                continue;
            }
            scored.push((*date, alignment.score));
        }

        if scored.is_empty() {
            continue;
        }
        scored.sort_by_key(|(date, _)| *date);

        let trend: Vec<f64> = scored.into_iter().map(|(_, score)| score).collect();
        let average_score = trend.iter().sum::<f64>() / trend.len() as f64;
        progress.push(GoalProgress {
            goal_id: goal.id.clone(),
            goal_text: goal.text.clone(),
            status: goal.status,
            average_score,
            observation_count: trend.len(),
            trend,
        });
    }
    progress
}

fn goal_status_counts(progress: &[GoalProgress]) -> GoalStatusCounts {
    let achieved = progress
        .iter()
        .filter(|g| g.status == GoalStatus::Achieved)
        .count();
    let active = progress.len() - achieved;
    let completion_rate = if progress.is_empty() {
        0.0
    } else {
        achieved as f64 / progress.len() as f64 * 100.0
    };
    GoalStatusCounts {
        active,
        achieved,
        completion_rate,
    }
}

/// Sparse "Week N" counts; days past the 28th fold into week 5
fn weekly_trend(in_window: &[&ObservationRecord]) -> BTreeMap<String, usize> {
    let mut buckets = [0usize; MAX_WEEKS as usize];
    for record in in_window {
        let week = ((record.date.day() - 1) / 7).min(MAX_WEEKS - 1);
        buckets[week as usize] += 1;
    }
    buckets
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(i, count)| (format!("Week {}", i + 1), *count))
        .collect()
}

/// Most frequent value; ties go to the value seen first
fn most_frequent<T: Copy + PartialEq>(values: impl Iterator<Item = T>) -> RatingSummary<T> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((value, count));
        }
    }
    best.map_or(RatingSummary::NoData, |(value, _)| RatingSummary::Observed(value))
}

fn communication_summary(
    series: &MetricSeries,
) -> BTreeMap<CommunicationSkill, RatingSummary<CommunicationLevel>> {
    CommunicationSkill::ALL
        .into_iter()
        .map(|skill| {
            let values = series
                .by_date
                .values()
                .filter_map(|s| s.communication_ratings.get(&skill).copied());
            (skill, most_frequent(values))
        })
        .collect()
}

fn growth_summary(series: &MetricSeries) -> BTreeMap<GrowthArea, RatingSummary<GrowthRating>> {
    GrowthArea::ALL
        .into_iter()
        .map(|area| {
            let values = series
                .by_date
                .values()
                .filter_map(|s| s.growth_area_ratings.get(&area).copied());
            (area, most_frequent(values))
        })
        .collect()
}

fn learning_metrics(in_window: &[&ObservationRecord]) -> Option<LearningMetrics> {
    if in_window.is_empty() {
        return None;
    }
    let distinct = |pick: fn(&ObservationRecord) -> Option<&String>| -> usize {
        in_window
            .iter()
            .filter_map(|o| pick(o))
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect::<BTreeSet<_>>()
            .len()
    };

    Some(LearningMetrics {
        session_frequency: in_window.len(),
        theme_diversity: distinct(|o| o.structured_fields.theme_of_day.as_ref()),
        curiosity_engagement: distinct(|o| o.structured_fields.curiosity_seed.as_ref()),
        consistency: Consistency::from_sessions(in_window.len()),
    })
}

fn collect_recommendations(in_window: &[&ObservationRecord]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut recommendations = Vec::new();
    for text in in_window
        .iter()
        .flat_map(|o| &o.structured_fields.recommendations)
    {
        let text = text.trim();
        if text.is_empty() || !seen.insert(text.to_lowercase()) {
            continue;
        }
        recommendations.push(text.to_string());
        if recommendations.len() == MAX_RECOMMENDATIONS {
            break;
        }
    }
    recommendations
}

fn default_narrative(summary: &MonthlySummary) -> String {
    if summary.total_observations == 0 {
        return "No observations recorded this month.".to_string();
    }

    let mut text = format!(
        "{} observation{} recorded in {}.",
        summary.total_observations,
        if summary.total_observations == 1 { " was" } else { "s were" },
        summary.window.label()
    );

    if let Some(average) = summary.average_goal_score() {
        text.push_str(&format!(
            " Average goal progress was {:.1}/10 across {} goal{}.",
            average,
            summary.goal_progress.len(),
            if summary.goal_progress.len() == 1 { "" } else { "s" }
        ));
        let by_score =
            |a: &&GoalProgress, b: &&GoalProgress| a.average_score.total_cmp(&b.average_score);
        let strongest = summary.goal_progress.iter().max_by(by_score);
        let weakest = summary.goal_progress.iter().min_by(by_score);
        if let (Some(strong), Some(weak), true) =
            (strongest, weakest, summary.goal_progress.len() > 1)
        {
            text.push_str(&format!(
                " Strongest progress: {} ({:.1}). Needs most support: {} ({:.1}).",
                strong.goal_text, strong.average_score, weak.goal_text, weak.average_score
            ));
        }
    }

    if let Some(top) = summary.strength_frequencies.first() {
        text.push_str(&format!(" Most observed strength: {}.", top.label));
    }
    text
}
