//! Chart descriptors suggested alongside a monthly summary

use crate::aggregator::MonthlySummary;
use crate::extractor::MetricSeries;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    HorizontalBar,
    Pie,
    Donut,
    Gauge,
    ProgressBars,
    Radar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDescriptor {
    pub kind: ChartKind,
    pub title: String,
    pub description: String,
    pub data: Vec<DataPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<String>,
}

impl ChartDescriptor {
    fn new(kind: ChartKind, title: &str, description: String, data: Vec<DataPoint>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description,
            data,
            x_axis: None,
            y_axis: None,
        }
    }

    fn with_axes(mut self, x: &str, y: &str) -> Self {
        self.x_axis = Some(x.to_string());
        self.y_axis = Some(y.to_string());
        self
    }

    /// At least one data point. Zero is a real measurement.
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn push_nonempty(charts: &mut Vec<ChartDescriptor>, chart: ChartDescriptor) {
    if chart.has_data() {
        charts.push(chart);
    } else {
        tracing::debug!(title = %chart.title, "dropping chart without data");
    }
}

/// Suggest charts for every dimension that has data this window.
///
/// A dimension with no data contributes no descriptor at all.
pub fn suggest_visualizations(
    summary: &MonthlySummary,
    series: &MetricSeries,
) -> Vec<ChartDescriptor> {
    let mut charts = Vec::new();

    push_nonempty(
        &mut charts,
        ChartDescriptor::new(
            ChartKind::Line,
            "Weekly Observation Trends",
            format!(
                "Observation frequency across {} active weeks of the month",
                summary.weekly_trend.len()
            ),
            summary
                .weekly_trend
                .iter()
                .map(|(week, count)| DataPoint::new(week.clone(), *count as f64))
                .collect(),
        )
        .with_axes("Week", "Number of Observations"),
    );

    let engagement = series.engagement_points();
    push_nonempty(
        &mut charts,
        ChartDescriptor::new(
            ChartKind::Line,
            "Engagement Index by Day",
            format!("Engagement index recorded on {} days", engagement.len()),
            engagement
                .iter()
                .map(|(date, v)| DataPoint::new(date.to_string(), f64::from(*v)))
                .collect(),
        )
        .with_axes("Date", "Engagement Index"),
    );

    let growth = series.growth_points();
    push_nonempty(
        &mut charts,
        ChartDescriptor::new(
            ChartKind::Line,
            "Overall Growth Score by Day",
            format!("Growth score recorded on {} days", growth.len()),
            growth
                .iter()
                .map(|(date, v)| DataPoint::new(date.to_string(), f64::from(*v)))
                .collect(),
        )
        .with_axes("Date", "Growth Score"),
    );

    if let Some(top) = summary.strength_frequencies.first() {
        push_nonempty(
            &mut charts,
            ChartDescriptor::new(
                ChartKind::Pie,
                "Strength Areas Distribution",
                format!(
                    "Breakdown of {} strength categories; most frequent: {}",
                    summary.strength_frequencies.len(),
                    top.label
                ),
                summary
                    .strength_frequencies
                    .iter()
                    .take(8)
                    .map(|e| DataPoint::new(e.label.clone(), e.count as f64))
                    .collect(),
            ),
        );
        push_nonempty(
            &mut charts,
            ChartDescriptor::new(
                ChartKind::Donut,
                "Top 5 Strengths Focus",
                "Concentrated view of primary strength areas".to_string(),
                summary
                    .strength_frequencies
                    .iter()
                    .take(5)
                    .map(|e| DataPoint::new(e.label.clone(), e.count as f64))
                    .collect(),
            ),
        );
    }

    if let Some(top) = summary.development_frequencies.first() {
        push_nonempty(
            &mut charts,
            ChartDescriptor::new(
                ChartKind::HorizontalBar,
                "Development Priority Areas",
                format!("Primary development focus: {}", top.label),
                summary
                    .development_frequencies
                    .iter()
                    .take(6)
                    .map(|e| DataPoint::new(e.label.clone(), e.count as f64))
                    .collect(),
            )
            .with_axes("Frequency", "Development Area"),
        );
    }

    if !summary.goal_progress.is_empty() {
        let status = &summary.goal_status;
        push_nonempty(
            &mut charts,
            ChartDescriptor::new(
                ChartKind::Gauge,
                "Goal Achievement Rate",
                format!("{:.1}% completion rate this month", status.completion_rate),
                vec![
                    DataPoint::new("completion_rate", status.completion_rate),
                    DataPoint::new("completed", status.achieved as f64),
                    DataPoint::new("active", status.active as f64),
                ],
            ),
        );
        push_nonempty(
            &mut charts,
            ChartDescriptor::new(
                ChartKind::ProgressBars,
                "Individual Goal Progress",
                "Average alignment score per goal (0-10)".to_string(),
                summary
                    .goal_progress
                    .iter()
                    .take(5)
                    .map(|g| DataPoint::new(truncate_chars(&g.goal_text, 30), g.average_score))
                    .collect(),
            ),
        );
    }

    if let Some(metrics) = &summary.learning_metrics {
        push_nonempty(
            &mut charts,
            ChartDescriptor::new(
                ChartKind::Radar,
                "Learning Engagement Profile",
                format!("Learning consistency: {}", metrics.consistency.as_str()),
                vec![
                    DataPoint::new("session_frequency", metrics.session_frequency as f64),
                    DataPoint::new("theme_diversity", metrics.theme_diversity as f64),
                    DataPoint::new("curiosity_engagement", metrics.curiosity_engagement as f64),
                ],
            ),
        );
    }

    charts
}
