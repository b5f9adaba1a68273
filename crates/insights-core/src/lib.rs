//! Observation records, metric extraction and monthly aggregation

mod aggregator;
mod config;
mod error;
mod extractor;
mod ratings;
mod types;
mod visuals;
mod window;

pub use aggregator::{
    summarize, Consistency, FrequencyEntry, GoalProgress, GoalStatusCounts, LearningMetrics,
    MonthlySummary,
};
pub use config::{GenerationSettings, InsightsConfig, IntakeSettings};
pub use error::CoreError;
pub use extractor::{extract, extract_across_corpus, MetricSeries};
pub use ratings::{CommunicationLevel, CommunicationSkill, GrowthArea, GrowthRating, RatingSummary};
pub use types::{
    Goal, GoalAlignment, GoalStatus, MetricSample, NarrativeReport, ObservationRecord,
    StructuredFields,
};
pub use visuals::{suggest_visualizations, ChartDescriptor, ChartKind, DataPoint};
pub use window::MonthWindow;
