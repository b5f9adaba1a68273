//! Format-neutral section model shared by the document and printable renderers

use chrono::{DateTime, Utc};
use insights_core::{CommunicationSkill, GrowthArea, MonthlySummary};
use serde::Serialize;

/// Values a render needs that are not part of the summary.
///
/// The timestamp is passed in so rendering stays deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    pub subject_name: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    Bullets { items: Vec<String> },
    Table { headers: Vec<String>, rows: Vec<Vec<String>> },
    Footer { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLayout {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl ReportLayout {
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Heading { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

fn heading(text: &str) -> Block {
    Block::Heading {
        level: 2,
        text: text.to_string(),
    }
}

/// Push a heading and its bullets only when there is something to list
fn bullet_section(blocks: &mut Vec<Block>, title: &str, items: Vec<String>) {
    if items.is_empty() {
        return;
    }
    blocks.push(heading(title));
    blocks.push(Block::Bullets { items });
}

/// Lay out the monthly report. Empty sections are left out entirely.
pub fn layout_monthly_report(summary: &MonthlySummary, context: &RenderContext) -> ReportLayout {
    let mut blocks = vec![
        Block::Heading {
            level: 1,
            text: "Monthly Learning Report".to_string(),
        },
        Block::Paragraph {
            text: format!("Student: {}", context.subject_name),
        },
        Block::Paragraph {
            text: format!("Period: {}", summary.window.label()),
        },
        Block::Paragraph {
            text: "Report Type: Monthly Progress Summary".to_string(),
        },
        Block::Paragraph {
            text: format!("Total Observations: {}", summary.total_observations),
        },
    ];

    if !summary.narrative_text.trim().is_empty() {
        blocks.push(heading("Monthly Summary"));
        blocks.push(Block::Paragraph {
            text: summary.narrative_text.trim().to_string(),
        });
    }

    bullet_section(&mut blocks, "Progress Insights", summary.progress_insights.clone());
    bullet_section(
        &mut blocks,
        "Strengths",
        summary
            .strength_frequencies
            .iter()
            .map(|e| format!("{} ({})", e.label, e.count))
            .collect(),
    );
    bullet_section(
        &mut blocks,
        "Areas of Development",
        summary
            .development_frequencies
            .iter()
            .map(|e| format!("{} ({})", e.label, e.count))
            .collect(),
    );
    bullet_section(&mut blocks, "Recommendations", summary.recommendations.clone());

    if summary.has_communication_data() {
        blocks.push(heading("Communication Skills"));
        blocks.push(Block::Table {
            headers: vec!["Skill".to_string(), "Most Frequent Rating".to_string()],
            rows: CommunicationSkill::ALL
                .iter()
                .filter_map(|skill| {
                    summary
                        .communication_summary
                        .get(skill)
                        .map(|rating| vec![skill.label().to_string(), rating.to_string()])
                })
                .collect(),
        });
    }

    if summary.has_growth_data() {
        blocks.push(heading("Growth Metrics"));
        blocks.push(Block::Table {
            headers: vec!["Growth Area".to_string(), "Most Frequent Rating".to_string()],
            rows: GrowthArea::ALL
                .iter()
                .filter_map(|area| {
                    summary
                        .growth_summary
                        .get(area)
                        .map(|rating| vec![area.label().to_string(), rating.to_string()])
                })
                .collect(),
        });
    }

    if !summary.goal_progress.is_empty() {
        blocks.push(heading("Goal Progress"));
        blocks.push(Block::Table {
            headers: vec![
                "Goal".to_string(),
                "Status".to_string(),
                "Average Score".to_string(),
                "Observations".to_string(),
            ],
            rows: summary
                .goal_progress
                .iter()
                .map(|g| {
                    vec![
                        g.goal_text.clone(),
                        g.status.as_str().to_string(),
                        format!("{:.1}/10", g.average_score),
                        g.observation_count.to_string(),
                    ]
                })
                .collect(),
        });
    }

    blocks.push(Block::Footer {
        text: format!(
            "Report generated on: {}",
            context.generated_at.format("%B %d, %Y at %H:%M UTC")
        ),
    });

    ReportLayout {
        title: format!(
            "Monthly Learning Report - {} - {}",
            context.subject_name,
            summary.window.label()
        ),
        blocks,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use insights_core::{
        summarize, Goal, GoalAlignment, GoalStatus, MonthWindow, NarrativeReport,
        ObservationRecord, StructuredFields,
    };

    pub(crate) fn context() -> RenderContext {
        RenderContext {
            subject_name: "Ava".to_string(),
            generated_at: Utc.with_ymd_and_hms(2025, 4, 1, 8, 30, 0).unwrap(),
        }
    }

    pub(crate) fn records() -> Vec<ObservationRecord> {
        let narratives = [
            "Confidence level: Strong\nSocial | Good\nEngagement Index: 8/10\nOverall Growth Score: 5/7",
            "Confidence level: Moderate\nEngagement Index: 6/10",
        ];
        narratives
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let day = i as u32 + 3;
                ObservationRecord {
                    id: format!("o{day}"),
                    subject_id: "child-1".to_string(),
                    date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
                    created_at: Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap(),
                    raw_text: String::new(),
                    narrative_report: NarrativeReport::Generated(text.to_string()),
                    structured_fields: StructuredFields {
                        strengths: vec!["curiosity".to_string()],
                        areas_of_development: vec!["patience".to_string()],
                        recommendations: vec!["Read together".to_string()],
                        ..Default::default()
                    },
                }
            })
            .collect()
    }

    pub(crate) fn rich_summary() -> MonthlySummary {
        let goals = vec![Goal {
            id: "g1".to_string(),
            subject_id: "child-1".to_string(),
            text: "Count to 20".to_string(),
            status: GoalStatus::Active,
            alignments: vec![GoalAlignment {
                observation_id: "o3".to_string(),
                score: 6.0,
            }],
        }];
        summarize(&records(), &goals, MonthWindow::new(2025, 3).unwrap())
    }

    pub(crate) fn empty_summary() -> MonthlySummary {
        summarize(&[], &[], MonthWindow::new(2025, 3).unwrap())
    }

    #[test]
    fn test_full_layout_sections() {
        let layout = layout_monthly_report(&rich_summary(), &context());
        let headings: Vec<&str> = layout.headings().collect();
        assert_eq!(
            headings,
            vec![
                "Monthly Learning Report",
                "Monthly Summary",
                "Strengths",
                "Areas of Development",
                "Recommendations",
                "Communication Skills",
                "Growth Metrics",
                "Goal Progress",
            ]
        );
        assert!(matches!(
            layout.blocks.last(),
            Some(Block::Footer { text }) if text == "Report generated on: April 01, 2025 at 08:30 UTC"
        ));
    }

    #[test]
    fn test_communication_table_shows_no_data() {
        let layout = layout_monthly_report(&rich_summary(), &context());
        let table = layout
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Table { headers, rows } if headers[0] == "Skill" => Some(rows),
                _ => None,
            })
            .unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table[0], vec!["Confidence Level", "Strong"]);
        assert_eq!(table[1], vec!["Clarity of Thought", "no data"]);
    }

    #[test]
    fn test_layout_serializes_tagged_blocks() {
        let layout = layout_monthly_report(&empty_summary(), &context());
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["blocks"][0]["type"], "heading");
        assert_eq!(json["blocks"][0]["level"], 1);
        assert_eq!(json["title"], "Monthly Learning Report - Ava - March 2025");
    }

    #[test]
    fn test_empty_sections_omitted() {
        let layout = layout_monthly_report(&empty_summary(), &context());
        let headings: Vec<&str> = layout.headings().collect();
        assert_eq!(headings, vec!["Monthly Learning Report", "Monthly Summary"]);
        assert!(!layout.blocks.iter().any(|b| matches!(b, Block::Table { .. })));
    }
}
