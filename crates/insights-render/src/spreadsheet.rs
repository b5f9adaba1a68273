//! Spreadsheet output: one sheet per metric family, charts beside the data
//!
//! The workbook is planned first as plain data and only then written, so the
//! sheet selection can be checked without opening an xlsx file.

use crate::error::RenderError;
use chrono::NaiveDate;
use insights_core::{CommunicationSkill, FrequencyEntry, MetricSeries, MonthlySummary};
use rust_xlsxwriter::{Chart, ChartType, Format, Workbook, Worksheet};

/// Charts sit at D2, right of the two data columns
const CHART_ANCHOR: (u32, u16) = (1, 3);
const BAR_CHART_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    Line,
    Bar,
}

/// Chart over the sheet's first column (categories) and second column (values)
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    pub style: ChartStyle,
    pub title: String,
    pub series_name: String,
    pub x_axis: String,
    pub y_axis: String,
    /// Number of data rows the chart covers, starting below the header
    pub points: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetPlan {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub chart: Option<ChartPlan>,
}

impl SheetPlan {
    fn new(name: &str, headers: &[&str], rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
            chart: None,
        }
    }

    fn with_chart(mut self, style: ChartStyle, title: &str, x_axis: &str, y_axis: &str) -> Self {
        let points = match style {
            ChartStyle::Line => self.rows.len(),
            ChartStyle::Bar => self.rows.len().min(BAR_CHART_ROWS),
        };
        self.chart = Some(ChartPlan {
            style,
            title: title.to_string(),
            series_name: self.headers.get(1).cloned().unwrap_or_default(),
            x_axis: x_axis.to_string(),
            y_axis: y_axis.to_string(),
            points,
        });
        self
    }
}

fn summary_sheet(summary: &MonthlySummary) -> SheetPlan {
    let average = summary.average_goal_score().unwrap_or(0.0);
    let mut rows = vec![
        vec![CellValue::text("Period"), CellValue::text(summary.window.label())],
        vec![
            CellValue::text("Total Observations"),
            CellValue::Number(summary.total_observations as f64),
        ],
        vec![
            CellValue::text("Goals Tracked"),
            CellValue::Number(summary.goal_progress.len() as f64),
        ],
        vec![
            CellValue::text("Average Goal Score"),
            CellValue::Number((average * 10.0).round() / 10.0),
        ],
        vec![
            CellValue::text("Goal Completion Rate (%)"),
            CellValue::Number(summary.goal_status.completion_rate.round()),
        ],
    ];
    if let Some(metrics) = &summary.learning_metrics {
        rows.push(vec![
            CellValue::text("Themes Explored"),
            CellValue::Number(metrics.theme_diversity as f64),
        ]);
        rows.push(vec![
            CellValue::text("Learning Consistency"),
            CellValue::text(metrics.consistency.as_str()),
        ]);
    }
    SheetPlan::new("Summary", &["Metric", "Value"], rows)
}

fn trend_sheet(name: &str, value_header: &str, points: Vec<(NaiveDate, u8)>) -> SheetPlan {
    let rows = points
        .into_iter()
        .map(|(date, value)| {
            vec![
                CellValue::Text(date.format("%Y-%m-%d").to_string()),
                CellValue::Number(f64::from(value)),
            ]
        })
        .collect();
    SheetPlan::new(name, &["Date", value_header], rows)
}

fn frequency_sheet(name: &str, label: &str, entries: &[FrequencyEntry]) -> SheetPlan {
    let rows = entries
        .iter()
        .map(|e| vec![CellValue::text(e.label.as_str()), CellValue::Number(e.count as f64)])
        .collect();
    SheetPlan::new(name, &[label, "Count"], rows)
}

/// Decide which sheets and charts the workbook gets.
///
/// Sheets whose data is empty are left out; the summary sheet is always present.
pub fn plan_workbook(summary: &MonthlySummary, series: &MetricSeries) -> Vec<SheetPlan> {
    let mut sheets = vec![summary_sheet(summary)];

    let engagement = series.engagement_points();
    if !engagement.is_empty() {
        sheets.push(
            trend_sheet("Engagement Trend", "Engagement Index", engagement).with_chart(
                ChartStyle::Line,
                "Engagement Index Over Time",
                "Date",
                "Engagement (0-10)",
            ),
        );
    }

    let growth = series.growth_points();
    if !growth.is_empty() {
        sheets.push(
            trend_sheet("Growth Trend", "Overall Growth Score", growth).with_chart(
                ChartStyle::Line,
                "Overall Growth Score Over Time",
                "Date",
                "Growth Score (0-7)",
            ),
        );
    }

    let communication = series.communication_rows();
    if !communication.is_empty() {
        let mut headers = vec!["Date"];
        headers.extend(CommunicationSkill::ALL.iter().map(|s| s.label()));
        let rows = communication
            .into_iter()
            .map(|(date, ratings)| {
                let mut row = vec![CellValue::Text(date.format("%Y-%m-%d").to_string())];
                row.extend(CommunicationSkill::ALL.iter().map(|skill| {
                    CellValue::text(ratings.get(skill).map_or("", |level| level.label()))
                }));
                row
            })
            .collect();
        sheets.push(SheetPlan::new("Communication Skills", &headers, rows));
    }

    if !summary.strength_frequencies.is_empty() {
        sheets.push(
            frequency_sheet("Strengths", "Strength", &summary.strength_frequencies).with_chart(
                ChartStyle::Bar,
                "Top Strengths",
                "Frequency",
                "Strength",
            ),
        );
    }

    if !summary.development_frequencies.is_empty() {
        sheets.push(
            frequency_sheet(
                "Development Areas",
                "Development Area",
                &summary.development_frequencies,
            )
            .with_chart(ChartStyle::Bar, "Areas for Development", "Frequency", "Area"),
        );
    }

    if !summary.goal_progress.is_empty() {
        let rows = summary
            .goal_progress
            .iter()
            .map(|g| {
                vec![
                    CellValue::text(g.goal_text.as_str()),
                    CellValue::text(g.status.as_str()),
                    CellValue::Number((g.average_score * 10.0).round() / 10.0),
                    CellValue::Number(g.observation_count as f64),
                ]
            })
            .collect();
        sheets.push(SheetPlan::new(
            "Goal Progress",
            &["Goal", "Status", "Average Score", "Observations"],
            rows,
        ));
    }

    sheets
}

fn write_sheet(
    worksheet: &mut Worksheet,
    plan: &SheetPlan,
    bold: &Format,
) -> Result<(), RenderError> {
    worksheet.set_name(&plan.name)?;

    for (col, header) in plan.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, bold)?;
        worksheet.set_column_width(col as u16, 22)?;
    }

    for (i, row) in plan.rows.iter().enumerate() {
        let r = i as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                CellValue::Text(text) => worksheet.write_string(r, col as u16, text)?,
                CellValue::Number(value) => worksheet.write_number(r, col as u16, *value)?,
            };
        }
    }

    if let Some(plan_chart) = &plan.chart {
        if plan_chart.points > 0 {
            let chart = build_chart(&plan.name, plan_chart);
            worksheet.insert_chart(CHART_ANCHOR.0, CHART_ANCHOR.1, &chart)?;
        }
    }
    Ok(())
}

fn build_chart(sheet: &str, plan: &ChartPlan) -> Chart {
    let mut chart = Chart::new(match plan.style {
        ChartStyle::Line => ChartType::Line,
        ChartStyle::Bar => ChartType::Bar,
    });
    let last = plan.points as u32;
    chart
        .add_series()
        .set_name(plan.series_name.as_str())
        .set_categories((sheet, 1, 0, last, 0))
        .set_values((sheet, 1, 1, last, 1));
    chart.title().set_name(&plan.title);
    chart.x_axis().set_name(&plan.x_axis);
    chart.y_axis().set_name(&plan.y_axis);
    chart.legend().set_hidden();
    chart
}

/// Write the planned workbook to an in-memory xlsx file
pub fn render_spreadsheet(
    summary: &MonthlySummary,
    series: &MetricSeries,
) -> Result<Vec<u8>, RenderError> {
    let plan = plan_workbook(summary, series);
    let bold = Format::new().set_bold();

    let mut workbook = Workbook::new();
    for sheet in &plan {
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, sheet, &bold)?;
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(sheets = plan.len(), bytes = bytes.len(), "rendered spreadsheet");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::{empty_summary, records, rich_summary};
    use insights_core::extract_across_corpus;

    fn sheet_names(plan: &[SheetPlan]) -> Vec<&str> {
        plan.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_plan_for_rich_month() {
        let records = records();
        let series = extract_across_corpus(&records);
        let plan = plan_workbook(&rich_summary(), &series);

        assert_eq!(
            sheet_names(&plan),
            vec![
                "Summary",
                "Engagement Trend",
                "Growth Trend",
                "Communication Skills",
                "Strengths",
                "Development Areas",
                "Goal Progress",
            ]
        );

        let engagement = &plan[1];
        assert_eq!(engagement.rows.len(), 2);
        assert_eq!(engagement.rows[0][1], CellValue::Number(8.0));
        let chart = engagement.chart.as_ref().unwrap();
        assert_eq!(chart.style, ChartStyle::Line);
        assert_eq!(chart.points, 2);
        assert_eq!(chart.series_name, "Engagement Index");

        assert_eq!(plan[2].rows.len(), 1);
        assert_eq!(plan[3].headers.len(), 5);
    }

    #[test]
    fn test_empty_month_only_summary_sheet() {
        let plan = plan_workbook(&empty_summary(), &MetricSeries::default());
        assert_eq!(sheet_names(&plan), vec!["Summary"]);
        assert_eq!(
            plan[0].rows[1],
            vec![CellValue::text("Total Observations"), CellValue::Number(0.0)]
        );
    }

    #[test]
    fn test_render_spreadsheet_bytes() {
        let records = records();
        let series = extract_across_corpus(&records);
        let bytes = render_spreadsheet(&rich_summary(), &series).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let bytes = render_spreadsheet(&empty_summary(), &MetricSeries::default()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
