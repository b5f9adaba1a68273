use super::Generator;
use crate::cli::ReportFormat;
use chrono::Utc;
use insights_core::{
    extract_across_corpus, summarize, InsightsConfig, MetricSeries, MonthWindow, MonthlySummary,
};
use insights_fs::{atomic_write, Paths};
use insights_render::{
    render_narrative_document, render_plain_text, render_printable_narrative, render_spreadsheet,
    RenderContext,
};
use insights_synth::{synthesize_monthly, Completion, Gender, Identity, RecordStore};
use std::path::PathBuf;
use std::time::Duration;

pub struct MonthlyArgs {
    pub subject: String,
    pub name: Option<String>,
    pub gender: String,
    pub year: i32,
    pub month: u32,
    pub format: ReportFormat,
    pub offline: bool,
    pub json: bool,
}

pub fn run(args: MonthlyArgs) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let config = InsightsConfig::load(&paths)?;
    let window = MonthWindow::new(args.year, args.month)?;
    let identity = Identity::new(args.name.as_deref(), Gender::parse(&args.gender));
    let store = super::open_store(&paths)?;
    let generator = Generator::from_config(&config, args.offline);

    let report = super::runtime()?.block_on(build_monthly(
        &store,
        &generator,
        &args.subject,
        &identity,
        window,
        config.generation_timeout(),
    ))?;

    let context = RenderContext {
        subject_name: identity.name.clone(),
        generated_at: Utc::now(),
    };
    let written = write_artifacts(&paths, &args.subject, &report, &context, args.format)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
    }
    println!(
        "✓ {} report for {}: {} observation(s)",
        window.label(),
        identity.name,
        report.summary.total_observations
    );
    for path in written {
        println!("  - {}", path.display());
    }
    Ok(())
}

/// A month's summary with its narrative, and the per-day series behind the charts
pub struct MonthlyReport {
    pub summary: MonthlySummary,
    pub series: MetricSeries,
}

pub async fn build_monthly<S: RecordStore, G: Completion>(
    store: &S,
    generator: &G,
    subject_id: &str,
    identity: &Identity,
    window: MonthWindow,
    timeout: Duration,
) -> anyhow::Result<MonthlyReport> {
    let (observations, goals) = store.month_inputs(subject_id, window)?;
    tracing::info!(
        subject = subject_id,
        window = %window.label(),
        observations = observations.len(),
        goals = goals.len(),
        "building monthly report"
    );

    let summary = summarize(&observations, &goals, window);
    let series = extract_across_corpus(observations.iter().filter(|o| window.contains(o.date)));
    let summary = synthesize_monthly(generator, summary, identity, timeout).await;
    Ok(MonthlyReport { summary, series })
}

/// Render the requested artifacts and write each one atomically
pub fn write_artifacts(
    paths: &Paths,
    subject_id: &str,
    report: &MonthlyReport,
    context: &RenderContext,
    format: ReportFormat,
) -> anyhow::Result<Vec<PathBuf>> {
    let window = report.summary.window;
    let target = |ext: &str| paths.report_file(subject_id, window.year(), window.month(), ext);
    let mut written = Vec::new();

    if format.includes(ReportFormat::Docx) {
        let path = target("docx");
        atomic_write(&path, &render_narrative_document(&report.summary, context)?)?;
        written.push(path);
    }
    if format.includes(ReportFormat::Xlsx) {
        let path = target("xlsx");
        atomic_write(&path, &render_spreadsheet(&report.summary, &report.series)?)?;
        written.push(path);
    }
    if format.includes(ReportFormat::Html) {
        let path = target("html");
        atomic_write(&path, render_printable_narrative(&report.summary, context).as_bytes())?;
        written.push(path);
    }
    if format.includes(ReportFormat::Txt) {
        let path = target("txt");
        atomic_write(&path, render_plain_text(&report.summary, context).as_bytes())?;
        written.push(path);
    }
    Ok(written)
}
