use super::Generator;
use chrono::NaiveDate;
use insights_core::{InsightsConfig, ObservationRecord};
use insights_fs::Paths;
use insights_synth::{
    basic_dialogue, intake_text, synthesize_session, Completion, Gender, Identity,
    PlainTextSource, RecordStore,
};
use std::path::PathBuf;

pub struct GenerateArgs {
    pub subject: String,
    pub name: Option<String>,
    pub gender: String,
    pub date: Option<String>,
    pub notes: PathBuf,
    pub mime: String,
    pub transcript: bool,
    pub offline: bool,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let config = InsightsConfig::load(&paths)?;
    let date = match &args.date {
        Some(raw) => parse_date(raw)?,
        None => config.today(),
    };
    let bytes = std::fs::read(&args.notes)?;
    let identity = Identity::new(args.name.as_deref(), Gender::parse(&args.gender));
    let generator = Generator::from_config(&config, args.offline);
    let store = super::open_store(&paths)?;

    let record = super::runtime()?.block_on(generate_record(
        &generator,
        &config,
        Upload {
            bytes: &bytes,
            mime: &args.mime,
            transcript: args.transcript,
        },
        &identity,
        &args.subject,
        date,
    ))?;

    if !store.insert_observation(&record)? {
        anyhow::bail!("observation {} already stored", record.id);
    }

    println!("{}", record.narrative_report.text());
    println!();
    if record.narrative_report.is_fallback() {
        println!("⚠ Stored fallback report {} (generation unavailable)", record.id);
    } else {
        println!("✓ Stored report {}", record.id);
    }
    Ok(())
}

pub fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid date {raw:?}, expected YYYY-MM-DD: {e}"))
}

/// An uploaded notes file
pub struct Upload<'a> {
    pub bytes: &'a [u8],
    pub mime: &'a str,
    /// Lay the notes out as an observer/child exchange
    pub transcript: bool,
}

impl Upload<'_> {
    pub async fn into_notes(self, config: &InsightsConfig) -> anyhow::Result<String> {
        let notes =
            intake_text(&PlainTextSource, self.bytes, self.mime, config.intake_timeout()).await?;
        Ok(if self.transcript {
            basic_dialogue(&notes)
        } else {
            notes
        })
    }
}

/// Intake then synthesis. Intake failures abort; generation failures fall back.
pub async fn generate_record<G: Completion>(
    generator: &G,
    config: &InsightsConfig,
    upload: Upload<'_>,
    identity: &Identity,
    subject_id: &str,
    date: NaiveDate,
) -> anyhow::Result<ObservationRecord> {
    let notes = upload.into_notes(config).await?;
    Ok(synthesize_session(
        generator,
        &notes,
        identity,
        subject_id,
        date,
        config.generation_timeout(),
    )
    .await)
}
