use super::generate::Upload;
use super::Generator;
use insights_core::InsightsConfig;
use insights_fs::Paths;
use insights_synth::{
    review_communication, CommunicationReview, Completion, Gender, Identity, Parsed,
};
use std::path::PathBuf;

pub struct ReviewArgs {
    pub name: Option<String>,
    pub gender: String,
    pub observer: String,
    pub notes: PathBuf,
    pub mime: String,
    pub transcript: bool,
    pub offline: bool,
    pub json: bool,
}

pub fn run(args: ReviewArgs) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let config = InsightsConfig::load(&paths)?;
    let bytes = std::fs::read(&args.notes)?;
    let identity = Identity::new(args.name.as_deref(), Gender::parse(&args.gender));
    let generator = Generator::from_config(&config, args.offline);

    let review = super::runtime()?.block_on(review_upload(
        &generator,
        &config,
        Upload {
            bytes: &bytes,
            mime: &args.mime,
            transcript: args.transcript,
        },
        &identity,
        &args.observer,
    ))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(review.value())?);
    } else {
        println!("{}", review.value().to_text(&identity, &args.observer));
    }
    if review.is_fallback() {
        println!("⚠ Automated review unavailable; review this transcript manually");
    }
    Ok(())
}

/// Intake then review. Intake failures abort; generation failures fall back.
pub async fn review_upload<G: Completion>(
    generator: &G,
    config: &InsightsConfig,
    upload: Upload<'_>,
    identity: &Identity,
    observer: &str,
) -> anyhow::Result<Parsed<CommunicationReview>> {
    let transcript = upload.into_notes(config).await?;
    Ok(review_communication(
        generator,
        &transcript,
        identity,
        observer,
        config.generation_timeout(),
    )
    .await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_synth::OfflineGenerator;

    #[tokio::test]
    async fn test_offline_review_falls_back() {
        let identity = Identity::new(Some("Ava"), Gender::Female);
        let review = review_upload(
            &OfflineGenerator,
            &InsightsConfig::new(),
            Upload {
                bytes: b"What is that?\nA magnet, it sticks to the fridge",
                mime: "text/plain",
                transcript: true,
            },
            &identity,
            "Ms. Rao",
        )
        .await
        .unwrap();

        assert!(review.is_fallback());
        let text = review.value().to_text(&identity, "Ms. Rao");
        assert!(text.contains("Impact on the Student (Ava)"));
    }

    #[tokio::test]
    async fn test_blank_transcript_aborts() {
        let result = review_upload(
            &OfflineGenerator,
            &InsightsConfig::new(),
            Upload {
                bytes: b"\n\n",
                mime: "text/plain",
                transcript: true,
            },
            &Identity::default(),
            "Ms. Rao",
        )
        .await;
        assert!(result.is_err());
    }
}
