use super::Generator;
use insights_core::InsightsConfig;
use insights_fs::Paths;
use insights_synth::{
    suggest_topics, Completion, Gender, Identity, Parsed, RecordStore, TopicSuggestions,
};

pub struct SuggestArgs {
    pub subject: String,
    pub name: Option<String>,
    pub gender: String,
    pub recent: usize,
    pub offline: bool,
    pub json: bool,
}

pub fn run(args: SuggestArgs) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let config = InsightsConfig::load(&paths)?;
    let identity = Identity::new(args.name.as_deref(), Gender::parse(&args.gender));
    let store = super::open_store(&paths)?;
    let generator = Generator::from_config(&config, args.offline);

    let topics = super::runtime()?.block_on(suggest_for(
        &store,
        &generator,
        &args.subject,
        &identity,
        args.recent,
        &config,
    ))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(topics.value())?);
    } else {
        println!("{}", topics.value().to_text());
    }
    Ok(())
}

/// Topic suggestions from the subject's latest `recent` observations
pub async fn suggest_for<S: RecordStore, G: Completion>(
    store: &S,
    generator: &G,
    subject_id: &str,
    identity: &Identity,
    recent: usize,
    config: &InsightsConfig,
) -> anyhow::Result<Parsed<TopicSuggestions>> {
    let history = store.recent_observations(subject_id, recent)?;
    if history.is_empty() {
        tracing::warn!(subject = subject_id, "no stored observations, suggesting from scratch");
    }
    Ok(suggest_topics(generator, &history, identity, config.generation_timeout()).await)
}
