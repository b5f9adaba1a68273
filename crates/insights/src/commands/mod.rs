pub mod extract;
pub mod generate;
pub mod import;
pub mod init;
pub mod monthly;
pub mod review;
pub mod suggest;
pub mod version;

use insights_core::InsightsConfig;
use insights_fs::Paths;
use insights_synth::{Completion, GenerationError, HttpGenerator, OfflineGenerator, SqliteStore};

/// The generation backend chosen at startup
pub enum Generator {
    Http(HttpGenerator),
    Offline(OfflineGenerator),
}

impl Generator {
    /// HTTP client when a key is configured, otherwise offline fallback
    pub fn from_config(config: &InsightsConfig, offline: bool) -> Self {
        if offline {
            return Generator::Offline(OfflineGenerator);
        }
        match HttpGenerator::new(&config.generation) {
            Ok(client) => Generator::Http(client),
            Err(e) => {
                tracing::warn!(error = %e, "generation service not configured, running offline");
                Generator::Offline(OfflineGenerator)
            }
        }
    }
}

impl Completion for Generator {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        match self {
            Generator::Http(client) => client.complete(prompt).await,
            Generator::Offline(offline) => offline.complete(prompt).await,
        }
    }
}

/// Single-threaded runtime; each command makes at most a couple of concurrent calls
pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Open the record store, creating the data directory if needed
pub fn open_store(paths: &Paths) -> anyhow::Result<SqliteStore> {
    std::fs::create_dir_all(&paths.root)?;
    SqliteStore::new(&paths.records_db())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_without_key_is_offline() {
        let config = InsightsConfig::new();
        assert!(matches!(
            Generator::from_config(&config, false),
            Generator::Offline(_)
        ));
    }

    #[test]
    fn test_generator_with_key() {
        let mut config = InsightsConfig::new();
        config.generation.api_key = Some("k".to_string());
        assert!(matches!(Generator::from_config(&config, false), Generator::Http(_)));
        assert!(matches!(Generator::from_config(&config, true), Generator::Offline(_)));
    }
}
