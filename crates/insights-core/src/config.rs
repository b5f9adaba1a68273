//! Runtime configuration: built-in defaults, optional config.json, env overrides

use crate::CoreError;
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use insights_fs::Paths;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Generation service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Base URL of the generation API
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// API key; usually supplied through `INSIGHTS_API_KEY`
    pub api_key: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Per-call budget before the call is abandoned
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

/// OCR / transcription settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeSettings {
    pub timeout_secs: u64,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    pub generation: GenerationSettings,
    pub intake: IntakeSettings,

    /// Organization timezone as minutes east of UTC; session dates are local to it
    pub organization_utc_offset_minutes: i32,
}

impl InsightsConfig {
    pub fn new() -> Self {
        Self {
            generation: GenerationSettings::default(),
            intake: IntakeSettings::default(),
            organization_utc_offset_minutes: 0,
        }
    }

    /// Defaults, overlaid by `config.json` when present, overlaid by the environment
    pub fn load(paths: &Paths) -> Result<Self, CoreError> {
        let path = paths.config_file();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|source| CoreError::ConfigIo {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&contents)
                .map_err(|source| CoreError::ConfigParse { path, source })?
        } else {
            Self::new()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `INSIGHTS_API_KEY`, `INSIGHTS_MODEL` and `INSIGHTS_ENDPOINT` from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty("INSIGHTS_API_KEY") {
            self.generation.api_key = Some(key);
        }
        if let Some(model) = non_empty("INSIGHTS_MODEL") {
            self.generation.model = model;
        }
        if let Some(endpoint) = non_empty("INSIGHTS_ENDPOINT") {
            self.generation.endpoint = endpoint;
        }
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation.timeout_secs.max(1))
    }

    pub fn intake_timeout(&self) -> Duration {
        Duration::from_secs(self.intake.timeout_secs.max(1))
    }

    /// Today's date in the organization's timezone
    pub fn today(&self) -> NaiveDate {
        let offset = FixedOffset::east_opt(self.organization_utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix());
        Utc::now().with_timezone(&offset).date_naive()
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self::new()
    }
}
