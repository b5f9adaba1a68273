use crate::GenerationError;
use insights_core::GenerationSettings;
use std::future::Future;
use std::time::Duration;

/// A text-completion backend: prompt in, completion out, possibly malformed
pub trait Completion {
    fn complete(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// Client handle for a `generateContent`-style HTTP API.
///
/// Built once at startup and passed by reference to the pipelines.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl HttpGenerator {
    pub fn new(settings: &GenerationSettings) -> Result<Self, GenerationError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GenerationError::MissingApiKey)?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
            temperature: settings.temperature,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl Completion for HttpGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": prompt}]}],
                "generationConfig": {"temperature": self.temperature}
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        completion_text(&body).ok_or(GenerationError::EmptyCompletion)
    }
}

/// Concatenated text parts of the first candidate
fn completion_text(body: &serde_json::Value) -> Option<String> {
    let parts = body["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("");
    (!text.trim().is_empty()).then_some(text)
}

/// Stand-in used when no generation service is configured; every call fails
/// and the pipelines fall back.
#[derive(Debug, Clone, Default)]
pub struct OfflineGenerator;

impl Completion for OfflineGenerator {
    async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable("offline mode".to_string()))
    }
}

/// Run one completion under a time budget
pub async fn request_completion<G: Completion>(
    generator: &G,
    prompt: &str,
    timeout: Duration,
) -> Result<String, GenerationError> {
    let text = tokio::time::timeout(timeout, generator.complete(prompt))
        .await
        .map_err(|_| GenerationError::Timeout(timeout))??;
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyCompletion);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slow;

    impl Completion for Slow {
        async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }
    }

    struct Blank;

    impl Completion for Blank {
        async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok("   ".to_string())
        }
    }

    #[tokio::test]
    async fn test_request_completion_times_out() {
        let err = request_completion(&Slow, "p", Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_blank_completion_is_an_error() {
        let err = request_completion(&Blank, "p", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_offline_generator_fails() {
        let result = request_completion(&OfflineGenerator, "p", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(GenerationError::Unavailable(_))));
    }

    #[test]
    fn test_http_generator_requires_key() {
        let settings = GenerationSettings::default();
        assert!(matches!(
            HttpGenerator::new(&settings),
            Err(GenerationError::MissingApiKey)
        ));

        let settings = GenerationSettings {
            api_key: Some("k".to_string()),
            endpoint: "https://example.test/v1/".to_string(),
            ..GenerationSettings::default()
        };
        let generator = HttpGenerator::new(&settings).unwrap();
        assert_eq!(
            generator.url(),
            "https://example.test/v1/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_completion_text_joins_parts() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]
        });
        assert_eq!(completion_text(&body).as_deref(), Some("{\"a\":1}"));
        assert_eq!(completion_text(&serde_json::json!({})), None);
    }
}
