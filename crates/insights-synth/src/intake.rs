//! Turning uploads into note text. Failures here end the request.

use crate::IntakeError;
use std::future::Future;
use std::time::Duration;

/// OCR, transcription or plain-text decoding: bytes in, text out
pub trait TextSource {
    fn extract_text(
        &self,
        bytes: &[u8],
        mime_hint: &str,
    ) -> impl Future<Output = Result<String, IntakeError>> + Send;
}

/// Typed notes uploaded as `text/*`
#[derive(Debug, Clone, Default)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    async fn extract_text(&self, bytes: &[u8], mime_hint: &str) -> Result<String, IntakeError> {
        let mime = mime_hint.trim().to_ascii_lowercase();
        if !(mime.is_empty() || mime.starts_with("text/")) {
            return Err(IntakeError::Unsupported(mime_hint.to_string()));
        }
        String::from_utf8(bytes.to_vec()).map_err(|source| IntakeError::Decode {
            mime_hint: mime_hint.to_string(),
            source,
        })
    }
}

/// Extract text under a time budget and reject empty results
pub async fn intake_text<S: TextSource>(
    source: &S,
    bytes: &[u8],
    mime_hint: &str,
    timeout: Duration,
) -> Result<String, IntakeError> {
    let text = tokio::time::timeout(timeout, source.extract_text(bytes, mime_hint))
        .await
        .map_err(|_| IntakeError::Timeout(timeout))??;

    let text = text.trim();
    if text.is_empty() {
        return Err(IntakeError::NoContent {
            mime_hint: mime_hint.to_string(),
        });
    }
    tracing::debug!(chars = text.chars().count(), mime_hint, "intake produced text");
    Ok(text.to_string())
}
