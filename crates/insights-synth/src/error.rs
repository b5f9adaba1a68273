use std::time::Duration;
use thiserror::Error;

/// Failure reaching the generation service.
///
/// Never surfaced past the synthesis pipelines; every variant ends in a
/// fallback result.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generation service returned no text")]
    EmptyCompletion,

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("no API key configured")]
    MissingApiKey,

    #[error("generation unavailable: {0}")]
    Unavailable(String),
}

/// Failure turning uploaded bytes into text. Always surfaced to the caller.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("text extraction service unavailable: {0}")]
    Unavailable(String),

    #[error("text extraction timed out after {0:?}")]
    Timeout(Duration),

    #[error("no content detected in {mime_hint} upload")]
    NoContent { mime_hint: String },

    #[error("unsupported upload type: {0}")]
    Unsupported(String),

    #[error("{mime_hint} upload is not valid UTF-8: {source}")]
    Decode {
        mime_hint: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}
