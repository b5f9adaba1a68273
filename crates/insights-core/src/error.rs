use std::path::PathBuf;

/// Errors raised by the core record and configuration layer
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid month window {year}-{month:02}")]
    InvalidWindow { year: i32, month: u32 },

    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
