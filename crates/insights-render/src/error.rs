use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("spreadsheet encoding failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("document encoding failed: {0}")]
    Document(String),
}
