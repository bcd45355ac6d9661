use thiserror::Error;

/// Message shown when a spreadsheet cannot be produced
pub const EXPORT_FAILED_MESSAGE: &str = "Error al generar el archivo. Inténtalo de nuevo.";

/// cotizador error types
#[derive(Error, Debug)]
pub enum CotizadorError {
    /// Failed to parse JSON or a formatted value
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed or returned an unexpected payload
    #[error("http error: {0}")]
    Http(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// User input rejected before any backend call
    #[error("invalid input: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Spreadsheet generation failed
    #[error("{EXPORT_FAILED_MESSAGE} ({0})")]
    Export(String),

    /// Last quote store could not be read or written
    #[error("store error: {0}")]
    Store(String),
}

/// Result type alias for cotizador
pub type Result<T> = std::result::Result<T, CotizadorError>;
