use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by dictionary loading and refresh.
///
/// Only `MandatoryDictMissing` (and configuration problems) abort startup;
/// everything else is contained to the failing source's load or refresh
/// cycle and surfaced through logs.
#[derive(Debug, Error)]
pub enum DictError {
    /// A required base dictionary file could not be opened.
    #[error("mandatory dictionary `{name}` missing at {}: {source}", path.display())]
    MandatoryDictMissing {
        name: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration validation failed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// IO error reading a dictionary file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport failure fetching a remote word list.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A remote word list responded with a non-200 status.
    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Database query failure on an incremental word channel.
    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),
}
