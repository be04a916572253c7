use std::path::PathBuf;
use thiserror::Error;

/// Failure talking to the sync/analyze backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("backend reported `{status}`: {message}")]
    Backend { status: String, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Network unreachable, timed out, or non-2xx.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Status(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ApiError::Malformed(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config directory available")]
    NoConfigDir,
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
