use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single fetch cycle (weather or news).
///
/// Transport-level and payload-shape failures are carried separately so
/// callers can log them distinctly, but both count the same way for
/// fallback accounting: the request is retried on the next scheduled
/// poll, never immediately.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("server returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed payload: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Fatal configuration problem. The process does not start degraded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not determine platform config directory")]
    NoConfigDir,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
