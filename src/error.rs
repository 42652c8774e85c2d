use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the polling pipeline.
///
/// Everything except `NoMatch` is fatal for the run: the binaries propagate
/// it up to `main` and exit. `NoMatch` means a queried field or entity was
/// absent from the scraped text; callers default or skip instead of aborting.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("session error on {host}: {source}")]
    Connection {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no interface config file found under {0}")]
    ConfigNotFound(PathBuf),

    #[error("could not resolve domain from {path}: {reason}")]
    ResolveParse { path: PathBuf, reason: String },

    #[error("field {0:?} not found in scraped output")]
    NoMatch(String),

    #[error("sink write to {target} failed: {reason}")]
    SinkWrite { target: String, reason: String },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl PollError {
    pub fn connection(host: impl Into<String>, source: std::io::Error) -> Self {
        Self::Connection {
            host: host.into(),
            source,
        }
    }

    pub fn sink_write(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::SinkWrite {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PollError>;
