use reprise_model::EpisodeKey;
use thiserror::Error;

/// Failures of the device-local progress cache.
#[derive(Error, Debug)]
pub enum ProgressStoreError {
    #[error("progress cache I/O failed: {0}")]
    Cache(String),

    #[error("progress record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<cacache::Error> for ProgressStoreError {
    fn from(err: cacache::Error) -> Self {
        ProgressStoreError::Cache(err.to_string())
    }
}

/// Failures talking to the remote progress store.
#[derive(Error, Debug)]
pub enum RemoteStoreError {
    #[error("progress request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("progress store answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid progress store url: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected progress store response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures of the session handle.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("playback session for {0} has shut down")]
    Closed(EpisodeKey),

    #[error("playback session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
