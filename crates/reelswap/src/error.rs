use thiserror::Error;

/// Why a feed page could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("feed request failed with status {0}")]
    Status(u16),
    #[error("malformed feed response: {0}")]
    Decode(String),
    #[error("feed request queue is full")]
    QueueFull,
    #[error("feed worker is no longer running")]
    WorkerGone,
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}
