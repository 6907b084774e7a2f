//! Error types for the replicated log service.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the master and secondary nodes.
///
/// Matches the propagation policy in the design: bad requests and admission
/// denial are surfaced immediately, durability timeouts are returned but
/// leave the log entry in place, and transient peer failures never reach a
/// client directly (they drive health state and queue retries instead).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("no quorum, master is read-only")]
    NoQuorum,

    #[error("write concern w={w} not satisfied")]
    WriteConcernTimeout { w: usize },

    #[error("peer error: {0}")]
    Peer(String),

    #[error("connection timeout to {0}")]
    ConnectionTimeout(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error reflects a transient condition that a retry loop
    /// should swallow rather than propagate to a client.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Peer(_) | Error::ConnectionTimeout(_) | Error::Http(_)
        )
    }
}
