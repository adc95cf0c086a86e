//! Fetch error type for retry classification.

/// Error returned by a single asset fetch attempt.
///
/// `Clone` so one failure can be handed to every caller waiting on the same fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The per-attempt timeout fired.
    #[error("request timed out")]
    Timeout,
    /// The transfer was cancelled before completion.
    #[error("request aborted")]
    Aborted,
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Connection-level failure (refused, reset, DNS, empty reply).
    #[error("connection: {0}")]
    Connection(String),
    /// Anything else reported by the transport.
    #[error("{0}")]
    Other(String),
}
