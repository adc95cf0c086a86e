//! Retry and backoff policy for asset fetches.
//!
//! Classifies fetch failures (timeouts, throttling, connection errors, HTTP
//! status) and decides linear backoff between attempts.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_http_status, fetch_error_from_curl};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
