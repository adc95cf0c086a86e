//! Classify HTTP status and curl errors into retry policy error kinds.

use super::error::FetchError;
use super::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        _ => ErrorKind::Http(u16::try_from(code).unwrap_or(u16::MAX)),
    }
}

/// Map a curl error onto a fetch error.
pub fn fetch_error_from_curl(e: &curl::Error) -> FetchError {
    if e.is_operation_timedout() {
        return FetchError::Timeout;
    }
    if e.is_aborted_by_callback() {
        return FetchError::Aborted;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return FetchError::Connection(e.to_string());
    }
    FetchError::Other(e.to_string())
}

/// Classify a fetch error into an ErrorKind.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Timeout => ErrorKind::Timeout,
        FetchError::Aborted => ErrorKind::Aborted,
        FetchError::Http(code) => classify_http_status(*code),
        FetchError::Connection(_) => ErrorKind::Connection,
        FetchError::Other(_) => ErrorKind::Other,
    }
}
