//! Single-attempt HTTP GET of the asset via libcurl.

use std::str;
use std::time::Duration;

use async_trait::async_trait;

use super::headers::parse_headers;
use super::AssetSource;
use crate::asset::Asset;
use crate::retry::{fetch_error_from_curl, FetchError};

/// Long-lived immutable caching hint sent with every asset request.
pub const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetches the asset from its static URL. Each `fetch` is one attempt bounded by `timeout`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    content_type: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, content_type: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.into(),
            timeout,
        }
    }
}

#[async_trait]
impl AssetSource for HttpSource {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Asset, FetchError> {
        let url = self.url.clone();
        let content_type = self.content_type.clone();
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || get_blocking(&url, &content_type, timeout))
            .await
            .map_err(|e| FetchError::Other(format!("fetch task failed: {}", e)))?
    }
}

/// Performs the GET on the current thread. Follows redirects.
fn get_blocking(url: &str, content_type: &str, timeout: Duration) -> Result<Asset, FetchError> {
    let curl_err = |e: curl::Error| fetch_error_from_curl(&e);

    let mut headers: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(curl_err)?;
    easy.follow_location(true).map_err(curl_err)?;
    easy.max_redirections(10).map_err(curl_err)?;
    easy.connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT)).map_err(curl_err)?;
    easy.timeout(timeout).map_err(curl_err)?;
    easy.tcp_keepalive(true).map_err(curl_err)?;

    let mut list = curl::easy::List::new();
    list.append(&format!("Cache-Control: {}", CACHE_CONTROL))
        .map_err(curl_err)?;
    list.append(&format!("Accept: {}", content_type))
        .map_err(curl_err)?;
    easy.http_headers(list).map_err(curl_err)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(curl_err)?;
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(curl_err)?;
        transfer.perform().map_err(curl_err)?;
    }

    let code = easy.response_code().map_err(curl_err)?;
    // file:// transfers report 0.
    if code != 0 && !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }

    let parsed = parse_headers(&headers);
    if let Some(expected) = parsed.content_length {
        if expected != body.len() as u64 {
            return Err(FetchError::Connection(format!(
                "partial transfer: expected {} bytes, got {}",
                expected,
                body.len()
            )));
        }
    }

    let content_type = parsed.content_type.unwrap_or_else(|| content_type.to_string());
    tracing::debug!(url, bytes = body.len(), %content_type, "fetched asset");
    Ok(Asset::new(body, content_type))
}
