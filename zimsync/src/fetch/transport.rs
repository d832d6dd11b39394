//! Network transport for mirror downloads.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;

use super::{FetchError, FetchResult};

/// Default timeout for download requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// Byte transport for mirror URLs.
///
/// The download loop depends on this trait rather than a concrete HTTP
/// client so tests can simulate slow, truncated, or failing mirrors.
/// Any error returned here is mirror-local: the caller moves on to the
/// next mirror.
pub trait Transport: Send + Sync {
    /// Probe the declared content length of a URL without fetching the body.
    ///
    /// Returns `Ok(None)` when the server does not declare a length.
    fn content_length(&self, url: &str) -> FetchResult<Option<u64>>;

    /// Open a streaming reader over the response body.
    fn get(&self, url: &str) -> FetchResult<Box<dyn Read>>;
}

/// Transport backed by a blocking HTTP client.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Create a transport with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a transport with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Transport for HttpTransport {
    fn content_length(&self, url: &str) -> FetchResult<Option<u64>> {
        let response = self
            .client
            .head(url)
            .send()
            .map_err(|e| FetchError::Mirror {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Mirror {
                url: url.to_string(),
                reason: format!("HEAD request failed with status {}", status),
            });
        }

        Ok(response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok()))
    }

    fn get(&self, url: &str) -> FetchResult<Box<dyn Read>> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Mirror {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Mirror {
                url: url.to_string(),
                reason: format!("GET request failed with status {}", status),
            });
        }

        Ok(Box::new(response))
    }
}
