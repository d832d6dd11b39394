//! Blocking HTTP catalog client.

use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::info;

use super::{feed, metalink, CatalogClient, CatalogError, CatalogResult};
use crate::archive::{ArchiveEntry, ArchiveMeta};

/// Default timeout for catalog requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Catalog client backed by the remote Atom feed.
#[derive(Debug)]
pub struct HttpCatalog {
    client: Client,
    feed_url: String,
}

impl HttpCatalog {
    /// Create a catalog client for the given feed URL with default settings.
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self::with_timeout(feed_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a catalog client with a custom request timeout.
    pub fn with_timeout(feed_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            feed_url: feed_url.into(),
        }
    }

    /// The configured feed URL.
    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }
}

impl CatalogClient for HttpCatalog {
    fn search(
        &self,
        languages: Option<&BTreeSet<String>>,
        category: Option<&str>,
        query: Option<&str>,
    ) -> CatalogResult<Vec<ArchiveEntry>> {
        // count=-1 requests the full, unpaginated result set.
        let mut params: Vec<(&str, String)> = vec![("count", "-1".to_string())];
        if let Some(languages) = languages {
            let joined = languages.iter().cloned().collect::<Vec<_>>().join(",");
            params.push(("lang", joined));
        }
        if let Some(category) = category {
            params.push(("category", category.to_string()));
        }
        if let Some(query) = query {
            params.push(("q", query.to_string()));
        }

        let response = self
            .client
            .get(&self.feed_url)
            .query(&params)
            .send()
            .map_err(|e| CatalogError::Unavailable {
                url: self.feed_url.clone(),
                reason: e.to_string(),
            })?;

        let url = response.url().to_string();
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Unavailable {
                url,
                reason: format!("request failed with status {}", status),
            });
        }

        let body = response.text().map_err(|e| CatalogError::Unavailable {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let entries = feed::parse_feed(&body, &url)?;
        info!(url = %url, entries = entries.len(), "Queried catalog feed");
        Ok(entries)
    }

    fn resolve_meta(&self, meta_link: &str) -> CatalogResult<ArchiveMeta> {
        let response =
            self.client
                .get(meta_link)
                .send()
                .map_err(|e| CatalogError::Unavailable {
                    url: meta_link.to_string(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Unavailable {
                url: meta_link.to_string(),
                reason: format!("request failed with status {}", status),
            });
        }

        let body = response.text().map_err(|e| CatalogError::Unavailable {
            url: meta_link.to_string(),
            reason: e.to_string(),
        })?;

        metalink::parse_metalink(&body, meta_link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_catalog_new() {
        let catalog = HttpCatalog::new("https://library.kiwix.org/catalog/search");
        assert_eq!(catalog.feed_url(), "https://library.kiwix.org/catalog/search");
    }
}
