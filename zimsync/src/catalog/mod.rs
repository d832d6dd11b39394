//! Remote catalog access.
//!
//! The catalog is an Atom-like feed of available archives. This module
//! provides:
//! - The [`CatalogClient`] trait, the seam between the sync engine and the
//!   network (`feed` and `metalink` parsing is shared by any implementation)
//! - [`HttpCatalog`], the blocking HTTP implementation
//! - Feed parsing into [`crate::archive::ArchiveEntry`] values (`feed`)
//! - Manifest parsing into [`crate::archive::ArchiveMeta`] values (`metalink`)

mod feed;
mod http;
mod metalink;

use crate::archive::{ArchiveEntry, ArchiveMeta};
use std::collections::BTreeSet;

pub use http::HttpCatalog;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while talking to the remote catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// The HTTP request did not succeed.
    Unavailable { url: String, reason: String },

    /// The response could not be parsed into well-formed records.
    Malformed { url: String, reason: String },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { url, reason } => {
                write!(f, "catalog unavailable at {}: {}", url, reason)
            }
            Self::Malformed { url, reason } => {
                write!(f, "malformed catalog response from {}: {}", url, reason)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Client for the remote archive catalog.
///
/// The sync planner and the update driver depend on this trait rather than
/// a concrete client, so tests can substitute a canned catalog.
pub trait CatalogClient: Send + Sync {
    /// Search the catalog for available archives.
    ///
    /// Any subset of filters may be omitted, meaning "no restriction". The
    /// full result set is requested (no pagination).
    ///
    /// # Errors
    ///
    /// [`CatalogError::Unavailable`] on HTTP-level failure,
    /// [`CatalogError::Malformed`] if the feed or any entry in it cannot be
    /// parsed. A single bad entry fails the whole search; entries are never
    /// silently skipped.
    fn search(
        &self,
        languages: Option<&BTreeSet<String>>,
        category: Option<&str>,
        query: Option<&str>,
    ) -> CatalogResult<Vec<ArchiveEntry>>;

    /// Fetch and parse the per-file manifest behind an entry's meta link.
    fn resolve_meta(&self, meta_link: &str) -> CatalogResult<ArchiveMeta>;
}

/// Search the catalog and render the hits as subscription config blocks.
///
/// Each hit becomes one `[[archive]]` block ready to paste into the config
/// file; blocks are separated by a blank line.
pub fn search_configs(
    catalog: &dyn CatalogClient,
    languages: Option<&BTreeSet<String>>,
    category: Option<&str>,
    query: Option<&str>,
) -> CatalogResult<String> {
    let entries = catalog.search(languages, category, query)?;
    let blocks: Vec<String> = entries
        .iter()
        .map(|entry| entry.to_reference().to_config_text())
        .collect();
    Ok(blocks.join("\n\n"))
}
