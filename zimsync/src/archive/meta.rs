//! Per-file download manifests.

use std::collections::BTreeMap;

/// One candidate source for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    /// Location label, e.g. a country code.
    pub location: String,
    /// Priority; lower values are attempted first.
    pub priority: i64,
    /// Download URL.
    pub url: String,
}

/// The per-file manifest fetched from an entry's meta link.
///
/// Transient: fetched fresh for every download attempt and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMeta {
    /// Final file name for the download.
    pub file_name: String,
    /// Declared size in bytes.
    pub size: u64,
    /// Hash algorithm name (e.g. `sha-256`) to expected hex digest.
    pub hashes: BTreeMap<String, String>,
    /// Candidate mirrors, in document order.
    pub mirrors: Vec<Mirror>,
}

impl ArchiveMeta {
    /// Mirrors sorted by ascending priority. The sort is stable, so ties
    /// keep their original document order.
    pub fn mirrors_by_priority(&self) -> Vec<&Mirror> {
        let mut mirrors: Vec<&Mirror> = self.mirrors.iter().collect();
        mirrors.sort_by_key(|m| m.priority);
        mirrors
    }
}
