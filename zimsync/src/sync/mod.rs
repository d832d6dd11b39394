//! Reconciliation between subscriptions, the catalog, and installed state.
//!
//! The planner is read-only: it queries the catalog and the state store and
//! produces a [`SyncPlan`] describing what should happen. Executing the plan
//! (downloading, deleting, registering) is the manager's job.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::archive::{ArchiveDetails, ArchiveEntry, ArchiveReference};
use crate::catalog::{CatalogClient, CatalogError};
use crate::store::{StateStore, StoreError};

/// Result type for planning operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised while building a sync plan.
#[derive(Debug)]
pub enum SyncError {
    /// The catalog could not be queried or parsed.
    Catalog(CatalogError),

    /// The installed-state store failed.
    Store(StoreError),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog(e) => write!(f, "sync planning failed: {}", e),
            Self::Store(e) => write!(f, "sync planning failed: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(e) => Some(e),
            Self::Store(e) => Some(e),
        }
    }
}

impl From<CatalogError> for SyncError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// The work a sync run should perform.
///
/// Both lists empty means the installation is already up to date.
#[derive(Debug, Default)]
pub struct SyncPlan {
    /// Catalog entries that are subscribed and newer than anything installed.
    pub to_download: Vec<ArchiveEntry>,

    /// Installed versions whose subscription no longer exists.
    pub to_delete: Vec<ArchiveDetails>,
}

impl SyncPlan {
    /// Whether the plan contains no work at all.
    pub fn is_empty(&self) -> bool {
        self.to_download.is_empty() && self.to_delete.is_empty()
    }
}

/// Build a sync plan for the given subscriptions.
///
/// The catalog is queried once, filtered server-side to the union of all
/// subscribed languages. An entry is scheduled for download when its
/// reference matches a subscription and its `updated` timestamp is strictly
/// newer than the most recent installed version (or nothing is installed).
/// Installed rows whose reference matches no subscription are scheduled for
/// deletion.
///
/// Duplicate subscriptions collapse to one; re-running against an unchanged
/// catalog and store yields an empty plan.
///
/// # Errors
///
/// [`SyncError::Catalog`] when the feed cannot be fetched or parsed,
/// [`SyncError::Store`] when the installed-state store fails.
pub fn plan(
    catalog: &dyn CatalogClient,
    store: &StateStore,
    subscriptions: &[ArchiveReference],
) -> SyncResult<SyncPlan> {
    let subscribed: BTreeSet<&ArchiveReference> = subscriptions.iter().collect();

    // Most recent installed version per reference.
    let mut installed: HashMap<ArchiveReference, DateTime<Utc>> = HashMap::new();
    let mut to_delete = Vec::new();
    for details in store.all()? {
        if subscribed.contains(&details.reference) {
            installed
                .entry(details.reference.clone())
                .and_modify(|latest| {
                    if details.updated > *latest {
                        *latest = details.updated;
                    }
                })
                .or_insert(details.updated);
        } else {
            to_delete.push(details);
        }
    }

    if subscribed.is_empty() {
        debug!(deletions = to_delete.len(), "No subscriptions, skipping catalog query");
        return Ok(SyncPlan {
            to_download: Vec::new(),
            to_delete,
        });
    }

    let languages: BTreeSet<String> = subscribed
        .iter()
        .flat_map(|reference| reference.language.iter().cloned())
        .collect();

    let entries = catalog.search(Some(&languages), None, None)?;

    let mut to_download = Vec::new();
    for entry in entries {
        let reference = entry.to_reference();
        if !subscribed.contains(&reference) {
            continue;
        }
        let newer = match installed.get(&reference) {
            Some(latest) => entry.updated > *latest,
            None => true,
        };
        if newer {
            to_download.push(entry);
        }
    }

    debug!(
        downloads = to_download.len(),
        deletions = to_delete.len(),
        "Built sync plan"
    );

    Ok(SyncPlan {
        to_download,
        to_delete,
    })
}
