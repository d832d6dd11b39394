//! Zimsync - subscription-based ZIM archive synchronization
//!
//! This library keeps a local collection of ZIM archives in line with a set
//! of subscriptions: it queries an OPDS catalog feed, downloads new or
//! updated archives from prioritized mirrors, verifies them, tracks
//! installed versions in a local database, and registers them with the
//! Kiwix reader library.
//!
//! The pieces compose bottom-up:
//! - [`archive`] - domain types (subscriptions, catalog entries, manifests)
//! - [`catalog`] - OPDS feed and metalink manifest access
//! - [`fetch`] - multi-mirror download loop with integrity verification
//! - [`store`] - installed-state persistence
//! - [`sync`] - reconciliation planning
//! - [`library`] - reader library registration via `kiwix-manage`
//! - [`manager`] - the end-to-end update driver
//! - [`config`] - TOML configuration

pub mod archive;
pub mod catalog;
pub mod config;
pub mod fetch;
pub mod library;
pub mod manager;
pub mod store;
pub mod sync;

pub use archive::{ArchiveDetails, ArchiveEntry, ArchiveMeta, ArchiveReference, Mirror};
pub use catalog::{search_configs, CatalogClient, CatalogError, HttpCatalog};
pub use config::{Config, ConfigError};
pub use fetch::{Downloader, FetchError, HttpTransport, ProgressCallback, Transport};
pub use library::{KiwixManage, LibraryRegistrar};
pub use manager::{ArchiveManager, ManagerError, ProgressFactory, UpdateOptions, UpdateReport};
pub use store::{StateStore, StoreError};
pub use sync::{SyncError, SyncPlan};
