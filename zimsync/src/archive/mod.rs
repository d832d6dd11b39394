//! Core archive data model.
//!
//! Types describing ZIM archives at the different stages of their lifecycle:
//! - [`ArchiveReference`] - stable identity of an archive family across versions
//! - [`ArchiveEntry`] - one catalog search result describing an available version
//! - [`ArchiveDetails`] - one installed version, as recorded in the state store
//! - [`ArchiveMeta`] - per-file download manifest (size, hashes, mirrors)

mod details;
mod entry;
mod meta;
mod reference;

pub use details::ArchiveDetails;
pub use entry::ArchiveEntry;
pub use meta::{ArchiveMeta, Mirror};
pub use reference::ArchiveReference;
