//! Catalog feed entries.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::ArchiveReference;

/// One result from a catalog search.
///
/// Entries describe a specific available version of an archive. They are
/// constructed only by the feed parser; the rest of the engine treats them
/// as immutable facts about the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Feed-assigned entry id.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Timestamp of this version. This is the version identity used when
    /// deciding whether an installed archive is out of date.
    pub updated: DateTime<Utc>,
    /// Short description.
    pub summary: String,
    /// Set of language codes.
    pub language: BTreeSet<String>,
    /// Archive name.
    pub name: String,
    /// Optional flavour qualifier.
    pub flavour: Option<String>,
    /// Optional category.
    pub category: Option<String>,
    /// Set of tags.
    pub tags: BTreeSet<String>,
    /// Number of articles in the archive.
    pub article_count: u64,
    /// Number of media files in the archive.
    pub media_count: u64,
    /// Author name.
    pub author_name: String,
    /// Publisher name.
    pub publisher_name: String,
    /// Link to the per-file download manifest.
    pub meta_link: String,
}

impl ArchiveEntry {
    /// Project this entry onto its version-independent identity.
    pub fn to_reference(&self) -> ArchiveReference {
        ArchiveReference {
            name: self.name.clone(),
            language: self.language.clone(),
            flavour: self.flavour.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry() -> ArchiveEntry {
        ArchiveEntry {
            id: "urn:uuid:1234".to_string(),
            title: "Wikipedia".to_string(),
            updated: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            summary: "The free encyclopedia".to_string(),
            language: ["eng".to_string(), "fra".to_string()].into(),
            name: "wikipedia".to_string(),
            flavour: Some("maxi".to_string()),
            category: Some("wikipedia".to_string()),
            tags: ["wikipedia".to_string()].into(),
            article_count: 1000,
            media_count: 200,
            author_name: "Wikipedia".to_string(),
            publisher_name: "Kiwix".to_string(),
            meta_link: "https://example.org/wikipedia.zim.meta4".to_string(),
        }
    }

    #[test]
    fn test_to_reference_projects_identity() {
        let e = entry();
        let r = e.to_reference();
        assert_eq!(r.name, "wikipedia");
        assert_eq!(r.language_key(), "eng,fra");
        assert_eq!(r.flavour.as_deref(), Some("maxi"));
    }

    #[test]
    fn test_entries_with_same_fields_are_equal() {
        assert_eq!(entry(), entry());
    }
}
