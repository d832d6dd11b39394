//! Installed archive versions.

use chrono::{DateTime, Utc};

use super::ArchiveReference;

/// One installed archive version, as persisted in the state store.
///
/// The (reference, updated) pair uniquely identifies a row; `file_name` is
/// the name of the downloaded file inside the archive directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDetails {
    /// Version-independent identity.
    pub reference: ArchiveReference,
    /// Version identity.
    pub updated: DateTime<Utc>,
    /// On-disk file name inside the archive directory.
    pub file_name: String,
}

impl ArchiveDetails {
    /// Create details for a freshly downloaded archive.
    pub fn new(
        reference: ArchiveReference,
        updated: DateTime<Utc>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            reference,
            updated,
            file_name: file_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_details_equality_includes_version() {
        let reference = ArchiveReference::new("wikipedia", ["eng"], None);
        let jan = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        let a = ArchiveDetails::new(reference.clone(), jan, "wikipedia.zim");
        let b = ArchiveDetails::new(reference, feb, "wikipedia.zim");
        assert_ne!(a, b);
    }
}
