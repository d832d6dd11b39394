//! Stable archive identity.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

/// The stable identity of an archive family across versions.
///
/// A reference is the (name, language set, flavour) triple that identifies
/// an archive on the remote catalog independent of any specific release.
/// The language set is unordered; a `BTreeSet` keeps value equality
/// order-insensitive and gives a canonical sorted order for serialization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchiveReference {
    /// Archive name, e.g. `wikipedia`.
    pub name: String,

    /// Set of language codes, e.g. `{eng, fra}`.
    pub language: BTreeSet<String>,

    /// Optional flavour qualifier, e.g. `maxi`.
    pub flavour: Option<String>,
}

impl ArchiveReference {
    /// Create a reference from a name, an iterable of language codes and an
    /// optional flavour.
    pub fn new<I, S>(name: impl Into<String>, language: I, flavour: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            language: language.into_iter().map(Into::into).collect(),
            flavour,
        }
    }

    /// Parse the comma-joined language form used by the config file and the
    /// state store, e.g. `"eng,fra"`.
    pub fn from_parts(name: &str, language_csv: &str, flavour: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            language: language_csv
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect(),
            flavour: flavour.map(|f| f.to_string()),
        }
    }

    /// Canonical comma-joined language string (sorted), as stored on disk.
    pub fn language_key(&self) -> String {
        self.language.iter().cloned().collect::<Vec<_>>().join(",")
    }

    /// The on-disk file name for this archive.
    ///
    /// With an `updated` timestamp the name is versioned
    /// (`wikipedia_2024-01-15T00:00:00Z.zim`), otherwise plain
    /// (`wikipedia.zim`).
    pub fn to_file_name(&self, updated: Option<&DateTime<Utc>>) -> String {
        match updated {
            Some(ts) => format!(
                "{}_{}.zim",
                self.name,
                ts.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            None => format!("{}.zim", self.name),
        }
    }

    /// Render this reference as a `[[archive]]` block suitable for pasting
    /// into the config file. The flavour line is omitted when absent.
    pub fn to_config_text(&self) -> String {
        let mut lines = vec![
            "[[archive]]".to_string(),
            format!("name = \"{}\"", self.name),
            format!("language = \"{}\"", self.language_key()),
        ];
        if let Some(flavour) = &self.flavour {
            lines.push(format!("flavour = \"{}\"", flavour));
        }
        lines.join("\n")
    }
}

impl fmt::Display for ArchiveReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.flavour {
            Some(flavour) => write!(f, "{} [{}] ({})", self.name, self.language_key(), flavour),
            None => write!(f, "{} [{}]", self.name, self.language_key()),
        }
    }
}
