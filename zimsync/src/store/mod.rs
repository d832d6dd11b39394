//! Persistent installed-state index.
//!
//! A small SQLite table maps archive identity (name, language set, flavour)
//! plus the `updated` version timestamp to the downloaded file name. Each
//! operation runs as its own implicit transaction; the store survives
//! process restart.
//!
//! The (name, language, flavour) key is deliberately non-unique across
//! versions. Duplicate prevention for the full key including `updated` is
//! the caller's responsibility via [`StateStore::exists`] before insert.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};

use crate::archive::{ArchiveDetails, ArchiveReference};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the installed-state store.
///
/// Underlying SQLite errors propagate unmodified; they are always fatal to
/// the calling operation.
#[derive(Debug)]
pub enum StoreError {
    /// The underlying database operation failed.
    Database(rusqlite::Error),

    /// A stored timestamp could not be parsed back.
    BadTimestamp { value: String, reason: String },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database(e) => write!(f, "state store error: {}", e),
            Self::BadTimestamp { value, reason } => {
                write!(f, "bad timestamp {:?} in state store: {}", value, reason)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            Self::BadTimestamp { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e)
    }
}

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS archives (
        name TEXT NOT NULL,
        language TEXT NOT NULL,
        flavour TEXT,
        updated TEXT NOT NULL,
        file_name TEXT NOT NULL
    )
";

const INSERT_ARCHIVE: &str = "
    INSERT INTO archives (name, language, flavour, updated, file_name)
    VALUES (?1, ?2, ?3, ?4, ?5)
";

const SELECT_ARCHIVES: &str = "
    SELECT name, language, flavour, updated, file_name FROM archives
    WHERE name = ?1 AND language = ?2 AND flavour IS ?3
    ORDER BY updated DESC
";

const SELECT_ALL: &str = "
    SELECT name, language, flavour, updated, file_name FROM archives
";

const SELECT_OLDER: &str = "
    SELECT name, language, flavour, updated, file_name FROM archives
    WHERE name = ?1 AND language = ?2 AND flavour IS ?3 AND updated < ?4
";

const ARCHIVE_EXISTS: &str = "
    SELECT EXISTS(
        SELECT 1 FROM archives
        WHERE name = ?1 AND language = ?2 AND flavour IS ?3 AND updated = ?4
    )
";

const DELETE_ARCHIVE: &str = "
    DELETE FROM archives
    WHERE name = ?1 AND language = ?2 AND flavour IS ?3 AND updated = ?4
";

/// Durable index of installed archive versions.
pub struct StateStore {
    conn: Connection,
}

impl StateStore {
    /// Open (creating if necessary) the store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory store. Used by tests; contents vanish on drop.
    pub fn in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute(CREATE_TABLE, [])?;
        Ok(Self { conn })
    }

    /// Record an installed archive version.
    ///
    /// The caller is expected to have checked [`exists`](Self::exists)
    /// first; duplicate rows are not rejected here.
    pub fn insert(&self, details: &ArchiveDetails) -> StoreResult<()> {
        self.conn.execute(
            INSERT_ARCHIVE,
            params![
                details.reference.name,
                details.reference.language_key(),
                details.reference.flavour,
                timestamp(&details.updated),
                details.file_name,
            ],
        )?;
        Ok(())
    }

    /// Whether this exact (reference, updated) version is recorded.
    pub fn exists(&self, reference: &ArchiveReference, updated: &DateTime<Utc>) -> StoreResult<bool> {
        let found: i64 = self.conn.query_row(
            ARCHIVE_EXISTS,
            params![
                reference.name,
                reference.language_key(),
                reference.flavour,
                timestamp(updated),
            ],
            |row| row.get(0),
        )?;
        Ok(found != 0)
    }

    /// All installed versions of one reference, most recent first.
    pub fn find_all(&self, reference: &ArchiveReference) -> StoreResult<Vec<ArchiveDetails>> {
        let mut stmt = self.conn.prepare(SELECT_ARCHIVES)?;
        let rows = stmt.query_map(
            params![reference.name, reference.language_key(), reference.flavour],
            details_from_row,
        )?;
        collect(rows)
    }

    /// Every installed archive version, in no particular order.
    pub fn all(&self) -> StoreResult<Vec<ArchiveDetails>> {
        let mut stmt = self.conn.prepare(SELECT_ALL)?;
        let rows = stmt.query_map([], details_from_row)?;
        collect(rows)
    }

    /// Installed versions of one reference strictly older than `cutoff`.
    pub fn older_than(
        &self,
        reference: &ArchiveReference,
        cutoff: &DateTime<Utc>,
    ) -> StoreResult<Vec<ArchiveDetails>> {
        let mut stmt = self.conn.prepare(SELECT_OLDER)?;
        let rows = stmt.query_map(
            params![
                reference.name,
                reference.language_key(),
                reference.flavour,
                timestamp(cutoff),
            ],
            details_from_row,
        )?;
        collect(rows)
    }

    /// Delete the row matching (name, language, flavour, updated) exactly.
    /// No-op when absent.
    pub fn delete(&self, details: &ArchiveDetails) -> StoreResult<()> {
        self.conn.execute(
            DELETE_ARCHIVE,
            params![
                details.reference.name,
                details.reference.language_key(),
                details.reference.flavour,
                timestamp(&details.updated),
            ],
        )?;
        Ok(())
    }
}

/// Canonical stored form of a timestamp. Fixed-width microseconds keep SQL
/// string comparison consistent with chronological order while round-tripping
/// the subsecond precision catalog feeds may carry.
fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn details_from_row(row: &Row<'_>) -> rusqlite::Result<(ArchiveDetails, String)> {
    let name: String = row.get(0)?;
    let language: String = row.get(1)?;
    let flavour: Option<String> = row.get(2)?;
    let updated: String = row.get(3)?;
    let file_name: String = row.get(4)?;

    Ok((
        ArchiveDetails {
            reference: ArchiveReference::from_parts(&name, &language, flavour.as_deref()),
            // Placeholder; parsed below where a StoreError can be raised.
            updated: DateTime::<Utc>::MIN_UTC,
            file_name,
        },
        updated,
    ))
}

fn collect(
    rows: impl Iterator<Item = rusqlite::Result<(ArchiveDetails, String)>>,
) -> StoreResult<Vec<ArchiveDetails>> {
    let mut out = Vec::new();
    for row in rows {
        let (mut details, raw) = row?;
        details.updated = DateTime::parse_from_rfc3339(&raw)
            .map_err(|e| StoreError::BadTimestamp {
                value: raw,
                reason: e.to_string(),
            })?
            .with_timezone(&Utc);
        out.push(details);
    }
    Ok(out)
}
