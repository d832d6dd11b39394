//! TOML configuration.
//!
//! One file declares the catalog feed, the base directory and the archive
//! subscriptions. Every path the engine touches (archive directory, library
//! XML, state database) is derived from `base_dir`; nothing else is
//! configurable per-path.
//!
//! ```toml
//! feed_url = "https://library.kiwix.org/catalog/v2/entries"
//! base_dir = "/srv/zim"
//! kiwix_manage_exec = "/usr/bin/kiwix-manage"
//!
//! [[archive]]
//! name = "wikipedia"
//! language = "eng,fra"
//! flavour = "maxi"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::archive::ArchiveReference;

/// Default catalog feed when the config does not name one.
pub const DEFAULT_FEED_URL: &str = "https://library.kiwix.org/catalog/v2/entries";

/// Default `kiwix-manage` invocation, resolved through `PATH`.
const DEFAULT_KIWIX_MANAGE: &str = "kiwix-manage";

/// Errors raised while locating or loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("no home directory found, set base_dir explicitly")]
    NoHomeDirectory,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    feed_url: Option<String>,
    base_dir: Option<PathBuf>,
    kiwix_manage_exec: Option<PathBuf>,
    #[serde(default)]
    archive: Vec<RawArchive>,
}

#[derive(Debug, Deserialize)]
struct RawArchive {
    name: String,
    language: String,
    flavour: Option<String>,
}

/// Loaded and defaulted configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub base_dir: PathBuf,
    pub kiwix_manage_exec: PathBuf,
    pub subscriptions: Vec<ArchiveReference>,
}

impl Config {
    /// Load the config file at `path`, applying defaults for absent keys.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        let base_dir = match raw.base_dir {
            Some(dir) => dir,
            None => default_base_dir()?,
        };

        let subscriptions = raw
            .archive
            .iter()
            .map(|a| ArchiveReference::from_parts(&a.name, &a.language, a.flavour.as_deref()))
            .collect();

        Ok(Self {
            feed_url: raw.feed_url.unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            base_dir,
            kiwix_manage_exec: raw
                .kiwix_manage_exec
                .unwrap_or_else(|| PathBuf::from(DEFAULT_KIWIX_MANAGE)),
            subscriptions,
        })
    }

    /// Conventional config location: `<config dir>/zimsync/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("zimsync").join("config.toml"))
            .ok_or(ConfigError::NoHomeDirectory)
    }

    /// Directory the archive files live in.
    pub fn archive_dir(&self) -> PathBuf {
        self.base_dir.join("archives")
    }

    /// Reader library XML maintained through `kiwix-manage`.
    pub fn library_path(&self) -> PathBuf {
        self.base_dir.join("library.xml")
    }

    /// Installed-state database.
    pub fn db_path(&self) -> PathBuf {
        self.base_dir.join("archives.db")
    }
}

fn default_base_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("zimsync"))
        .ok_or(ConfigError::NoHomeDirectory)
}
