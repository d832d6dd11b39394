//! Multi-mirror archive downloads.
//!
//! This module implements the acquisition half of the engine:
//! - [`Transport`] - the seam between the download loop and the network
//! - [`Downloader`] - mirror-priority download loop with disk-space
//!   precondition and atomic publish via a `.part` temporary file
//! - [`verify`] - streaming post-download integrity check
//!
//! Mirrors are tried strictly in ascending priority order; a failure on one
//! mirror advances to the next, while a disk-space shortfall aborts the
//! whole fetch (space will not differ between mirrors of the same file).

mod disk;
mod downloader;
mod transport;
mod verify;

use std::io;
use std::path::PathBuf;

pub use downloader::Downloader;
pub use transport::{HttpTransport, Transport};
pub use verify::verify;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Per-chunk progress callback: (bytes downloaded, total bytes).
///
/// Purely a display concern; progress reporting never affects control flow.
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Errors that can occur while downloading or verifying an archive.
#[derive(Debug)]
pub enum FetchError {
    /// A single mirror's probe or transfer failed. Recovered locally by
    /// advancing to the next mirror.
    Mirror { url: String, reason: String },

    /// Every mirror was exhausted without a complete transfer.
    AllMirrorsFailed { file_name: String, attempts: usize },

    /// The file would not fit on the destination volume. Deliberately
    /// operation-fatal rather than mirror-local.
    InsufficientSpace {
        path: PathBuf,
        needed: u64,
        available: u64,
    },

    /// The downloaded file did not match its expected digest.
    Verification {
        path: PathBuf,
        algorithm: String,
        expected: String,
        actual: String,
    },

    /// The manifest supplied no hash with a supported algorithm.
    NoSupportedHash,

    /// Local file I/O failed.
    Io { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mirror { url, reason } => {
                write!(f, "mirror {} failed: {}", url, reason)
            }
            Self::AllMirrorsFailed {
                file_name,
                attempts,
            } => {
                write!(
                    f,
                    "could not download {} from any mirror ({} attempted)",
                    file_name, attempts
                )
            }
            Self::InsufficientSpace {
                path,
                needed,
                available,
            } => {
                write!(
                    f,
                    "{} bytes needed but only {} available at {}",
                    needed,
                    available,
                    path.display()
                )
            }
            Self::Verification {
                path,
                algorithm,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "{} failed {} verification: expected {}, got {}",
                    path.display(),
                    algorithm,
                    expected,
                    actual
                )
            }
            Self::NoSupportedHash => write!(f, "no supported hash in manifest"),
            Self::Io { path, source } => {
                write!(f, "I/O error at {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
