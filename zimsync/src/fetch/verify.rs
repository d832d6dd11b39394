//! Streaming integrity verification.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::info;

use super::{FetchError, FetchResult};

/// Buffer size for reading files during digest calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Supported algorithms, strongest first. The first one present in the
/// manifest's hash map is the one used.
const PREFERENCE: [&str; 3] = ["sha-256", "sha-1", "md5"];

/// Verify a downloaded file against the manifest's hashes.
///
/// Streams the file through the strongest available digest; the file is
/// never loaded into memory whole. This is a pure post-condition check on
/// already-downloaded bytes - it never retries anything itself.
///
/// # Errors
///
/// [`FetchError::Verification`] on digest mismatch (carrying the algorithm
/// and both digests), [`FetchError::NoSupportedHash`] when the manifest
/// offers no usable algorithm.
pub fn verify(path: &Path, hashes: &BTreeMap<String, String>) -> FetchResult<()> {
    let (algorithm, expected) = PREFERENCE
        .iter()
        .find_map(|name| hashes.get(*name).map(|digest| (*name, digest.as_str())))
        .ok_or(FetchError::NoSupportedHash)?;

    info!(algorithm, path = %path.display(), "Verifying downloaded file");

    let actual = match algorithm {
        "sha-256" => digest_file::<Sha256>(path)?,
        "sha-1" => digest_file::<Sha1>(path)?,
        "md5" => digest_file::<Md5>(path)?,
        _ => unreachable!("algorithm comes from PREFERENCE"),
    };

    if actual != expected {
        return Err(FetchError::Verification {
            path: path.to_path_buf(),
            algorithm: algorithm.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Stream a file through a digest, returning the lowercase hex result.
fn digest_file<D: Digest>(path: &Path) -> FetchResult<String> {
    let mut file = File::open(path).map_err(|e| FetchError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = D::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| FetchError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    let mut hex = String::new();
    for byte in hasher.finalize() {
        write!(hex, "{:02x}", byte).expect("writing to a String cannot fail");
    }
    Ok(hex)
}
