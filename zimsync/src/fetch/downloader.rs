//! Mirror-priority download loop.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::disk;
use super::transport::Transport;
use super::{FetchError, FetchResult, ProgressCallback};
use crate::archive::{ArchiveMeta, Mirror};

/// Buffer size for streaming downloads to disk (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Suffix for in-flight downloads. Readers never observe a partial file at
/// the final path; the completed temporary is renamed into place.
const PART_SUFFIX: &str = ".part";

type SpaceProbe = Box<dyn Fn(&Path) -> Option<u64> + Send + Sync>;

/// Downloads one archive file by trying its mirrors in priority order.
///
/// Each mirror is given one attempt: a metadata probe (optional), a
/// streamed transfer into a `.part` file, and an atomic rename on
/// completion. Mirror-local failures advance to the next mirror; a
/// disk-space shortfall aborts the whole fetch.
pub struct Downloader<T: Transport> {
    transport: T,
    space_probe: SpaceProbe,
}

impl<T: Transport> Downloader<T> {
    /// Create a downloader over the given transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            space_probe: Box::new(disk::available_space),
        }
    }

    /// Replace the free-space probe. Used by tests to simulate full disks.
    pub fn with_space_probe(
        mut self,
        probe: impl Fn(&Path) -> Option<u64> + Send + Sync + 'static,
    ) -> Self {
        self.space_probe = Box::new(probe);
        self
    }

    /// Download the file described by `meta` into `dest_dir`.
    ///
    /// Mirrors are attempted strictly in ascending priority order (stable
    /// on ties). With `check_size` enabled, each attempt starts with a
    /// content-length probe compared against free space on the destination
    /// volume.
    ///
    /// Returns the final path of the published file.
    ///
    /// # Errors
    ///
    /// [`FetchError::InsufficientSpace`] aborts the fetch before any byte
    /// is streamed; [`FetchError::AllMirrorsFailed`] when every mirror was
    /// exhausted; [`FetchError::Io`] on local write failures.
    pub fn fetch(
        &self,
        dest_dir: &Path,
        meta: &ArchiveMeta,
        check_size: bool,
        progress: Option<&ProgressCallback>,
    ) -> FetchResult<PathBuf> {
        let mirrors = meta.mirrors_by_priority();
        for mirror in &mirrors {
            match self.try_mirror(dest_dir, mirror, meta, check_size, progress) {
                Ok(path) => {
                    info!(url = %mirror.url, path = %path.display(), "Download complete");
                    return Ok(path);
                }
                Err(FetchError::Mirror { url, reason }) => {
                    warn!(url = %url, reason = %reason, "Mirror failed, trying next");
                }
                Err(fatal) => return Err(fatal),
            }
        }

        Err(FetchError::AllMirrorsFailed {
            file_name: meta.file_name.clone(),
            attempts: mirrors.len(),
        })
    }

    /// One attempt against one mirror: probe, stream to `.part`, publish.
    fn try_mirror(
        &self,
        dest_dir: &Path,
        mirror: &Mirror,
        meta: &ArchiveMeta,
        check_size: bool,
        progress: Option<&ProgressCallback>,
    ) -> FetchResult<PathBuf> {
        let total_size = if check_size {
            let declared = self
                .transport
                .content_length(&mirror.url)?
                .ok_or_else(|| FetchError::Mirror {
                    url: mirror.url.clone(),
                    reason: "no content length declared".to_string(),
                })?;

            // The shortfall is operation-fatal, not mirror-local: the file
            // is the same size on every mirror.
            if let Some(available) = (self.space_probe)(dest_dir) {
                if available < declared {
                    return Err(FetchError::InsufficientSpace {
                        path: dest_dir.to_path_buf(),
                        needed: declared,
                        available,
                    });
                }
            }
            declared
        } else {
            meta.size
        };

        debug!(url = %mirror.url, location = %mirror.location, "Starting transfer");
        let mut reader = self.transport.get(&mirror.url)?;

        let final_path = dest_dir.join(&meta.file_name);
        let part_path = dest_dir.join(format!("{}{}", meta.file_name, PART_SUFFIX));

        let file = File::create(&part_path).map_err(|e| FetchError::Io {
            path: part_path.clone(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut downloaded: u64 = 0;

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(n) => n,
                Err(e) => {
                    drop(writer);
                    fs::remove_file(&part_path).ok();
                    return Err(FetchError::Mirror {
                        url: mirror.url.clone(),
                        reason: format!("read error: {}", e),
                    });
                }
            };

            if bytes_read == 0 {
                break;
            }

            if let Err(e) = writer.write_all(&buffer[..bytes_read]) {
                drop(writer);
                fs::remove_file(&part_path).ok();
                return Err(FetchError::Io {
                    path: part_path.clone(),
                    source: e,
                });
            }

            downloaded += bytes_read as u64;
            if let Some(cb) = progress {
                cb(downloaded, total_size);
            }
        }

        if let Err(e) = writer.flush() {
            drop(writer);
            fs::remove_file(&part_path).ok();
            return Err(FetchError::Io {
                path: part_path.clone(),
                source: e,
            });
        }
        drop(writer);

        fs::rename(&part_path, &final_path).map_err(|e| FetchError::Io {
            path: final_path.clone(),
            source: e,
        })?;

        Ok(final_path)
    }
}
