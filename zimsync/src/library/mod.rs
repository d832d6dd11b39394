//! Reader library registration via the external `kiwix-manage` tool.
//!
//! The library XML format is owned by the Kiwix tooling, so this module
//! never touches the file directly. Every mutation shells out to the
//! configured executable; lookups parse its plain-text `show` output.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

/// Registration boundary between the sync engine and the reader library.
///
/// Implementations must be idempotent enough for a retry after a partial
/// run: adding an already-registered archive or removing an unknown one is
/// not an error at the call sites.
pub trait LibraryRegistrar: Send + Sync {
    /// Register an archive file with the library.
    fn add(&self, archive: &Path) -> io::Result<()>;

    /// Remove an archive file's entry from the library, if present.
    fn remove(&self, archive: &Path) -> io::Result<()>;
}

/// [`LibraryRegistrar`] backed by the `kiwix-manage` executable.
pub struct KiwixManage {
    executable: PathBuf,
    library_path: PathBuf,
}

impl KiwixManage {
    pub fn new(executable: impl Into<PathBuf>, library_path: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            library_path: library_path.into(),
        }
    }

    fn run(&self, args: &[&str]) -> io::Result<Output> {
        let output = Command::new(&self.executable)
            .arg(&self.library_path)
            .args(args)
            .output()?;

        if !output.status.success() {
            return Err(io::Error::other(format!(
                "{} {} exited with {}: {}",
                self.executable.display(),
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim(),
            )));
        }
        Ok(output)
    }

    /// Library entry id for an archive path, via `kiwix-manage show`.
    fn lookup_id(&self, archive: &Path) -> io::Result<Option<String>> {
        let output = self.run(&["show"])?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(find_archive_id(&stdout, archive))
    }
}

impl LibraryRegistrar for KiwixManage {
    fn add(&self, archive: &Path) -> io::Result<()> {
        debug!(archive = %archive.display(), "Registering archive with library");
        let archive = archive.to_str().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "archive path is not valid UTF-8")
        })?;
        self.run(&["add", archive])?;
        Ok(())
    }

    fn remove(&self, archive: &Path) -> io::Result<()> {
        match self.lookup_id(archive)? {
            Some(id) => {
                debug!(archive = %archive.display(), id, "Removing archive from library");
                self.run(&["remove", &id])?;
            }
            None => {
                debug!(archive = %archive.display(), "Archive not in library, nothing to remove");
            }
        }
        Ok(())
    }
}

/// Extract the entry id whose `path:` line matches `archive` from
/// `kiwix-manage show` output.
///
/// The output lists one block per entry; each block carries an `id:` line
/// followed by attribute lines including `path:`. The id of the most recent
/// `id:` line seen before the matching `path:` line is returned.
fn find_archive_id(output: &str, archive: &Path) -> Option<String> {
    let wanted = archive.to_str()?;
    let mut current_id: Option<&str> = None;

    for line in output.lines() {
        let line = line.trim();
        if let Some(id) = line.strip_prefix("id:") {
            current_id = Some(id.trim());
        } else if let Some(path) = line.strip_prefix("path:") {
            if path.trim() == wanted {
                return current_id.map(|id| id.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_OUTPUT: &str = "\
        id: 8bd3e778-a5d4-4456-9a48-a1e5ffcc6b21\n\
        \tpath: /srv/zim/archives/wikipedia.zim\n\
        \ttitle: Wikipedia\n\
        id: 2d4ab1be-12f8-4f27-81a4-7e7bd68c4c43\n\
        \tpath: /srv/zim/archives/wiktionary.zim\n\
        \ttitle: Wiktionary\n";

    #[test]
    fn test_find_archive_id_matches_exact_path() {
        let id = find_archive_id(SHOW_OUTPUT, Path::new("/srv/zim/archives/wiktionary.zim"));
        assert_eq!(id.as_deref(), Some("2d4ab1be-12f8-4f27-81a4-7e7bd68c4c43"));
    }

    #[test]
    fn test_find_archive_id_returns_first_block() {
        let id = find_archive_id(SHOW_OUTPUT, Path::new("/srv/zim/archives/wikipedia.zim"));
        assert_eq!(id.as_deref(), Some("8bd3e778-a5d4-4456-9a48-a1e5ffcc6b21"));
    }

    #[test]
    fn test_find_archive_id_unknown_path() {
        let id = find_archive_id(SHOW_OUTPUT, Path::new("/srv/zim/archives/other.zim"));
        assert!(id.is_none());
    }

    #[test]
    fn test_find_archive_id_ignores_partial_path_match() {
        let id = find_archive_id(SHOW_OUTPUT, Path::new("/srv/zim/archives/wiki"));
        assert!(id.is_none());
    }

    #[test]
    fn test_find_archive_id_empty_output() {
        assert!(find_archive_id("", Path::new("/srv/zim/archives/wikipedia.zim")).is_none());
    }

    #[test]
    fn test_failing_executable_surfaces_error() {
        let manage = KiwixManage::new("/nonexistent/kiwix-manage", "/tmp/library.xml");
        assert!(manage.add(Path::new("/tmp/foo.zim")).is_err());
    }
}
