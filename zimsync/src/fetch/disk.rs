//! Free-space probing for the download precondition.

use std::path::{Path, PathBuf};

use sysinfo::Disks;

/// Available bytes on the volume holding `path`.
///
/// The destination directory may not exist yet when the probe runs, so the
/// nearest existing ancestor is used. Returns `None` when no disk can be
/// matched to the path; the caller treats that as "unknown" and skips the
/// check rather than failing.
pub(crate) fn available_space(path: &Path) -> Option<u64> {
    let target = nearest_existing_path(path);
    let target = std::fs::canonicalize(&target).unwrap_or(target);
    let disks = Disks::new_with_refreshed_list();
    let mounts: Vec<(PathBuf, u64)> = disks
        .list()
        .iter()
        .map(|disk| (disk.mount_point().to_path_buf(), disk.available_space()))
        .collect();
    volume_space(&target, &mounts)
}

/// Longest matching mount point wins. No matching mount means the volume is
/// unknown, not that space is short; answering with some other disk's free
/// space could fail a download that would have fit.
fn volume_space(target: &Path, mounts: &[(PathBuf, u64)]) -> Option<u64> {
    let mut best: Option<(usize, u64)> = None;
    for (mount, available) in mounts {
        if target.starts_with(mount) {
            let score = mount.as_os_str().len();
            match best {
                Some((best_score, _)) if best_score >= score => {}
                _ => best = Some((score, *available)),
            }
        }
    }
    best.map(|(_, available)| available)
}

fn nearest_existing_path(path: &Path) -> PathBuf {
    let mut candidate = path.to_path_buf();
    while !candidate.exists() {
        if !candidate.pop() {
            return PathBuf::from(".");
        }
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_existing_path_for_missing_child() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("does/not/exist");
        assert_eq!(nearest_existing_path(&missing), temp.path());
    }

    #[test]
    fn test_volume_space_prefers_longest_mount() {
        let mounts = [
            (PathBuf::from("/"), 100),
            (PathBuf::from("/data"), 50),
        ];
        assert_eq!(volume_space(Path::new("/data/archives"), &mounts), Some(50));
        assert_eq!(volume_space(Path::new("/var/tmp"), &mounts), Some(100));
    }

    #[test]
    fn test_volume_space_without_matching_mount_is_unknown() {
        let mounts = [(PathBuf::from("/mnt/disk"), 10)];
        assert_eq!(volume_space(Path::new("/elsewhere"), &mounts), None);
    }

    #[test]
    fn test_available_space_does_not_panic_on_missing_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("not/created/yet");
        // Environments without an enumerable disk list return None; either
        // way the probe must not panic.
        let _ = available_space(&missing);
    }
}
