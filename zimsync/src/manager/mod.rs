//! Update orchestration.
//!
//! [`ArchiveManager`] ties the planner, downloader, state store and library
//! registrar together into the end-to-end update operation. Per-archive
//! failures are collected into the report rather than aborting the batch;
//! only state-store failures are fatal, since continuing past one would
//! desynchronize disk and database.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use tracing::{info, warn};

use crate::archive::{ArchiveDetails, ArchiveEntry, ArchiveReference};
use crate::catalog::CatalogClient;
use crate::fetch::{verify, Downloader, FetchError, ProgressCallback, Transport};
use crate::library::LibraryRegistrar;
use crate::store::{StateStore, StoreError};
use crate::sync::{self, SyncError, SyncPlan};

/// Default number of concurrent archive downloads.
const DEFAULT_POOL_SIZE: usize = 4;

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors that abort an update run outright.
#[derive(Debug)]
pub enum ManagerError {
    /// Planning against the catalog or store failed.
    Sync(SyncError),

    /// The installed-state store failed mid-run.
    Store(StoreError),

    /// Filesystem setup or cleanup failed.
    Io { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for ManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync(e) => write!(f, "{}", e),
            Self::Store(e) => write!(f, "{}", e),
            Self::Io { path, source } => {
                write!(f, "I/O error at {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ManagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sync(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<SyncError> for ManagerError {
    fn from(e: SyncError) -> Self {
        Self::Sync(e)
    }
}

impl From<StoreError> for ManagerError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Factory for per-archive progress callbacks: (file name, total bytes).
///
/// Carries a lifetime so the factory can borrow caller-local state, such as
/// a terminal progress-bar container.
pub type ProgressFactory<'a> = dyn Fn(&str, u64) -> ProgressCallback + Send + Sync + 'a;

/// Knobs for a single update run.
pub struct UpdateOptions<'a> {
    /// Verify downloaded files against the manifest's digest.
    pub verify: bool,

    /// Check free disk space before each download.
    pub check_size: bool,

    /// Maximum concurrent downloads.
    pub pool_size: usize,

    /// Called with the plan before any work; returning `false` aborts.
    pub confirm: Option<&'a dyn Fn(&SyncPlan) -> bool>,

    /// Builds a progress callback per archive. Display-only.
    pub progress: Option<&'a ProgressFactory<'a>>,
}

impl Default for UpdateOptions<'_> {
    fn default() -> Self {
        Self {
            verify: true,
            check_size: true,
            pool_size: DEFAULT_POOL_SIZE,
            confirm: None,
            progress: None,
        }
    }
}

/// One archive that could not be brought up to date.
#[derive(Debug)]
pub struct FailedArchive {
    pub name: String,
    pub reason: String,
}

/// Outcome of an update run.
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Versions downloaded and recorded this run.
    pub downloaded: Vec<ArchiveDetails>,

    /// Versions removed this run (unsubscribed or superseded).
    pub deleted: Vec<ArchiveDetails>,

    /// Archives that failed; the rest of the batch still ran.
    pub failed: Vec<FailedArchive>,

    /// The confirmation callback declined the plan.
    pub aborted: bool,
}

impl UpdateReport {
    /// Whether every planned action completed.
    pub fn is_success(&self) -> bool {
        !self.aborted && self.failed.is_empty()
    }
}

/// End-to-end update driver.
///
/// Generic over its three collaborators so tests can run the full flow
/// against fakes, without network or external processes.
pub struct ArchiveManager<C, T, R>
where
    C: CatalogClient,
    T: Transport,
    R: LibraryRegistrar,
{
    catalog: C,
    downloader: Downloader<T>,
    store: StateStore,
    registrar: R,
    archive_dir: PathBuf,
}

impl<C, T, R> ArchiveManager<C, T, R>
where
    C: CatalogClient,
    T: Transport,
    R: LibraryRegistrar,
{
    /// Create a manager, creating `archive_dir` if missing.
    ///
    /// # Errors
    ///
    /// [`ManagerError::Io`] when the directory cannot be created, including
    /// when the path exists but is a plain file.
    pub fn new(
        catalog: C,
        downloader: Downloader<T>,
        store: StateStore,
        registrar: R,
        archive_dir: impl Into<PathBuf>,
    ) -> ManagerResult<Self> {
        let archive_dir = archive_dir.into();
        fs::create_dir_all(&archive_dir).map_err(|e| ManagerError::Io {
            path: archive_dir.clone(),
            source: e,
        })?;

        Ok(Self {
            catalog,
            downloader,
            store,
            registrar,
            archive_dir,
        })
    }

    /// Bring the installation in line with the subscriptions.
    ///
    /// Plans against the catalog, downloads what is missing or outdated
    /// (concurrently when more than one archive is due), records each
    /// success in the store, registers it with the library, and removes
    /// unsubscribed or superseded versions.
    ///
    /// Library registration is best-effort: a failing `kiwix-manage` call
    /// is logged but never fails the run, since the archive itself is
    /// already installed and recorded.
    pub fn update(
        &self,
        subscriptions: &[ArchiveReference],
        options: &UpdateOptions<'_>,
    ) -> ManagerResult<UpdateReport> {
        let plan = sync::plan(&self.catalog, &self.store, subscriptions)?;

        if plan.is_empty() {
            info!("Nothing to update");
            return Ok(UpdateReport::default());
        }

        if let Some(confirm) = options.confirm {
            if !confirm(&plan) {
                info!("Update declined");
                return Ok(UpdateReport {
                    aborted: true,
                    ..UpdateReport::default()
                });
            }
        }

        let mut report = UpdateReport::default();

        let outcomes = self.download_batch(&plan.to_download, options);
        for outcome in outcomes {
            match outcome {
                Ok((details, path)) => self.record_install(details, &path, &mut report)?,
                Err(failed) => {
                    warn!(name = %failed.name, reason = %failed.reason, "Archive update failed");
                    report.failed.push(failed);
                }
            }
        }

        for details in plan.to_delete {
            self.remove_installed(&details)?;
            report.deleted.push(details);
        }

        info!(
            downloaded = report.downloaded.len(),
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Update finished"
        );
        Ok(report)
    }

    /// Download every planned entry, at most `pool_size` at a time.
    ///
    /// Results come back in plan order. A single entry is fetched inline on
    /// the calling thread. Workers borrow only the catalog and downloader;
    /// the state store stays on the calling thread.
    fn download_batch(
        &self,
        entries: &[ArchiveEntry],
        options: &UpdateOptions<'_>,
    ) -> Vec<Result<(ArchiveDetails, PathBuf), FailedArchive>> {
        let catalog = &self.catalog;
        let downloader = &self.downloader;
        let archive_dir = self.archive_dir.as_path();
        let check_size = options.check_size;
        let verify_download = options.verify;
        let progress = options.progress;

        if entries.len() <= 1 {
            return entries
                .iter()
                .map(|entry| {
                    Self::fetch_one(
                        catalog,
                        downloader,
                        archive_dir,
                        entry,
                        check_size,
                        verify_download,
                        progress,
                    )
                })
                .collect();
        }

        let pool_size = options.pool_size.max(1);
        let mut outcomes = Vec::with_capacity(entries.len());

        for batch in entries.chunks(pool_size) {
            thread::scope(|scope| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|entry| {
                        scope.spawn(move || {
                            Self::fetch_one(
                                catalog,
                                downloader,
                                archive_dir,
                                entry,
                                check_size,
                                verify_download,
                                progress,
                            )
                        })
                    })
                    .collect();
                for handle in handles {
                    match handle.join() {
                        Ok(outcome) => outcomes.push(outcome),
                        Err(_) => outcomes.push(Err(FailedArchive {
                            name: "unknown".to_string(),
                            reason: "download worker panicked".to_string(),
                        })),
                    }
                }
            });
        }

        outcomes
    }

    /// Resolve, download and verify a single archive.
    fn fetch_one(
        catalog: &C,
        downloader: &Downloader<T>,
        archive_dir: &Path,
        entry: &ArchiveEntry,
        check_size: bool,
        verify_download: bool,
        progress_factory: Option<&ProgressFactory<'_>>,
    ) -> Result<(ArchiveDetails, PathBuf), FailedArchive> {
        let failed = |reason: String| FailedArchive {
            name: entry.name.clone(),
            reason,
        };

        let meta = catalog
            .resolve_meta(&entry.meta_link)
            .map_err(|e| failed(e.to_string()))?;

        let progress = progress_factory.map(|factory| factory(&meta.file_name, meta.size));

        let path = downloader
            .fetch(archive_dir, &meta, check_size, progress.as_ref())
            .map_err(|e| failed(e.to_string()))?;

        if verify_download {
            if let Err(e) = verify(&path, &meta.hashes) {
                if matches!(e, FetchError::Verification { .. }) {
                    let _ = fs::remove_file(&path);
                }
                return Err(failed(e.to_string()));
            }
        }

        let details = ArchiveDetails::new(entry.to_reference(), entry.updated, &meta.file_name);
        Ok((details, path))
    }

    /// Record a completed download and retire the versions it supersedes.
    fn record_install(
        &self,
        details: ArchiveDetails,
        path: &Path,
        report: &mut UpdateReport,
    ) -> ManagerResult<()> {
        if !self.store.exists(&details.reference, &details.updated)? {
            self.store.insert(&details)?;
        }

        if let Err(e) = self.registrar.add(path) {
            warn!(
                error = %e,
                archive = %path.display(),
                "Library registration failed, archive remains installed"
            );
        }

        let superseded = self.store.older_than(&details.reference, &details.updated)?;
        for old in superseded {
            self.remove_installed(&old)?;
            report.deleted.push(old);
        }

        info!(archive = %details.reference, file = %details.file_name, "Installed");
        report.downloaded.push(details);
        Ok(())
    }

    /// Remove a version's file, library entry and store row.
    fn remove_installed(&self, details: &ArchiveDetails) -> ManagerResult<()> {
        let path = self.archive_dir.join(&details.file_name);

        if let Err(e) = self.registrar.remove(&path) {
            warn!(error = %e, archive = %path.display(), "Library removal failed");
        }

        if path.exists() {
            fs::remove_file(&path).map_err(|e| ManagerError::Io {
                path: path.clone(),
                source: e,
            })?;
        }

        self.store.delete(details)?;
        info!(archive = %details.reference, file = %details.file_name, "Removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveMeta, ArchiveReference, Mirror};
    use crate::catalog::CatalogResult;
    use crate::fetch::FetchResult;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::{BTreeMap, BTreeSet, HashMap};
    use std::io::Read;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const BODY: &[u8] = b"zim archive bytes";
    // SHA-256 of BODY
    const BODY_SHA256: &str = "0a947fd1543915efadd82f6d02e9970522344291cbf3ad2e9f85ac4072945ee2";

    struct FakeCatalog {
        entries: Vec<ArchiveEntry>,
        metas: HashMap<String, ArchiveMeta>,
    }

    impl CatalogClient for FakeCatalog {
        fn search(
            &self,
            _languages: Option<&BTreeSet<String>>,
            _category: Option<&str>,
            _query: Option<&str>,
        ) -> CatalogResult<Vec<ArchiveEntry>> {
            Ok(self.entries.clone())
        }

        fn resolve_meta(&self, url: &str) -> CatalogResult<ArchiveMeta> {
            self.metas
                .get(url)
                .cloned()
                .ok_or_else(|| crate::catalog::CatalogError::Unavailable {
                    url: url.to_string(),
                    reason: "no such manifest".to_string(),
                })
        }
    }

    struct FakeTransport;

    impl Transport for FakeTransport {
        fn content_length(&self, _url: &str) -> FetchResult<Option<u64>> {
            Ok(Some(BODY.len() as u64))
        }

        fn get(&self, _url: &str) -> FetchResult<Box<dyn Read>> {
            Ok(Box::new(std::io::Cursor::new(BODY.to_vec())))
        }
    }

    #[derive(Default)]
    struct RecordingRegistrar {
        added: Mutex<Vec<PathBuf>>,
        removed: Mutex<Vec<PathBuf>>,
        fail_add: bool,
    }

    impl LibraryRegistrar for RecordingRegistrar {
        fn add(&self, archive: &Path) -> io::Result<()> {
            self.added.lock().unwrap().push(archive.to_path_buf());
            if self.fail_add {
                return Err(io::Error::other("library unavailable"));
            }
            Ok(())
        }

        fn remove(&self, archive: &Path) -> io::Result<()> {
            self.removed.lock().unwrap().push(archive.to_path_buf());
            Ok(())
        }
    }

    fn jan() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn feb() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
    }

    fn entry(name: &str, updated: DateTime<Utc>) -> ArchiveEntry {
        ArchiveEntry {
            id: format!("urn:uuid:{}", name),
            title: name.to_string(),
            updated,
            summary: String::new(),
            language: ["eng"].iter().map(|l| l.to_string()).collect(),
            name: name.to_string(),
            flavour: None,
            category: None,
            tags: BTreeSet::new(),
            article_count: 0,
            media_count: 0,
            author_name: String::new(),
            publisher_name: String::new(),
            meta_link: format!("https://mirrors.example/{}.meta4", name),
        }
    }

    fn meta(file_name: &str, digest: &str) -> ArchiveMeta {
        let mut hashes = BTreeMap::new();
        hashes.insert("sha-256".to_string(), digest.to_string());
        ArchiveMeta {
            file_name: file_name.to_string(),
            size: BODY.len() as u64,
            hashes,
            mirrors: vec![Mirror {
                location: "us".to_string(),
                priority: 10,
                url: format!("https://mirror.example/{}", file_name),
            }],
        }
    }

    fn subscription(name: &str) -> ArchiveReference {
        ArchiveReference::new(name, ["eng"], None)
    }

    fn manager(
        temp: &TempDir,
        entries: Vec<ArchiveEntry>,
        metas: HashMap<String, ArchiveMeta>,
        registrar: RecordingRegistrar,
    ) -> ArchiveManager<FakeCatalog, FakeTransport, RecordingRegistrar> {
        ArchiveManager::new(
            FakeCatalog { entries, metas },
            Downloader::new(FakeTransport).with_space_probe(|_| Some(u64::MAX)),
            StateStore::in_memory().unwrap(),
            registrar,
            temp.path().join("archives"),
        )
        .unwrap()
    }

    fn options() -> UpdateOptions<'static> {
        UpdateOptions::default()
    }

    #[test]
    fn test_update_downloads_and_records_new_archive() {
        let temp = TempDir::new().unwrap();
        let e = entry("wikipedia", jan());
        let metas = HashMap::from([(e.meta_link.clone(), meta("wikipedia.zim", BODY_SHA256))]);
        let mgr = manager(&temp, vec![e], metas, RecordingRegistrar::default());

        let report = mgr.update(&[subscription("wikipedia")], &options()).unwrap();

        assert!(report.is_success());
        assert_eq!(report.downloaded.len(), 1);
        assert_eq!(report.downloaded[0].file_name, "wikipedia.zim");
        assert!(temp.path().join("archives/wikipedia.zim").exists());
        assert!(mgr.store.exists(&subscription("wikipedia"), &jan()).unwrap());
        assert_eq!(mgr.registrar.added.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_update_with_nothing_to_do_is_empty() {
        let temp = TempDir::new().unwrap();
        let mgr = manager(&temp, vec![], HashMap::new(), RecordingRegistrar::default());

        let report = mgr.update(&[subscription("wikipedia")], &options()).unwrap();
        assert!(report.is_success());
        assert!(report.downloaded.is_empty());
        assert!(report.deleted.is_empty());
    }

    #[test]
    fn test_failed_manifest_does_not_stop_batch() {
        let temp = TempDir::new().unwrap();
        let good = entry("wikipedia", jan());
        let bad = entry("wiktionary", jan());
        // Only the good entry has a manifest.
        let metas = HashMap::from([(good.meta_link.clone(), meta("wikipedia.zim", BODY_SHA256))]);
        let mgr = manager(&temp, vec![good, bad], metas, RecordingRegistrar::default());

        let report = mgr
            .update(
                &[subscription("wikipedia"), subscription("wiktionary")],
                &options(),
            )
            .unwrap();

        assert_eq!(report.downloaded.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "wiktionary");
        assert!(!report.is_success());
    }

    #[test]
    fn test_declined_confirmation_aborts() {
        let temp = TempDir::new().unwrap();
        let e = entry("wikipedia", jan());
        let metas = HashMap::from([(e.meta_link.clone(), meta("wikipedia.zim", BODY_SHA256))]);
        let mgr = manager(&temp, vec![e], metas, RecordingRegistrar::default());

        let decline = |_: &SyncPlan| false;
        let report = mgr
            .update(
                &[subscription("wikipedia")],
                &UpdateOptions {
                    confirm: Some(&decline),
                    ..options()
                },
            )
            .unwrap();

        assert!(report.aborted);
        assert!(report.downloaded.is_empty());
        assert!(!temp.path().join("archives/wikipedia.zim").exists());
    }

    #[test]
    fn test_verification_failure_removes_file_and_reports() {
        let temp = TempDir::new().unwrap();
        let e = entry("wikipedia", jan());
        let wrong = "0000000000000000000000000000000000000000000000000000000000000000";
        let metas = HashMap::from([(e.meta_link.clone(), meta("wikipedia.zim", wrong))]);
        let mgr = manager(&temp, vec![e], metas, RecordingRegistrar::default());

        let report = mgr.update(&[subscription("wikipedia")], &options()).unwrap();

        assert_eq!(report.failed.len(), 1);
        assert!(!temp.path().join("archives/wikipedia.zim").exists());
        assert!(!mgr.store.exists(&subscription("wikipedia"), &jan()).unwrap());
    }

    #[test]
    fn test_subsecond_version_settles_after_install() {
        let temp = TempDir::new().unwrap();
        let updated = DateTime::parse_from_rfc3339("2024-01-15T10:30:00.123Z")
            .unwrap()
            .with_timezone(&Utc);
        let e = entry("wikipedia", updated);
        let metas = HashMap::from([(e.meta_link.clone(), meta("wikipedia.zim", BODY_SHA256))]);
        let mgr = manager(&temp, vec![e], metas, RecordingRegistrar::default());

        let first = mgr.update(&[subscription("wikipedia")], &options()).unwrap();
        assert_eq!(first.downloaded.len(), 1);

        // The same catalog state must plan to nothing on the next run.
        let second = mgr.update(&[subscription("wikipedia")], &options()).unwrap();
        assert!(second.is_success());
        assert!(second.downloaded.is_empty());
        assert!(second.deleted.is_empty());
    }

    #[test]
    fn test_unsubscribed_archive_is_removed_everywhere() {
        let temp = TempDir::new().unwrap();
        let mgr = manager(&temp, vec![], HashMap::new(), RecordingRegistrar::default());

        let old = ArchiveDetails::new(subscription("wiktionary"), jan(), "wiktionary.zim");
        mgr.store.insert(&old).unwrap();
        let path = temp.path().join("archives/wiktionary.zim");
        fs::write(&path, b"old").unwrap();

        let report = mgr.update(&[], &options()).unwrap();

        assert_eq!(report.deleted.len(), 1);
        assert!(!path.exists());
        assert!(mgr.store.all().unwrap().is_empty());
        assert_eq!(mgr.registrar.removed.lock().unwrap().as_slice(), &[path]);
    }

    #[test]
    fn test_new_version_supersedes_old() {
        let temp = TempDir::new().unwrap();
        let e = entry("wikipedia", feb());
        let metas = HashMap::from([(e.meta_link.clone(), meta("wikipedia_feb.zim", BODY_SHA256))]);
        let mgr = manager(&temp, vec![e], metas, RecordingRegistrar::default());

        let old = ArchiveDetails::new(subscription("wikipedia"), jan(), "wikipedia_jan.zim");
        mgr.store.insert(&old).unwrap();
        let old_path = temp.path().join("archives/wikipedia_jan.zim");
        fs::write(&old_path, b"old").unwrap();

        let report = mgr.update(&[subscription("wikipedia")], &options()).unwrap();

        assert_eq!(report.downloaded.len(), 1);
        assert_eq!(report.deleted.len(), 1);
        assert_eq!(report.deleted[0].file_name, "wikipedia_jan.zim");
        assert!(!old_path.exists());
        assert!(temp.path().join("archives/wikipedia_feb.zim").exists());

        let remaining = mgr.store.find_all(&subscription("wikipedia")).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].updated, feb());
    }

    #[test]
    fn test_registration_failure_is_not_fatal() {
        let temp = TempDir::new().unwrap();
        let e = entry("wikipedia", jan());
        let metas = HashMap::from([(e.meta_link.clone(), meta("wikipedia.zim", BODY_SHA256))]);
        let registrar = RecordingRegistrar {
            fail_add: true,
            ..RecordingRegistrar::default()
        };
        let mgr = manager(&temp, vec![e], metas, registrar);

        let report = mgr.update(&[subscription("wikipedia")], &options()).unwrap();

        assert!(report.is_success());
        assert!(mgr.store.exists(&subscription("wikipedia"), &jan()).unwrap());
    }

    #[test]
    fn test_parallel_batch_downloads_all() {
        let temp = TempDir::new().unwrap();
        let names = ["alpha", "beta", "gamma", "delta", "epsilon"];
        let mut entries = Vec::new();
        let mut metas = HashMap::new();
        for name in names {
            let e = entry(name, jan());
            metas.insert(e.meta_link.clone(), meta(&format!("{}.zim", name), BODY_SHA256));
            entries.push(e);
        }
        let mgr = manager(&temp, entries, metas, RecordingRegistrar::default());

        let subscriptions: Vec<_> = names.iter().map(|n| subscription(n)).collect();
        let report = mgr
            .update(
                &subscriptions,
                &UpdateOptions {
                    pool_size: 2,
                    ..options()
                },
            )
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.downloaded.len(), 5);
        for name in names {
            assert!(temp.path().join(format!("archives/{}.zim", name)).exists());
        }
    }

    #[test]
    fn test_progress_factory_may_borrow_local_state() {
        let temp = TempDir::new().unwrap();
        let mut entries = Vec::new();
        let mut metas = HashMap::new();
        for name in ["wikipedia", "wiktionary"] {
            let e = entry(name, jan());
            metas.insert(e.meta_link.clone(), meta(&format!("{}.zim", name), BODY_SHA256));
            entries.push(e);
        }
        let mgr = manager(&temp, entries, metas, RecordingRegistrar::default());

        // Borrowed by the factory the way the CLI's bar container is.
        let seen = Mutex::new(Vec::new());
        let factory = |file_name: &str, total: u64| -> ProgressCallback {
            seen.lock().unwrap().push((file_name.to_string(), total));
            Box::new(|_, _| {})
        };

        let report = mgr
            .update(
                &[subscription("wikipedia"), subscription("wiktionary")],
                &UpdateOptions {
                    progress: Some(&factory),
                    pool_size: 2,
                    ..options()
                },
            )
            .unwrap();

        assert!(report.is_success());
        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                ("wikipedia.zim".to_string(), BODY.len() as u64),
                ("wiktionary.zim".to_string(), BODY.len() as u64),
            ]
        );
    }

    #[test]
    fn test_archive_dir_conflicting_with_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("archives");
        fs::write(&blocker, b"not a directory").unwrap();

        let result = ArchiveManager::new(
            FakeCatalog {
                entries: vec![],
                metas: HashMap::new(),
            },
            Downloader::new(FakeTransport),
            StateStore::in_memory().unwrap(),
            RecordingRegistrar::default(),
            blocker,
        );
        assert!(matches!(result, Err(ManagerError::Io { .. })));
    }
}
