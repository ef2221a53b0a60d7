//! The package manager facade.
//!
//! [`PackageManager`] owns the registry, the remote catalog, the derived
//! availability sets and the fetch state. Every mutation goes through
//! `&mut self`, so one install or removal runs at a time and notifications
//! are emitted in mutation order. Only the catalog request runs on a
//! separate task; its result is applied by [`PackageManager::wait_for_catalog`]
//! or [`PackageManager::poll_catalog`].

mod builder;

pub use builder::PackageManagerBuilder;

use crate::catalog::{parse_catalog, CatalogSource, FetchState};
use crate::error::{LangpackError, Result};
use crate::events::{EventReceiver, EventSender, ManagerEvent};
use crate::installer::Installer;
use crate::package::{manifest::manifest_path, PackageIdentity, PackageRecord};
use crate::reconcile::Reconciler;
use crate::registry::PackageRegistry;
use crate::scanner::{DirectoryScanner, ScanReport};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// How far a removal got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalState {
    /// Nothing deleted yet.
    Present,
    /// The manifest is gone; the directory could not be fully deleted.
    ManifestDeleted,
    /// The package directory is gone.
    FullyDeleted,
}

type FetchOutcome = Result<Vec<u8>>;

/// Single owner of all package state.
pub struct PackageManager {
    managed_dir: PathBuf,
    search_dir: Option<PathBuf>,
    catalog_url: String,
    source: Arc<dyn CatalogSource>,
    events: EventSender,
    registry: PackageRegistry,
    reconciler: Reconciler,
    installer: Installer,
    scanner: DirectoryScanner,
    catalog: Vec<PackageRecord>,
    pending_archives: Vec<PathBuf>,
    fetch_state: FetchState,
    fetch_result: Option<oneshot::Receiver<FetchOutcome>>,
}

impl std::fmt::Debug for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageManager")
            .field("managed_dir", &self.managed_dir)
            .field("search_dir", &self.search_dir)
            .field("catalog_url", &self.catalog_url)
            .field("installed", &self.registry.len())
            .field("catalog", &self.catalog.len())
            .field("fetch_state", &self.fetch_state)
            .finish()
    }
}

impl PackageManager {
    /// Start configuring a manager for `managed_dir`.
    pub fn builder(managed_dir: impl Into<PathBuf>) -> PackageManagerBuilder {
        PackageManagerBuilder::new(managed_dir)
    }

    pub(crate) fn new(
        managed_dir: PathBuf,
        search_dir: Option<PathBuf>,
        catalog_url: String,
        source: Arc<dyn CatalogSource>,
    ) -> Self {
        let events = EventSender::new();
        Self {
            installer: Installer::new(&managed_dir),
            registry: PackageRegistry::new(events.clone()),
            reconciler: Reconciler::new(events.clone()),
            scanner: DirectoryScanner::new(events.clone()),
            managed_dir,
            search_dir,
            catalog_url,
            source,
            events,
            catalog: Vec::new(),
            pending_archives: Vec::new(),
            fetch_state: FetchState::Idle,
            fetch_result: None,
        }
    }

    // ========================================
    // Accessors
    // ========================================

    pub fn managed_dir(&self) -> &Path {
        &self.managed_dir
    }

    pub fn search_dir(&self) -> Option<&Path> {
        self.search_dir.as_deref()
    }

    pub fn catalog_url(&self) -> &str {
        &self.catalog_url
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Installed packages, sorted.
    pub fn installed(&self) -> &[PackageRecord] {
        self.registry.list()
    }

    pub fn find_installed(&self, identity: &PackageIdentity) -> Option<&PackageRecord> {
        self.registry.find(identity)
    }

    /// The last successfully fetched catalog, sorted.
    pub fn remote_catalog(&self) -> &[PackageRecord] {
        &self.catalog
    }

    /// Catalog packages that are not installed.
    pub fn new_packages(&self) -> &[PackageRecord] {
        &self.reconciler.availability().new_packages
    }

    /// Catalog records newer than their installed counterpart.
    pub fn outdated_packages(&self) -> &[PackageRecord] {
        &self.reconciler.availability().outdated_packages
    }

    /// Archives found in the managed directory by the last scan.
    pub fn pending_archives(&self) -> &[PathBuf] {
        &self.pending_archives
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch_state
    }

    pub fn is_fetching(&self) -> bool {
        self.fetch_state == FetchState::InFlight
    }

    fn reconcile(&mut self) {
        self.reconciler.recompute(&mut self.registry, &self.catalog);
    }

    fn fail<T>(&self, err: LangpackError) -> Result<T> {
        self.events.emit_error(&err);
        Err(err)
    }

    // ========================================
    // Scanning
    // ========================================

    /// Scan the managed directory, then the search directory.
    ///
    /// The managed directory must be readable; an unreadable search
    /// directory is only logged.
    pub fn startup_scan(&mut self) -> Result<ScanReport> {
        let managed_dir = self.managed_dir.clone();
        let mut report = match self.scan_directory_inner(&managed_dir) {
            Ok(report) => report,
            Err(err) => {
                return self.fail(LangpackError::Configuration {
                    message: format!(
                        "Cannot read managed directory {}: {}",
                        self.managed_dir.display(),
                        err
                    ),
                })
            }
        };

        if let Some(search_dir) = self.search_dir.clone() {
            if search_dir != self.managed_dir {
                match self.scan_directory_inner(&search_dir) {
                    Ok(secondary) => report.merge(secondary),
                    Err(err) => warn!(
                        "Skipping search directory {}: {}",
                        search_dir.display(),
                        err
                    ),
                }
            }
        }

        self.reconcile();
        info!(
            "Startup scan registered {} packages ({} installed)",
            report.registered,
            self.registry.len()
        );
        Ok(report)
    }

    /// Scan one directory into the registry.
    ///
    /// Archives are catalogued only when `dir` is the managed directory, in
    /// which case the pending list is replaced.
    pub fn scan_directory(&mut self, dir: &Path) -> Result<ScanReport> {
        match self.scan_directory_inner(dir) {
            Ok(report) => {
                self.reconcile();
                Ok(report)
            }
            Err(err) => self.fail(err),
        }
    }

    fn scan_directory_inner(&mut self, dir: &Path) -> Result<ScanReport> {
        let is_managed = dir == self.managed_dir;
        let report = self.scanner.scan(dir, &mut self.registry, is_managed)?;
        if is_managed {
            self.pending_archives = report.pending_archives.clone();
        }
        Ok(report)
    }

    // ========================================
    // Installation
    // ========================================

    /// Install the archive at `archive_path`.
    ///
    /// # Arguments
    ///
    /// * `archive_path` - The `.tar.gz` file to install
    /// * `name_override` - File name to derive the install directory from
    pub fn install_file(
        &mut self,
        archive_path: &Path,
        name_override: Option<&str>,
    ) -> Result<PackageRecord> {
        let outcome = self.installer.install_file(archive_path, name_override);
        self.finish_install(outcome)
    }

    /// Install an archive stream. `source_name` is the archive's file name.
    pub fn install_reader<R: Read>(&mut self, reader: R, source_name: &str) -> Result<PackageRecord> {
        let outcome = self.installer.install_reader(reader, source_name);
        self.finish_install(outcome)
    }

    /// Install one of the [`pending_archives`](Self::pending_archives) by
    /// file name. The archive itself is left in place.
    pub fn install_pending(&mut self, file_name: &str) -> Result<PackageRecord> {
        let found = self
            .pending_archives
            .iter()
            .find(|path| path.file_name().is_some_and(|n| n == file_name))
            .cloned();

        match found {
            Some(path) => self.install_file(&path, None),
            None => self.fail(LangpackError::install(format!(
                "No pending archive named {}",
                file_name
            ))),
        }
    }

    fn finish_install(&mut self, outcome: Result<PackageRecord>) -> Result<PackageRecord> {
        let record = match outcome {
            Ok(record) => record,
            Err(err) => return self.fail(err),
        };

        let identity = record.identity();
        if !self.registry.insert(record.clone()) {
            info!("Updated existing registration for {}", identity);
        }
        self.reconcile();

        let installed = self.registry.find(&identity).cloned().unwrap_or(record);
        self.events
            .emit(ManagerEvent::PackageInstalled(installed.clone()));
        Ok(installed)
    }

    // ========================================
    // Removal
    // ========================================

    fn is_managed(&self, path: &Path) -> bool {
        let root = self
            .managed_dir
            .canonicalize()
            .unwrap_or_else(|_| self.managed_dir.clone());
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        path != root && path.starts_with(&root)
    }

    /// Delete an installed package from disk and from the registry.
    ///
    /// The manifest is deleted first. If that fails nothing changes. If the
    /// directory cannot be fully deleted afterwards, an error event is
    /// emitted but the package is still unregistered, since without its
    /// manifest it is no longer a package.
    pub fn remove(&mut self, identity: &PackageIdentity) -> Result<RemovalState> {
        let Some(path) = self
            .registry
            .find(identity)
            .and_then(|record| record.install_path().map(Path::to_path_buf))
        else {
            return self.fail(LangpackError::Removal {
                path: self.managed_dir.clone(),
                message: format!("{} is not installed", identity),
            });
        };

        if !self.is_managed(&path) {
            return self.fail(LangpackError::Removal {
                path,
                message: format!(
                    "Package is outside the managed directory {}",
                    self.managed_dir.display()
                ),
            });
        }

        let manifest = manifest_path(&path);
        let mut state = match std::fs::remove_file(&manifest) {
            Ok(()) => RemovalState::ManifestDeleted,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Manifest {} already gone", manifest.display());
                RemovalState::ManifestDeleted
            }
            Err(e) => {
                return self.fail(LangpackError::Removal {
                    path: manifest,
                    message: format!("Failed to delete manifest: {}", e),
                })
            }
        };

        match std::fs::remove_dir_all(&path) {
            Ok(()) => state = RemovalState::FullyDeleted,
            Err(e) => self.events.emit_error(&LangpackError::Removal {
                path: path.clone(),
                message: format!("Failed to delete package directory: {}", e),
            }),
        }

        self.registry.remove_identity(identity);
        self.reconcile();
        info!("Removed {} from {} ({:?})", identity, path.display(), state);
        Ok(state)
    }

    // ========================================
    // Catalog
    // ========================================

    /// Start fetching the remote catalog.
    ///
    /// Returns `false` without doing anything if a fetch is already in
    /// flight. Must be called from within a Tokio runtime.
    pub fn refresh(&mut self) -> bool {
        if self.fetch_state == FetchState::InFlight {
            debug!("Catalog fetch already in flight");
            return false;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                self.events.emit_error(&LangpackError::Configuration {
                    message: format!("Catalog refresh needs a Tokio runtime: {}", e),
                });
                return false;
            }
        };

        self.fetch_state = FetchState::InFlight;
        self.events.emit(ManagerEvent::FetchStarted);

        let (tx, rx) = oneshot::channel();
        let source = Arc::clone(&self.source);
        let url = self.catalog_url.clone();
        handle.spawn(async move {
            let outcome = source.fetch(&url).await;
            // The manager may have been dropped.
            let _ = tx.send(outcome);
        });
        self.fetch_result = Some(rx);

        info!("Fetching catalog from {}", self.catalog_url);
        true
    }

    /// Wait for the in-flight fetch and apply it.
    ///
    /// Returns `Ok(false)` if nothing was in flight and `Ok(true)` once a new
    /// catalog is in place. A failed fetch leaves the previous catalog and
    /// returns the error.
    ///
    /// Cancel safe: if the returned future is dropped before the result
    /// arrives, the fetch stays pending and a later call picks it up.
    pub async fn wait_for_catalog(&mut self) -> Result<bool> {
        let Some(rx) = self.fetch_result.as_mut() else {
            return Ok(false);
        };
        let outcome = rx.await.unwrap_or_else(|_| Err(Self::fetch_task_lost()));
        self.fetch_result = None;
        self.complete_fetch(outcome).map(|()| true)
    }

    /// Apply the fetch result if it has arrived, without waiting.
    ///
    /// Returns `Ok(true)` if a new catalog was applied.
    pub fn poll_catalog(&mut self) -> Result<bool> {
        let Some(rx) = self.fetch_result.as_mut() else {
            return Ok(false);
        };

        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return Ok(false),
            Err(oneshot::error::TryRecvError::Closed) => Err(Self::fetch_task_lost()),
        };
        self.fetch_result = None;
        self.complete_fetch(outcome).map(|()| true)
    }

    fn fetch_task_lost() -> LangpackError {
        LangpackError::Network {
            message: "Catalog fetch task ended without a result".to_string(),
            source: None,
        }
    }

    fn complete_fetch(&mut self, outcome: FetchOutcome) -> Result<()> {
        self.fetch_state = FetchState::Idle;

        let applied = match outcome.and_then(|body| parse_catalog(&body, &self.catalog_url)) {
            Ok(parsed) => {
                for rejected in parsed.rejected {
                    self.events.emit_error(&LangpackError::from(rejected));
                }
                info!("Catalog lists {} packages", parsed.packages.len());
                self.catalog = parsed.packages;
                self.reconcile();
                Ok(())
            }
            Err(err) => {
                self.events.emit_error(&err);
                Err(err)
            }
        };

        self.events.emit(ManagerEvent::FetchFinished);
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::testing::{build_archive, manifest_json, write_package, ArchiveEntry};
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    struct StaticSource(&'static str);

    #[async_trait]
    impl CatalogSource for StaticSource {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl CatalogSource for FailingSource {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            Err(LangpackError::Network {
                message: format!("{} unreachable", url),
                source: None,
            })
        }
    }

    /// Holds the fetch until released.
    struct GatedSource {
        body: &'static str,
        release: Notify,
    }

    #[async_trait]
    impl CatalogSource for GatedSource {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            self.release.notified().await;
            Ok(self.body.as_bytes().to_vec())
        }
    }

    fn manager(dir: &Path, source: Arc<dyn CatalogSource>) -> PackageManager {
        PackageManager::builder(dir)
            .catalog_source(source)
            .build()
            .unwrap()
    }

    const CATALOG: &str = r#"{"models": [
        {"shortName": "ende", "modelName": "English-German", "src": "en", "trg": "de",
         "type": "tiny", "version": 2.0, "API": 1.0, "url": "http://x/ende.tar.gz"},
        {"shortName": "enet", "modelName": "English-Estonian", "src": "en", "trg": "et",
         "type": "tiny", "version": 1.0, "API": 1.0, "url": "http://x/enet.tar.gz"}
    ]}"#;

    #[test]
    fn test_startup_scan_and_pending_archives() {
        let managed = TempDir::new().unwrap();
        let search = TempDir::new().unwrap();
        write_package(&managed.path().join("ende-1"), "ende", "en", "de", 1.0);
        write_package(&search.path().join("enfr"), "enfr", "en", "fr", 1.0);
        std::fs::write(managed.path().join("encs.tar.gz"), b"x").unwrap();
        std::fs::write(search.path().join("ignored.tar.gz"), b"x").unwrap();

        let mut manager = PackageManager::builder(managed.path())
            .search_dir(search.path())
            .catalog_source(Arc::new(StaticSource(CATALOG)))
            .build()
            .unwrap();
        let report = manager.startup_scan().unwrap();

        assert_eq!(report.registered, 2);
        assert_eq!(manager.installed().len(), 2);
        assert_eq!(
            manager.pending_archives(),
            &[managed.path().join("encs.tar.gz")]
        );
    }

    #[test]
    fn test_startup_scan_unreadable_search_dir_is_not_fatal() {
        let managed = TempDir::new().unwrap();
        let mut manager = PackageManager::builder(managed.path())
            .search_dir(managed.path().join("missing"))
            .catalog_source(Arc::new(StaticSource(CATALOG)))
            .build()
            .unwrap();
        assert!(manager.startup_scan().is_ok());
    }

    #[test]
    fn test_startup_scan_missing_managed_dir_is_configuration() {
        let managed = TempDir::new().unwrap();
        let dir = managed.path().join("models");
        let mut manager = PackageManager::builder(&dir)
            .auto_create_dir(true)
            .catalog_source(Arc::new(StaticSource(CATALOG)))
            .build()
            .unwrap();
        let mut rx = manager.subscribe();
        std::fs::remove_dir_all(&dir).unwrap();

        let err = manager.startup_scan().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.to_string().contains("Cannot read managed directory"));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ManagerEvent::Error {
                category: ErrorCategory::Configuration,
                ..
            }
        ));
    }

    #[test]
    fn test_large_scan_delivers_every_event() {
        let managed = TempDir::new().unwrap();
        let count = 300;
        for i in 0..count {
            let short = format!("p{:03}", i);
            write_package(&managed.path().join(&short), &short, "en", "de", 1.0);
        }
        let mut manager = manager(managed.path(), Arc::new(StaticSource(CATALOG)));
        let mut rx = manager.subscribe();

        let report = manager.startup_scan().unwrap();
        assert_eq!(report.registered, count);

        let inserted = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|e| matches!(e, ManagerEvent::PackageInserted { .. }))
            .count();
        assert_eq!(inserted, count);
    }

    #[tokio::test]
    async fn test_refresh_reconciles() {
        let managed = TempDir::new().unwrap();
        write_package(&managed.path().join("ende-1"), "ende", "en", "de", 1.0);
        let mut manager = manager(managed.path(), Arc::new(StaticSource(CATALOG)));
        manager.startup_scan().unwrap();

        assert!(manager.refresh());
        assert!(manager.is_fetching());
        assert!(manager.wait_for_catalog().await.unwrap());
        assert!(!manager.is_fetching());

        assert_eq!(manager.remote_catalog().len(), 2);
        assert_eq!(manager.new_packages().len(), 1);
        assert_eq!(manager.new_packages()[0].short_name, "enet");
        assert_eq!(manager.outdated_packages().len(), 1);
        assert_eq!(manager.installed()[0].remote_version, Some(2.0));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_catalog() {
        let managed = TempDir::new().unwrap();
        let mut manager = manager(managed.path(), Arc::new(StaticSource(CATALOG)));
        manager.refresh();
        manager.wait_for_catalog().await.unwrap();
        assert_eq!(manager.remote_catalog().len(), 2);

        manager.source = Arc::new(FailingSource);
        let mut rx = manager.subscribe();
        assert!(manager.refresh());
        let err = manager.wait_for_catalog().await.unwrap_err();
        assert!(matches!(err, LangpackError::Network { .. }));
        assert_eq!(manager.remote_catalog().len(), 2);

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(events.first(), Some(&ManagerEvent::FetchStarted));
        assert_eq!(events.last(), Some(&ManagerEvent::FetchFinished));
        assert!(events
            .iter()
            .any(|e| matches!(e, ManagerEvent::Error { .. })));
    }

    #[tokio::test]
    async fn test_unparseable_catalog_keeps_previous() {
        let managed = TempDir::new().unwrap();
        let mut manager = manager(managed.path(), Arc::new(StaticSource(CATALOG)));
        manager.refresh();
        manager.wait_for_catalog().await.unwrap();

        manager.source = Arc::new(StaticSource("<html>oops</html>"));
        manager.refresh();
        let err = manager.wait_for_catalog().await.unwrap_err();
        assert!(matches!(err, LangpackError::CatalogParse { .. }));
        assert_eq!(manager.remote_catalog().len(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_wait_keeps_fetch_pending() {
        let managed = TempDir::new().unwrap();
        let source = Arc::new(GatedSource {
            body: CATALOG,
            release: Notify::new(),
        });
        let mut manager = manager(managed.path(), source.clone());

        assert!(manager.refresh());
        let waited = tokio::time::timeout(Duration::from_millis(10), manager.wait_for_catalog()).await;
        assert!(waited.is_err());
        assert!(manager.is_fetching());
        assert!(!manager.refresh());

        source.release.notify_one();
        assert!(manager.wait_for_catalog().await.unwrap());
        assert!(!manager.is_fetching());
        assert_eq!(manager.remote_catalog().len(), 2);

        source.release.notify_one();
        assert!(manager.refresh());
        assert!(manager.wait_for_catalog().await.unwrap());
    }

    #[tokio::test]
    async fn test_entry_dropped_from_catalog_is_no_longer_outdated() {
        let managed = TempDir::new().unwrap();
        write_package(&managed.path().join("ende-1"), "ende", "en", "de", 1.0);
        let mut manager = manager(managed.path(), Arc::new(StaticSource(CATALOG)));
        manager.startup_scan().unwrap();

        manager.refresh();
        manager.wait_for_catalog().await.unwrap();
        assert!(manager.installed()[0].is_outdated());

        manager.source = Arc::new(StaticSource(r#"{"models": []}"#));
        manager.refresh();
        manager.wait_for_catalog().await.unwrap();

        assert!(manager.remote_catalog().is_empty());
        assert!(manager.outdated_packages().is_empty());
        assert_eq!(manager.installed()[0].remote_version, None);
        assert!(!manager.installed()[0].is_outdated());
    }

    #[tokio::test]
    async fn test_poll_catalog() {
        let managed = TempDir::new().unwrap();
        let mut manager = manager(managed.path(), Arc::new(StaticSource(CATALOG)));
        assert!(!manager.poll_catalog().unwrap());

        manager.refresh();
        let mut applied = false;
        for _ in 0..100 {
            if manager.poll_catalog().unwrap() {
                applied = true;
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(applied);
        assert_eq!(manager.remote_catalog().len(), 2);
        assert_eq!(manager.fetch_state(), FetchState::Idle);
    }

    #[test]
    fn test_refresh_without_runtime() {
        let managed = TempDir::new().unwrap();
        let mut manager = manager(managed.path(), Arc::new(StaticSource(CATALOG)));
        assert!(!manager.refresh());
        assert!(!manager.is_fetching());
    }

    #[test]
    fn test_install_and_remove() {
        let managed = TempDir::new().unwrap();
        let mut manager = manager(managed.path(), Arc::new(StaticSource(CATALOG)));
        let mut rx = manager.subscribe();

        let manifest = manifest_json("ende", "en", "de", 1.0);
        let archive = build_archive(&[
            ArchiveEntry::file("ende/model_info.json", manifest.as_bytes()),
            ArchiveEntry::file("ende/model.bin", b"weights"),
        ]);
        let record = manager.install_reader(&archive[..], "en-de.tar.gz").unwrap();
        let install_path = record.install_path().unwrap().to_path_buf();
        assert_eq!(manager.installed().len(), 1);

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(events.contains(&ManagerEvent::PackageInserted { index: 0 }));
        assert!(matches!(
            events.last(),
            Some(ManagerEvent::PackageInstalled(r)) if r.short_name == "ende"
        ));

        let state = manager.remove(&record.identity()).unwrap();
        assert_eq!(state, RemovalState::FullyDeleted);
        assert!(!install_path.exists());
        assert!(manager.installed().is_empty());
    }

    #[test]
    fn test_install_pending_by_name() {
        let managed = TempDir::new().unwrap();
        let manifest = manifest_json("enet", "en", "et", 1.0);
        let archive = build_archive(&[ArchiveEntry::file(
            "enet/model_info.json",
            manifest.as_bytes(),
        )]);
        std::fs::write(managed.path().join("en-et.tar.gz"), &archive).unwrap();

        let mut manager = manager(managed.path(), Arc::new(StaticSource(CATALOG)));
        manager.startup_scan().unwrap();
        assert_eq!(manager.pending_archives().len(), 1);

        let record = manager.install_pending("en-et.tar.gz").unwrap();
        assert_eq!(record.short_name, "enet");

        let err = manager.install_pending("nope.tar.gz").unwrap_err();
        assert!(matches!(err, LangpackError::Install { .. }));
    }

    #[test]
    fn test_remove_outside_managed_dir_refused() {
        let managed = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        write_package(&outside.path().join("enfr"), "enfr", "en", "fr", 1.0);

        let mut manager = PackageManager::builder(managed.path())
            .search_dir(outside.path())
            .catalog_source(Arc::new(StaticSource(CATALOG)))
            .build()
            .unwrap();
        manager.startup_scan().unwrap();
        assert_eq!(manager.installed().len(), 1);

        let identity = PackageIdentity::new("enfr", "en", "fr");
        let err = manager.remove(&identity).unwrap_err();
        assert!(matches!(err, LangpackError::Removal { .. }));
        assert_eq!(manager.installed().len(), 1);
        assert!(outside.path().join("enfr/model_info.json").exists());
    }

    #[test]
    fn test_remove_unknown_package() {
        let managed = TempDir::new().unwrap();
        let mut manager = manager(managed.path(), Arc::new(StaticSource(CATALOG)));
        let err = manager
            .remove(&PackageIdentity::new("ende", "en", "de"))
            .unwrap_err();
        assert!(err.to_string().contains("not installed"));
    }

    #[cfg(unix)]
    #[test]
    fn test_undeletable_directory_is_still_unregistered() {
        use std::os::unix::fs::PermissionsExt;

        let managed = TempDir::new().unwrap();
        let package = managed.path().join("ende-1");
        write_package(&package, "ende", "en", "de", 1.0);
        let locked = package.join("locked");
        std::fs::create_dir_all(&locked).unwrap();
        std::fs::write(locked.join("weights.bin"), b"x").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

        let mut manager = manager(managed.path(), Arc::new(StaticSource(CATALOG)));
        manager.startup_scan().unwrap();

        let state = manager
            .remove(&PackageIdentity::new("ende", "en", "de"))
            .unwrap();
        if locked.exists() {
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        // Running as root ignores directory permissions.
        if package.exists() {
            assert_eq!(state, RemovalState::ManifestDeleted);
        } else {
            assert_eq!(state, RemovalState::FullyDeleted);
        }
        assert!(manager.installed().is_empty());
        assert!(!package.join("model_info.json").exists());
    }
}
