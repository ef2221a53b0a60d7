//! Directory scanning.
//!
//! Looks at the immediate children of a directory: subdirectories with a
//! manifest become registry entries, stray archives are catalogued so they
//! can be installed on request.

use crate::archive::is_archive_name;
use crate::config::PathsConfig;
use crate::error::{LangpackError, Result};
use crate::events::EventSender;
use crate::package::load_package;
use crate::registry::PackageRegistry;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of scanning one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Packages inserted into or updated in the registry.
    pub registered: usize,
    /// Subdirectories without a manifest.
    pub skipped: usize,
    /// Subdirectories whose manifest could not be used.
    pub failed: usize,
    /// Archive files found, in name order.
    pub pending_archives: Vec<PathBuf>,
}

impl ScanReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: ScanReport) {
        self.registered += other.registered;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.pending_archives.extend(other.pending_archives);
    }
}

/// Scans directories into a registry.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    events: EventSender,
}

impl DirectoryScanner {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }

    /// Scan the immediate children of `dir`.
    ///
    /// Corrupt manifests are reported as error events and counted as
    /// failures; the scan continues. Archives are only catalogued when
    /// `catalogue_archives` is set.
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory to scan
    /// * `registry` - Registry that receives valid packages
    /// * `catalogue_archives` - Whether to collect `.tar.gz` files
    pub fn scan(
        &self,
        dir: &Path,
        registry: &mut PackageRegistry,
        catalogue_archives: bool,
    ) -> Result<ScanReport> {
        let mut children: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| LangpackError::io_with_path(e, dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        children.sort();

        let mut report = ScanReport::default();
        for child in children {
            let Some(name) = child.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };

            if child.is_dir() {
                if name.starts_with(PathsConfig::SCRATCH_PREFIX) {
                    debug!("Ignoring scratch directory {}", child.display());
                    continue;
                }
                match load_package(&child) {
                    Ok(Some(record)) => {
                        registry.insert(record);
                        report.registered += 1;
                    }
                    Ok(None) => {
                        debug!("No manifest in {}, skipping", child.display());
                        report.skipped += 1;
                    }
                    Err(err) => {
                        self.events.emit_error(&err);
                        report.failed += 1;
                    }
                }
            } else if catalogue_archives && is_archive_name(&name) {
                debug!("Found pending archive {}", child.display());
                report.pending_archives.push(child);
            }
        }

        info!(
            "Scanned {}: {} registered, {} skipped, {} failed, {} pending archives",
            dir.display(),
            report.registered,
            report.skipped,
            report.failed,
            report.pending_archives.len()
        );
        Ok(report)
    }
}
