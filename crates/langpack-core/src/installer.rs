//! Archive installation.
//!
//! An archive is extracted into a scratch directory inside the managed
//! directory, its package root is located and validated, and the root is
//! then renamed into place. Anything that fails before the rename leaves the
//! managed directory as it was; the scratch directory is removed when it
//! goes out of scope.

use crate::archive::{archive_stem, extract_tar_gz};
use crate::config::PathsConfig;
use crate::error::{LangpackError, Result};
use crate::package::{load_package, manifest::manifest_path, PackageRecord};
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Installs package archives into a managed directory.
#[derive(Debug, Clone)]
pub struct Installer {
    managed_dir: PathBuf,
}

impl Installer {
    pub fn new(managed_dir: impl Into<PathBuf>) -> Self {
        Self {
            managed_dir: managed_dir.into(),
        }
    }

    pub fn managed_dir(&self) -> &Path {
        &self.managed_dir
    }

    /// Install the archive at `archive_path`.
    ///
    /// `name_override` replaces the archive's file name when deriving the
    /// destination directory name.
    pub fn install_file(
        &self,
        archive_path: &Path,
        name_override: Option<&str>,
    ) -> Result<PackageRecord> {
        let file = File::open(archive_path).map_err(|e| LangpackError::Extraction {
            archive: archive_path.display().to_string(),
            message: format!("Failed to open archive: {}", e),
            source: Some(e),
        })?;

        let source_name = match name_override {
            Some(name) => name.to_string(),
            None => archive_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        self.install_reader(file, &source_name)
    }

    /// Install a `.tar.gz` stream.
    ///
    /// Returns the record read back from the final location. The caller is
    /// responsible for registering it.
    ///
    /// # Arguments
    ///
    /// * `reader` - The compressed archive stream
    /// * `source_name` - Archive file name the destination name derives from
    pub fn install_reader<R: Read>(&self, reader: R, source_name: &str) -> Result<PackageRecord> {
        let scratch = tempfile::Builder::new()
            .prefix(PathsConfig::SCRATCH_PREFIX)
            .tempdir_in(&self.managed_dir)
            .map_err(|e| LangpackError::io_with_path(e, &self.managed_dir))?;
        debug!("Extracting {} into {}", source_name, scratch.path().display());

        let extracted = extract_tar_gz(reader, scratch.path(), source_name)?;
        if extracted.is_empty() {
            return Err(LangpackError::install(
                "Did not extract any files from the model archive.",
            ));
        }

        let absolute: Vec<PathBuf> = extracted
            .iter()
            .map(|relative| scratch.path().join(relative))
            .collect();
        let package_root = common_path_prefix(&absolute)
            .filter(|root| root.starts_with(scratch.path()))
            .ok_or_else(|| {
                LangpackError::install(format!(
                    "Could not find a common directory in archive {}",
                    source_name
                ))
            })?;

        if load_package(&package_root)?.is_none() {
            return Err(LangpackError::install(format!(
                "Archive {} does not contain {}",
                source_name,
                PathsConfig::MANIFEST_FILENAME
            )));
        }

        let destination = self.destination_for(source_name);
        std::fs::rename(&package_root, &destination).map_err(|e| {
            LangpackError::install(format!(
                "Failed to move {} to {}: {}",
                package_root.display(),
                destination.display(),
                e
            ))
        })?;
        drop(scratch);

        let record = load_package(&destination)?.ok_or_else(|| {
            LangpackError::install(format!(
                "{} disappeared after moving the package",
                manifest_path(&destination).display()
            ))
        })?;

        info!(
            "Installed {} from {} into {}",
            record.identity(),
            source_name,
            destination.display()
        );
        Ok(record)
    }

    /// A directory name under the managed directory that does not exist yet.
    fn destination_for(&self, source_name: &str) -> PathBuf {
        let stem = archive_stem(source_name).trim();
        let stem = if stem.is_empty() { "package" } else { stem };
        let base = format!("{}-{}", stem, chrono::Utc::now().timestamp());

        let mut candidate = self.managed_dir.join(&base);
        let mut counter = 1;
        while candidate.exists() {
            candidate = self.managed_dir.join(format!("{}-{}", base, counter));
            counter += 1;
        }
        candidate
    }
}

/// Longest common leading path of `paths`, compared component by component.
///
/// When every path is the same (including a single path), the result is its
/// parent. Returns `None` for an empty list or an empty prefix.
pub fn common_path_prefix(paths: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = paths.split_first()?;

    if rest.iter().all(|p| p == first) {
        return first.parent().map(Path::to_path_buf);
    }

    let mut prefix: Vec<Component<'_>> = first.components().collect();
    for path in rest {
        let shared = prefix
            .iter()
            .zip(path.components())
            .take_while(|(a, b)| **a == *b)
            .count();
        prefix.truncate(shared);
    }

    if prefix.is_empty() {
        return None;
    }
    Some(prefix.iter().collect())
}
