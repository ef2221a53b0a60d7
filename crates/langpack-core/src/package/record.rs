//! In-memory representation of a translation model package.

use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Where a package lives: installed on disk, or downloadable.
///
/// A record is exactly one of the two; empty paths and URLs are rejected by
/// the constructors on [`PackageRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageLocation {
    Local(PathBuf),
    Remote(String),
}

/// The fields that decide whether two records denote the same package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageIdentity {
    pub short_name: String,
    pub source_language: String,
    pub target_language: String,
}

impl PackageIdentity {
    pub fn new(
        short_name: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            short_name: short_name.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }
}

impl std::fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}-{})",
            self.short_name, self.source_language, self.target_language
        )
    }
}

/// Descriptive fields shared by local and remote records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageInfo {
    pub short_name: String,
    pub display_name: String,
    pub source_language: String,
    pub target_language: String,
    pub package_type: String,
    pub version: f64,
    pub api_version: f64,
}

/// One translation model package, local or remote.
#[derive(Debug, Clone, Serialize)]
pub struct PackageRecord {
    pub short_name: String,
    pub display_name: String,
    pub source_language: String,
    pub target_language: String,
    pub package_type: String,
    pub local_version: Option<f64>,
    pub local_api_version: Option<f64>,
    pub remote_version: Option<f64>,
    pub remote_api_version: Option<f64>,
    location: PackageLocation,
}

impl PackageRecord {
    /// Build an installed record. Returns `None` if `path` is empty.
    pub fn local(info: PackageInfo, path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return None;
        }
        Some(Self {
            short_name: info.short_name,
            display_name: info.display_name,
            source_language: info.source_language,
            target_language: info.target_language,
            package_type: info.package_type,
            local_version: Some(info.version),
            local_api_version: Some(info.api_version),
            remote_version: None,
            remote_api_version: None,
            location: PackageLocation::Local(path),
        })
    }

    /// Build a downloadable record. Returns `None` if `url` is empty.
    pub fn remote(info: PackageInfo, url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return None;
        }
        Some(Self {
            short_name: info.short_name,
            display_name: info.display_name,
            source_language: info.source_language,
            target_language: info.target_language,
            package_type: info.package_type,
            local_version: None,
            local_api_version: None,
            remote_version: Some(info.version),
            remote_api_version: Some(info.api_version),
            location: PackageLocation::Remote(url),
        })
    }

    pub fn location(&self) -> &PackageLocation {
        &self.location
    }

    pub fn is_local(&self) -> bool {
        matches!(self.location, PackageLocation::Local(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.location, PackageLocation::Remote(_))
    }

    /// Install directory, for local records.
    pub fn install_path(&self) -> Option<&Path> {
        match &self.location {
            PackageLocation::Local(path) => Some(path),
            PackageLocation::Remote(_) => None,
        }
    }

    /// Download URL, for remote records.
    pub fn download_url(&self) -> Option<&str> {
        match &self.location {
            PackageLocation::Remote(url) => Some(url),
            PackageLocation::Local(_) => None,
        }
    }

    pub fn identity(&self) -> PackageIdentity {
        PackageIdentity::new(
            self.short_name.clone(),
            self.source_language.clone(),
            self.target_language.clone(),
        )
    }

    /// A local package is outdated when the catalog knows a newer version.
    pub fn is_outdated(&self) -> bool {
        match (self.local_version, self.remote_version) {
            (Some(local), Some(remote)) => remote > local,
            _ => false,
        }
    }

    /// Copy the catalog's version information onto this record.
    pub fn set_remote_versions(&mut self, version: Option<f64>, api_version: Option<f64>) {
        self.remote_version = version;
        self.remote_api_version = api_version;
    }
}

fn cmp_version(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

fn cmp_location(a: &PackageLocation, b: &PackageLocation) -> Ordering {
    match (a, b) {
        (PackageLocation::Local(a), PackageLocation::Local(b)) => a.cmp(b),
        (PackageLocation::Remote(a), PackageLocation::Remote(b)) => a.cmp(b),
        (PackageLocation::Local(_), PackageLocation::Remote(_)) => Ordering::Less,
        (PackageLocation::Remote(_), PackageLocation::Local(_)) => Ordering::Greater,
    }
}

impl Ord for PackageRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.source_language
            .cmp(&other.source_language)
            .then_with(|| self.target_language.cmp(&other.target_language))
            .then_with(|| self.short_name.cmp(&other.short_name))
            .then_with(|| self.display_name.cmp(&other.display_name))
            .then_with(|| self.package_type.cmp(&other.package_type))
            .then_with(|| cmp_version(self.local_version, other.local_version))
            .then_with(|| cmp_version(self.remote_version, other.remote_version))
            .then_with(|| cmp_version(self.local_api_version, other.local_api_version))
            .then_with(|| cmp_version(self.remote_api_version, other.remote_api_version))
            .then_with(|| cmp_location(&self.location, &other.location))
    }
}

impl PartialOrd for PackageRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality follows the total order, so sorting and comparison agree. Compare
// `identity()` to match packages across versions and locations.
impl PartialEq for PackageRecord {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageRecord {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::info;

    #[test]
    fn test_location_is_exclusive() {
        let local = PackageRecord::local(info("ende", "en", "de", 1.0), "/models/ende").unwrap();
        assert!(local.is_local());
        assert!(!local.is_remote());
        assert_eq!(local.install_path(), Some(Path::new("/models/ende")));
        assert_eq!(local.download_url(), None);

        let remote =
            PackageRecord::remote(info("ende", "en", "de", 1.0), "http://x/ende.tar.gz").unwrap();
        assert!(remote.is_remote());
        assert_eq!(remote.install_path(), None);
        assert_eq!(remote.local_version, None);
        assert_eq!(remote.remote_version, Some(1.0));
    }

    #[test]
    fn test_empty_location_rejected() {
        assert!(PackageRecord::local(info("ende", "en", "de", 1.0), "").is_none());
        assert!(PackageRecord::remote(info("ende", "en", "de", 1.0), "  ").is_none());
    }

    #[test]
    fn test_identity_ignores_version_and_location() {
        let local = PackageRecord::local(info("ende", "en", "de", 1.0), "/models/ende").unwrap();
        let remote =
            PackageRecord::remote(info("ende", "en", "de", 2.0), "http://x/ende.tar.gz").unwrap();
        let other =
            PackageRecord::remote(info("ende", "en", "fr", 2.0), "http://x/enfr.tar.gz").unwrap();

        assert_eq!(local.identity(), remote.identity());
        assert_ne!(local.identity(), other.identity());
        assert_ne!(local, remote);
        assert_eq!(local.identity(), PackageIdentity::new("ende", "en", "de"));
    }

    #[test]
    fn test_outdated() {
        let mut local = PackageRecord::local(info("ende", "en", "de", 1.2), "/m/ende").unwrap();
        assert!(!local.is_outdated());

        local.set_remote_versions(Some(1.3), Some(1.0));
        assert!(local.is_outdated());

        local.set_remote_versions(Some(1.2), Some(1.0));
        assert!(!local.is_outdated());

        local.set_remote_versions(Some(1.1), Some(1.0));
        assert!(!local.is_outdated());
    }

    #[test]
    fn test_order_is_language_pair_first() {
        let mut records = vec![
            PackageRecord::local(info("zz", "en", "de", 1.0), "/m/a").unwrap(),
            PackageRecord::local(info("aa", "es", "en", 1.0), "/m/b").unwrap(),
            PackageRecord::local(info("aa", "en", "et", 1.0), "/m/c").unwrap(),
            PackageRecord::local(info("aa", "en", "de", 1.0), "/m/d").unwrap(),
        ];
        records.sort();

        let keys: Vec<_> = records
            .iter()
            .map(|r| format!("{}-{}-{}", r.source_language, r.target_language, r.short_name))
            .collect();
        assert_eq!(keys, vec!["en-de-aa", "en-de-zz", "en-et-aa", "es-en-aa"]);
    }

    #[test]
    fn test_order_tie_break_is_deterministic() {
        let a = PackageRecord::local(info("ende", "en", "de", 1.0), "/m/a").unwrap();
        let b = PackageRecord::local(info("ende", "en", "de", 1.0), "/m/b").unwrap();
        let c = PackageRecord::remote(info("ende", "en", "de", 1.0), "http://x").unwrap();

        assert!(a < b);
        // Absent local version sorts first.
        assert!(c < a);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
