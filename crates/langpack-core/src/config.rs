//! Centralized configuration for the package manager.
//!
//! This module provides the fixed names, suffixes, endpoints and timeouts the
//! rest of the crate relies on. Per-instance settings live on
//! [`PackageManagerBuilder`](crate::PackageManagerBuilder).

use std::time::Duration;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "langpack";
    /// Environment variable the CLI reads the managed directory from.
    pub const MANAGED_DIR_ENV: &'static str = "LANGPACK_DIR";
}

/// File and directory names inside the managed directory.
pub struct PathsConfig;

impl PathsConfig {
    /// Manifest file expected at the root of every package directory.
    pub const MANIFEST_FILENAME: &'static str = "model_info.json";
    /// Suffix recognised as a package archive.
    pub const ARCHIVE_SUFFIX: &'static str = ".tar.gz";
    /// Prefix of scratch directories used while installing.
    pub const SCRATCH_PREFIX: &'static str = ".extracting-";
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const CATALOG_URL: &'static str = "http://data.statmt.org/bergamot/models/models.json";
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const USER_AGENT: &'static str = "langpack/0.1";
}
