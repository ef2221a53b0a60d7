//! Builder for configuring a [`PackageManager`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::{CatalogSource, HttpCatalogSource};
use crate::config::NetworkConfig;
use crate::error::{LangpackError, Result};
use crate::manager::PackageManager;
use tracing::info;

/// Builder for configuring a [`PackageManager`].
///
/// # Example
///
/// ```rust,ignore
/// use langpack_core::PackageManager;
///
/// let mut manager = PackageManager::builder("/home/me/.local/share/langpack")
///     .auto_create_dir(true)
///     .search_dir(std::env::current_dir()?)
///     .build()?;
/// manager.startup_scan()?;
/// ```
pub struct PackageManagerBuilder {
    managed_dir: PathBuf,
    auto_create_dir: bool,
    search_dir: Option<PathBuf>,
    catalog_url: String,
    catalog_source: Option<Arc<dyn CatalogSource>>,
}

impl PackageManagerBuilder {
    /// Create a new builder for the given managed directory.
    pub fn new(managed_dir: impl Into<PathBuf>) -> Self {
        Self {
            managed_dir: managed_dir.into(),
            auto_create_dir: false,
            search_dir: None,
            catalog_url: NetworkConfig::CATALOG_URL.to_string(),
            catalog_source: None,
        }
    }

    /// Create the managed directory if it does not exist.
    ///
    /// Default: `false` (the directory must exist)
    pub fn auto_create_dir(mut self, enable: bool) -> Self {
        self.auto_create_dir = enable;
        self
    }

    /// A second directory scanned for packages at startup.
    ///
    /// Packages found there are registered in place; archives found there
    /// are not catalogued.
    pub fn search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    /// Override the catalog endpoint.
    ///
    /// Default: [`NetworkConfig::CATALOG_URL`]
    pub fn catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = url.into();
        self
    }

    /// Use a custom catalog transport instead of HTTP.
    pub fn catalog_source(mut self, source: Arc<dyn CatalogSource>) -> Self {
        self.catalog_source = Some(source);
        self
    }

    fn prepare_managed_dir(&self) -> Result<()> {
        let dir = &self.managed_dir;
        if !dir.is_absolute() {
            return Err(LangpackError::Configuration {
                message: format!("Managed directory must be absolute: {}", dir.display()),
            });
        }

        if dir.exists() {
            if !dir.is_dir() {
                return Err(LangpackError::Configuration {
                    message: format!("Managed directory is not a directory: {}", dir.display()),
                });
            }
            return Ok(());
        }

        if !self.auto_create_dir {
            return Err(LangpackError::Configuration {
                message: format!("Managed directory does not exist: {}", dir.display()),
            });
        }

        std::fs::create_dir_all(dir).map_err(|e| LangpackError::Configuration {
            message: format!("Failed to create managed directory {}: {}", dir.display(), e),
        })?;
        info!("Created managed directory {}", dir.display());
        Ok(())
    }

    /// Build the [`PackageManager`].
    ///
    /// Does not scan; call [`PackageManager::startup_scan`] afterwards.
    pub fn build(self) -> Result<PackageManager> {
        self.prepare_managed_dir()?;

        url::Url::parse(&self.catalog_url).map_err(|e| LangpackError::Configuration {
            message: format!("Invalid catalog URL {}: {}", self.catalog_url, e),
        })?;

        let source: Arc<dyn CatalogSource> = match self.catalog_source {
            Some(source) => source,
            None => Arc::new(HttpCatalogSource::new()?),
        };

        Ok(PackageManager::new(
            self.managed_dir,
            self.search_dir,
            self.catalog_url,
            source,
        ))
    }
}
