//! Error types for the package manager.
//!
//! Every failure the core can report is a variant of [`LangpackError`]. Each
//! variant maps to an [`ErrorCategory`], which is what error notifications
//! carry alongside the human-readable message.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Problems with a package manifest file.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to open manifest {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupted manifest {path}: {message}. Delete or redownload the package.")]
    Corrupt { path: PathBuf, message: String },

    #[error(
        "The manifest {origin} is missing '{field}' or is corrupted. Please redownload the package."
    )]
    MissingCriticalField {
        field: &'static str,
        /// Where the entry came from (a manifest path or a catalog URL).
        origin: String,
    },
}

/// Main error type for the package manager.
#[derive(Debug, Error)]
pub enum LangpackError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Extraction failed for {archive}: {message}")]
    Extraction {
        archive: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Install failed: {message}")]
    Install { message: String },

    #[error("Removal failed for {path}: {message}")]
    Removal { path: PathBuf, message: String },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Could not parse remote catalog: {message}")]
    CatalogParse { message: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },
}

/// Result type alias for package manager operations.
pub type Result<T> = std::result::Result<T, LangpackError>;

/// Coarse cause category attached to error notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Manifest,
    Extraction,
    Install,
    Removal,
    Network,
    CatalogParse,
    Filesystem,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Manifest => "manifest",
            ErrorCategory::Extraction => "extraction",
            ErrorCategory::Install => "install",
            ErrorCategory::Removal => "removal",
            ErrorCategory::Network => "network",
            ErrorCategory::CatalogParse => "catalog_parse",
            ErrorCategory::Filesystem => "filesystem",
        };
        f.write_str(name)
    }
}

// Conversion implementations for common error types

impl From<std::io::Error> for LangpackError {
    fn from(err: std::io::Error) -> Self {
        LangpackError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for LangpackError {
    fn from(err: reqwest::Error) -> Self {
        LangpackError::Network {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl LangpackError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        LangpackError::Io {
            message: format!("{}: {}", path.display(), err),
            path: Some(path),
            source: Some(err),
        }
    }

    /// Shorthand for an [`LangpackError::Install`] with a message.
    pub fn install(message: impl Into<String>) -> Self {
        LangpackError::Install {
            message: message.into(),
        }
    }

    /// The cause category reported with error notifications.
    pub fn category(&self) -> ErrorCategory {
        match self {
            LangpackError::Configuration { .. } => ErrorCategory::Configuration,
            LangpackError::Manifest(_) => ErrorCategory::Manifest,
            LangpackError::Extraction { .. } => ErrorCategory::Extraction,
            LangpackError::Install { .. } => ErrorCategory::Install,
            LangpackError::Removal { .. } => ErrorCategory::Removal,
            LangpackError::Network { .. } => ErrorCategory::Network,
            LangpackError::CatalogParse { .. } => ErrorCategory::CatalogParse,
            LangpackError::Io { .. } => ErrorCategory::Filesystem,
        }
    }
}
