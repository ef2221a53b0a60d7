//! Langpack Core - Headless library for managing translation model packages.
//!
//! Keeps a registry of installed machine-translation model packages, installs
//! new ones from `.tar.gz` archives, fetches the remote catalog and works out
//! which catalog packages are new and which installed ones are outdated.
//!
//! # Example
//!
//! ```rust,ignore
//! use langpack_core::PackageManager;
//!
//! #[tokio::main]
//! async fn main() -> langpack_core::Result<()> {
//!     let mut manager = PackageManager::builder("/path/to/models")
//!         .auto_create_dir(true)
//!         .build()?;
//!     manager.startup_scan()?;
//!
//!     manager.refresh();
//!     manager.wait_for_catalog().await?;
//!     for package in manager.outdated_packages() {
//!         println!("{} can be updated", package.identity());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod installer;
pub mod package;
pub mod reconcile;
pub mod registry;
pub mod scanner;

mod manager;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use catalog::{CatalogSource, FetchState, HttpCatalogSource};
pub use error::{ErrorCategory, LangpackError, ManifestError, Result};
pub use events::{EventReceiver, EventSender, ManagerEvent};
pub use manager::{PackageManager, PackageManagerBuilder, RemovalState};
pub use package::{PackageIdentity, PackageInfo, PackageLocation, PackageRecord};
pub use reconcile::Availability;
pub use scanner::ScanReport;
