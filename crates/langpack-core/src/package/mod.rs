//! Package records and manifests.
//!
//! - [`PackageRecord`] - one package, local or remote, with identity and order
//! - [`manifest`] - reading and validating `model_info.json`

pub mod manifest;
mod record;

pub use manifest::{load_package, read_manifest, ManifestContext, ManifestDocument};
pub use record::{PackageIdentity, PackageInfo, PackageLocation, PackageRecord};
