//! Remote catalog of available packages.
//!
//! The catalog is a JSON document of the form `{ "models": [ ... ] }` where
//! each entry is a manifest carrying a download `url`. Fetching is
//! single-flight; see [`FetchState`].

mod source;

pub use source::{CatalogSource, HttpCatalogSource};

use crate::error::{LangpackError, ManifestError, Result};
use crate::package::{ManifestContext, ManifestDocument, PackageRecord};
use serde_json::Value;
use tracing::debug;

/// Whether a catalog request is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Idle,
    InFlight,
}

/// A parsed catalog document.
#[derive(Debug, Default)]
pub struct ParsedCatalog {
    /// Valid entries, sorted.
    pub packages: Vec<PackageRecord>,
    /// Entries that were dropped, one error each.
    pub rejected: Vec<ManifestError>,
}

/// Parse a catalog body fetched from `origin`.
///
/// Individual entries that fail validation are dropped and returned in
/// [`ParsedCatalog::rejected`]. A body that is not JSON, or has no `models`
/// array, fails as a whole.
pub fn parse_catalog(body: &[u8], origin: &str) -> Result<ParsedCatalog> {
    let document: Value = serde_json::from_slice(body).map_err(|e| LangpackError::CatalogParse {
        message: format!("{} is not valid JSON: {}", origin, e),
    })?;

    let Some(Value::Array(models)) = document.get("models") else {
        return Err(LangpackError::CatalogParse {
            message: format!("{} has no \"models\" array", origin),
        });
    };

    let mut parsed = ParsedCatalog::default();
    for (position, entry) in models.iter().enumerate() {
        let entry_origin = format!("{} entry {}", origin, position);
        let record = ManifestDocument::from_value(entry.clone(), &entry_origin)
            .and_then(|doc| doc.into_record(ManifestContext::Remote, &entry_origin));
        match record {
            Ok(record) => parsed.packages.push(record),
            Err(err) => parsed.rejected.push(err),
        }
    }
    parsed.packages.sort();

    debug!(
        "Parsed catalog from {}: {} packages, {} rejected",
        origin,
        parsed.packages.len(),
        parsed.rejected.len()
    );
    Ok(parsed)
}
