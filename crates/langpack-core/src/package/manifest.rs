//! Package manifest (`model_info.json`) parsing and validation.
//!
//! A manifest is a flat JSON object. Descriptive fields are optional so that
//! manifests written by older tools stay usable; the one critical field is
//! `path` for installed packages (filled in from the directory, never read
//! from disk) and `url` for catalog entries.

use crate::config::PathsConfig;
use crate::error::{ManifestError, Result};
use crate::package::record::{PackageInfo, PackageRecord};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which critical field a manifest must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestContext {
    /// An installed package; requires `path`.
    Local,
    /// A catalog entry; requires `url`.
    Remote,
}

impl ManifestContext {
    pub fn critical_field(self) -> &'static str {
        match self {
            ManifestContext::Local => "path",
            ManifestContext::Remote => "url",
        }
    }
}

/// The raw manifest document, as found on disk or in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestDocument {
    #[serde(rename = "shortName", default, deserialize_with = "lenient_string")]
    pub short_name: String,
    #[serde(rename = "modelName", default, deserialize_with = "lenient_string")]
    pub model_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub src: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trg: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub package_type: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub version: f64,
    #[serde(rename = "API", default, deserialize_with = "lenient_number")]
    pub api: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ManifestDocument {
    /// Parse a single JSON value (a manifest file body or one catalog entry).
    ///
    /// `origin` names the source for error messages.
    pub fn from_value(value: Value, origin: &str) -> std::result::Result<Self, ManifestError> {
        if !value.is_object() {
            return Err(ManifestError::Corrupt {
                path: PathBuf::from(origin),
                message: "expected a JSON object".to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| ManifestError::Corrupt {
            path: PathBuf::from(origin),
            message: e.to_string(),
        })
    }

    fn info(&self) -> PackageInfo {
        PackageInfo {
            short_name: self.short_name.clone(),
            display_name: self.model_name.clone(),
            source_language: self.src.clone(),
            target_language: self.trg.clone(),
            package_type: self.package_type.clone(),
            version: self.version,
            api_version: self.api,
        }
    }

    /// Turn the document into a record, enforcing the critical field for
    /// `context`.
    pub fn into_record(
        self,
        context: ManifestContext,
        origin: &str,
    ) -> std::result::Result<PackageRecord, ManifestError> {
        let info = self.info();
        let record = match context {
            ManifestContext::Local => self.path.and_then(|path| PackageRecord::local(info, path)),
            ManifestContext::Remote => self.url.and_then(|url| PackageRecord::remote(info, url)),
        };

        record.ok_or_else(|| ManifestError::MissingCriticalField {
            field: context.critical_field(),
            origin: origin.to_string(),
        })
    }
}

/// Path of the manifest file inside a package directory.
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(PathsConfig::MANIFEST_FILENAME)
}

/// Read the manifest in `dir`, annotated with `dir` as its `path`.
///
/// Returns `Ok(None)` if the directory has no manifest; that is not an error,
/// the directory simply isn't a package.
pub fn read_manifest(dir: &Path) -> Result<Option<ManifestDocument>> {
    let path = manifest_path(dir);
    if !path.is_file() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ManifestError::Unreadable {
        path: path.clone(),
        source: e,
    })?;

    let value: Value = serde_json::from_str(&contents).map_err(|e| ManifestError::Corrupt {
        path: path.clone(),
        message: e.to_string(),
    })?;

    let mut document = ManifestDocument::from_value(value, &path.display().to_string())?;
    document.path = Some(dir.to_path_buf());
    debug!("Read manifest {}", path.display());
    Ok(Some(document))
}

/// Validate the package in `dir` and build its local record.
///
/// Returns `Ok(None)` if there is no manifest.
pub fn load_package(dir: &Path) -> Result<Option<PackageRecord>> {
    let Some(document) = read_manifest(dir)? else {
        return Ok(None);
    };
    let origin = manifest_path(dir).display().to_string();
    Ok(Some(document.into_record(ManifestContext::Local, &origin)?))
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Versions are numbers, but some manifests quote them.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    // NaN and infinities would break version ordering.
    Ok(number.filter(|v| v.is_finite()).unwrap_or(0.0))
}
