//! Streaming extraction of gzip-compressed tar archives.
//!
//! Entries are decoded and written one at a time, so the archive never has to
//! fit in memory. A failure part-way through leaves whatever was already
//! written on disk; callers extract into a scratch directory they can throw
//! away.

use crate::config::PathsConfig;
use crate::error::{LangpackError, Result};
use flate2::read::GzDecoder;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Whether `file_name` has the package archive suffix.
pub fn is_archive_name(file_name: &str) -> bool {
    file_name
        .to_ascii_lowercase()
        .ends_with(PathsConfig::ARCHIVE_SUFFIX)
}

/// The archive file name with everything from the archive suffix onward
/// removed (`en-de.tar.gz` becomes `en-de`).
pub fn archive_stem(file_name: &str) -> &str {
    match file_name
        .to_ascii_lowercase()
        .find(PathsConfig::ARCHIVE_SUFFIX)
    {
        Some(end) => &file_name[..end],
        None => file_name,
    }
}

/// Extract a `.tar.gz` stream into `destination`.
///
/// Returns the relative path of every entry in the order it was encountered.
/// Modification times are preserved. Entries that would land outside
/// `destination` are rejected.
///
/// # Arguments
///
/// * `reader` - The compressed archive stream
/// * `destination` - Existing directory to extract into
/// * `archive_name` - Name used in error messages
pub fn extract_tar_gz<R: Read>(
    reader: R,
    destination: &Path,
    archive_name: &str,
) -> Result<Vec<PathBuf>> {
    let extraction_error = |message: String, source: Option<std::io::Error>| {
        LangpackError::Extraction {
            archive: archive_name.to_string(),
            message,
            source,
        }
    };

    let decoder = GzDecoder::new(BufReader::new(reader));
    let mut archive = tar::Archive::new(decoder);
    archive.set_preserve_mtime(true);

    let entries = archive
        .entries()
        .map_err(|e| extraction_error(format!("Failed to read archive: {}", e), Some(e)))?;

    let mut extracted = Vec::new();
    for entry in entries {
        let mut entry = entry
            .map_err(|e| extraction_error(format!("Failed to read entry header: {}", e), Some(e)))?;

        let relative = entry
            .path()
            .map_err(|e| extraction_error(format!("Invalid entry path: {}", e), Some(e)))?
            .into_owned();
        if relative.has_root() {
            return Err(extraction_error(
                format!("Entry {} has an absolute path", relative.display()),
                None,
            ));
        }

        let unpacked = entry.unpack_in(destination).map_err(|e| {
            extraction_error(
                format!("Failed to write {}: {}", relative.display(), e),
                Some(e),
            )
        })?;
        if !unpacked {
            return Err(extraction_error(
                format!(
                    "Entry {} would be written outside {}",
                    relative.display(),
                    destination.display()
                ),
                None,
            ));
        }

        debug!("Extracted {}", relative.display());
        extracted.push(relative);
    }

    info!(
        "Extracted {} entries from {} into {}",
        extracted.len(),
        archive_name,
        destination.display()
    );
    Ok(extracted)
}
