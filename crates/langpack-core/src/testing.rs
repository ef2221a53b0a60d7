//! Fixtures shared by unit tests.

use crate::package::{PackageInfo, PackageRecord};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::path::Path;

/// Modification time stamped on every fixture archive entry.
pub(crate) const ARCHIVE_MTIME: u64 = 1_600_000_000;

pub(crate) struct ArchiveEntry<'a> {
    name: &'a str,
    data: Option<&'a [u8]>,
}

impl<'a> ArchiveEntry<'a> {
    pub(crate) fn file(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            data: Some(data),
        }
    }

    pub(crate) fn dir(name: &'a str) -> Self {
        Self { name, data: None }
    }
}

/// Build a `.tar.gz` in memory.
///
/// Names are written into the header verbatim so that tests can produce
/// entries `tar::Builder` would refuse, such as `../escape`.
pub(crate) fn build_archive(entries: &[ArchiveEntry<'_>]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in entries {
        let mut header = tar::Header::new_gnu();
        let data = entry.data.unwrap_or(&[]);
        match entry.data {
            Some(_) => {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_mode(0o644);
            }
            None => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_mode(0o755);
            }
        }
        header.set_size(data.len() as u64);
        header.set_mtime(ARCHIVE_MTIME);

        let name = entry.name.as_bytes();
        header.as_old_mut().name[..name.len()].copy_from_slice(name);
        header.set_cksum();

        builder.append(&header, data).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// A manifest body for `short_name` translating `src` to `trg`.
pub(crate) fn manifest_json(short_name: &str, src: &str, trg: &str, version: f64) -> String {
    serde_json::json!({
        "shortName": short_name,
        "modelName": format!("{} model", short_name),
        "src": src,
        "trg": trg,
        "type": "tiny",
        "version": version,
        "API": 1.0,
    })
    .to_string()
}

/// Write a package directory with a manifest.
pub(crate) fn write_package(dir: &Path, short_name: &str, src: &str, trg: &str, version: f64) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(
        dir.join("model_info.json"),
        manifest_json(short_name, src, trg, version),
    )
    .unwrap();
}

pub(crate) fn info(short_name: &str, src: &str, trg: &str, version: f64) -> PackageInfo {
    PackageInfo {
        short_name: short_name.to_string(),
        display_name: format!("{} model", short_name),
        source_language: src.to_string(),
        target_language: trg.to_string(),
        package_type: "tiny".to_string(),
        version,
        api_version: 1.0,
    }
}

pub(crate) fn local(short_name: &str, src: &str, trg: &str, version: f64) -> PackageRecord {
    PackageRecord::local(
        info(short_name, src, trg, version),
        format!("/models/{}", short_name),
    )
    .unwrap()
}

pub(crate) fn remote(short_name: &str, src: &str, trg: &str, version: f64) -> PackageRecord {
    PackageRecord::remote(
        info(short_name, src, trg, version),
        format!("http://example.com/{}.tar.gz", short_name),
    )
    .unwrap()
}
