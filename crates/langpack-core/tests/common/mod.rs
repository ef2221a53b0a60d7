//! Shared fixtures for integration tests.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A manifest body with type "base" and API 1.0.
pub fn manifest(short_name: &str, src: &str, trg: &str, version: f64) -> String {
    serde_json::json!({
        "shortName": short_name,
        "modelName": format!("{}-{} {}", src, trg, short_name),
        "src": src,
        "trg": trg,
        "type": "base",
        "version": version,
        "API": 1.0,
    })
    .to_string()
}

/// Build a `.tar.gz` containing `files`, each `(path, contents)`.
pub fn tar_gz(files: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(1_600_000_000);
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// An archive wrapping a package directory named `dir_name`.
pub fn package_archive(dir_name: &str, short_name: &str, src: &str, trg: &str, version: f64) -> Vec<u8> {
    let manifest = manifest(short_name, src, trg, version);
    let manifest_path = format!("{}/model_info.json", dir_name);
    let model_path = format!("{}/model.{}{}.intgemm8.bin", dir_name, src, trg);
    tar_gz(&[
        (manifest_path.as_str(), manifest.as_bytes()),
        (model_path.as_str(), &[0u8; 512][..]),
    ])
}

/// Write `bytes` as `name` into `dir`.
pub fn write_archive(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// A catalog document listing `(short, src, trg, version)` entries.
pub fn catalog(entries: &[(&str, &str, &str, f64)]) -> String {
    let models: Vec<_> = entries
        .iter()
        .map(|(short, src, trg, version)| {
            serde_json::json!({
                "shortName": short,
                "modelName": format!("{}-{} {}", src, trg, short),
                "src": src,
                "trg": trg,
                "type": "base",
                "version": version,
                "API": 1.0,
                "url": format!("https://example.org/models/{}.tar.gz", short),
            })
        })
        .collect();
    serde_json::json!({ "models": models }).to_string()
}

pub fn managed_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}
