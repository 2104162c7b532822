//! Compressed sizes for emitted assets.

use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::model::Asset;
use crate::normalize_path::normalize_path;

/// Extensions a web server would typically serve gzip-encoded.
const COMPRESSIBLE: &[&str] = &[
    "cjs", "css", "html", "js", "json", "map", "mjs", "svg", "txt", "xhtml", "xml",
];

pub fn is_compressible(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| COMPRESSIBLE.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Gzip-compressed length of `bytes`, or `None` when `file_name` is not a
/// compressible type (images, fonts, wasm, ...).
pub fn gzip_size(file_name: &str, bytes: &[u8]) -> Option<u64> {
    if !is_compressible(file_name) {
        return None;
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).ok()?;
    let compressed = encoder.finish().ok()?;
    Some(compressed.len() as u64)
}

/// Fill in what a stats file may leave out: the normalized name (using the
/// bundler's `format` template, possibly empty) and, when the emitted file
/// can be read from `output_dir`, its gzip size.
pub fn complete_assets(assets: &mut [Asset], output_dir: Option<&Path>, format: &str) {
    for asset in assets {
        if asset.normalized.is_empty() {
            asset.normalized = normalize_path(&asset.name, format);
        }
        if asset.gzip_size.is_some() {
            continue;
        }
        let Some(dir) = output_dir else { continue };
        match std::fs::read(dir.join(&asset.name)) {
            Ok(bytes) => asset.gzip_size = gzip_size(&asset.name, &bytes),
            Err(e) => tracing::debug!(asset = %asset.name, error = %e, "asset not readable"),
        }
    }
}
