//! JSON loader for spec bundles captured by an external scraper.

use crate::models::SpecBundle;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Deserialize)]
#[serde(untagged)]
enum BundleFile {
    Many(Vec<SpecBundle>),
    One(Box<SpecBundle>),
}

/// Read a JSON array of bundles, or a single bundle object.
/// Bundles without an id get `<file stem>#<index>`.
pub fn load_bundles(path: &Path) -> Result<Vec<SpecBundle>> {
    debug!("Loading bundles from {:?}", path);

    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let parsed: BundleFile =
        serde_json::from_str(&text).with_context(|| format!("Invalid bundle JSON in {:?}", path))?;

    let mut bundles = match parsed {
        BundleFile::Many(v) => v,
        BundleFile::One(b) => vec![*b],
    };

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    for (i, bundle) in bundles.iter_mut().enumerate() {
        if bundle.id.is_empty() {
            bundle.id = format!("{}#{}", stem, i);
        }
    }

    info!("{:?}: {} bundles", path, bundles.len());
    Ok(bundles)
}

/// Files in `dir` with the given extension, sorted by name.
pub fn discover_files(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))? {
        let path = entry?.path();
        if path.is_file() && path.extension().map(|e| e == ext).unwrap_or(false) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
