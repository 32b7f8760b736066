use crate::models::ListingRecord;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ── CSV store ─────────────────────────────────────────────────────────────────

/// Row-oriented output file. Columns follow [`ListingRecord`] field order;
/// missing optional values are empty cells.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start the file over.
    pub fn reset(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Could not remove {:?}", self.path))?;
            info!("Cleared {:?}", self.path);
        }
        Ok(())
    }

    /// Append records; the header is written only into a new or empty file.
    pub fn append(&self, records: &[ListingRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create dir {:?}", parent))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {:?}", self.path))?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        for rec in records {
            writer
                .serialize(rec)
                .with_context(|| format!("write {} {}", rec.brand, rec.model))?;
        }
        writer.flush()?;

        debug!("{:?}: +{} rows", self.path, records.len());
        Ok(records.len())
    }

    pub fn read_all(&self) -> Result<Vec<ListingRecord>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to open {:?}", self.path))?;

        let mut records = Vec::new();
        for (i, row) in reader.deserialize::<ListingRecord>().enumerate() {
            let rec = row.with_context(|| format!("row {} in {:?}", i + 1, self.path))?;
            records.push(rec);
        }
        Ok(records)
    }
}
