pub mod parsers;

use crate::config::Selectors;
use crate::loader::{discover_files, load_bundles};
use crate::models::SpecBundle;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use self::parsers::{
    is_card_page, merge_detail_pages, parse_card_page, parse_detail_page, validate_selectors,
};

// ── Source trait ──────────────────────────────────────────────────────────────

/// Anything that can hand over raw spec bundles.
#[async_trait]
pub trait BundleSource: Send + Sync {
    async fn fetch_bundles(&self) -> Result<Vec<SpecBundle>>;

    fn source_name(&self) -> &'static str;
}

// ── Saved HTML pages ──────────────────────────────────────────────────────────

/// Directory of pages saved from the site: search result pages and listing
/// detail pages, told apart by the card selector. A detail page saved under
/// the name its card links to is folded into that card.
pub struct SavedPageSource {
    dir: PathBuf,
    selectors: Arc<Selectors>,
    concurrency: usize,
}

impl SavedPageSource {
    pub fn new(dir: &Path, selectors: &Selectors, concurrency: usize) -> Result<Self> {
        validate_selectors(selectors).context("Invalid page selectors")?;

        Ok(Self {
            dir: dir.to_path_buf(),
            selectors: Arc::new(selectors.clone()),
            concurrency: concurrency.max(1),
        })
    }
}

fn page_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn parse_page(html: &str, page_id: &str, selectors: &Selectors) -> Result<Vec<SpecBundle>> {
    if is_card_page(html, selectors)? {
        parse_card_page(html, page_id, selectors)
    } else {
        Ok(parse_detail_page(html, page_id, selectors)?.into_iter().collect())
    }
}

#[async_trait]
impl BundleSource for SavedPageSource {
    async fn fetch_bundles(&self) -> Result<Vec<SpecBundle>> {
        let files = discover_files(&self.dir, "html")?;
        info!("Found {} saved pages in {:?}", files.len(), self.dir);

        let sem = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::new();

        for path in files {
            let sem = Arc::clone(&sem);
            let selectors = Arc::clone(&self.selectors);
            let task_path = path.clone();

            let handle = tokio::spawn(async move {
                let _permit = sem.acquire_owned().await?;

                let html = tokio::fs::read_to_string(&task_path)
                    .await
                    .with_context(|| format!("Failed to read {:?}", task_path))?;
                let id = page_id(&task_path);

                let bundles =
                    tokio::task::spawn_blocking(move || parse_page(&html, &id, &selectors))
                        .await??;
                Ok::<_, anyhow::Error>(bundles)
            });

            handles.push((path, handle));
        }

        // awaited in file order so output order does not depend on scheduling
        let mut bundles = Vec::new();
        for (path, handle) in handles {
            match handle.await {
                Ok(Ok(found)) => {
                    debug!("{:?}: {} bundles", path, found.len());
                    bundles.extend(found);
                }
                Ok(Err(e)) => warn!("{:?}: {:#}", path, e),
                Err(e) => error!("Task panic for {:?}: {}", path, e),
            }
        }

        let bundles = merge_detail_pages(bundles);
        info!("Extracted {} bundles", bundles.len());
        Ok(bundles)
    }

    fn source_name(&self) -> &'static str {
        "saved-pages"
    }
}

// ── JSON bundles ──────────────────────────────────────────────────────────────

/// Bundles produced by an external scraper, as a JSON file or a directory of
/// them.
pub struct JsonBundleSource {
    path: PathBuf,
}

impl JsonBundleSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

#[async_trait]
impl BundleSource for JsonBundleSource {
    async fn fetch_bundles(&self) -> Result<Vec<SpecBundle>> {
        let files = if self.path.is_dir() {
            discover_files(&self.path, "json")?
        } else {
            vec![self.path.clone()]
        };

        let mut bundles = Vec::new();
        for path in &files {
            bundles.extend(load_bundles(path)?);
        }
        info!("Loaded {} bundles from {} files", bundles.len(), files.len());
        Ok(bundles)
    }

    fn source_name(&self) -> &'static str {
        "json"
    }
}
