//! Pipeline orchestrator: bundle source → normalizer → CSV store.
//!
//! Every listing is normalized on its own. A rejected listing is logged with
//! its id and the reason, and never reaches the output file.

use crate::config::AppConfig;
use crate::extract::BundleSource;
use crate::normalizer::ListingNormalizer;
use crate::storage::CsvStore;
use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use std::collections::BTreeMap;
use tracing::{info, warn};

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self, source: &dyn BundleSource) -> Result<PipelineStats> {
        let started_at = Utc::now().naive_utc();

        info!("=== Step 1: Loading bundles ({}) ===", source.source_name());
        let bundles = source
            .fetch_bundles()
            .await
            .with_context(|| format!("{} source failed", source.source_name()))?;

        info!("=== Step 2: Normalizing {} listings ===", bundles.len());
        let normalizer = ListingNormalizer::new(self.config.vocabulary.clone());

        let mut records = Vec::with_capacity(bundles.len());
        let mut rejected: BTreeMap<String, usize> = BTreeMap::new();

        for (bundle, (id, outcome)) in bundles.iter().zip(normalizer.normalize_all(&bundles)) {
            match outcome {
                Ok(rec) => records.push(rec),
                Err(e) => {
                    warn!("{} ({}): {}", id, bundle.specs.schema_name(), e);
                    *rejected.entry(e.kind().to_string()).or_default() += 1;
                }
            }
        }

        let store = CsvStore::new(&self.config.output.csv_path);
        if !self.config.output.append {
            store.reset()?;
        }

        info!("=== Step 3: Writing {} records to {:?} ===", records.len(), store.path());
        let written = store.append(&records)?;

        let stats = PipelineStats {
            bundles_seen: bundles.len(),
            records_written: written,
            rejected,
            started_at,
            finished_at: Utc::now().naive_utc(),
        };

        info!(
            "=== Done: {} listings | {} written | {} rejected ===",
            stats.bundles_seen,
            stats.records_written,
            stats.rejected_total()
        );

        Ok(stats)
    }
}

#[derive(Debug)]
pub struct PipelineStats {
    pub bundles_seen: usize,
    pub records_written: usize,
    /// Rejection count per error kind
    pub rejected: BTreeMap<String, usize>,
    pub started_at: NaiveDateTime,
    pub finished_at: NaiveDateTime,
}

impl PipelineStats {
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SpecBundle, SpecSource};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    struct FixedSource(Vec<SpecBundle>);

    #[async_trait]
    impl BundleSource for FixedSource {
        async fn fetch_bundles(&self) -> Result<Vec<SpecBundle>> {
            Ok(self.0.clone())
        }

        fn source_name(&self) -> &'static str {
            "fixed"
        }
    }

    struct FailingSource;

    #[async_trait]
    impl BundleSource for FailingSource {
        async fn fetch_bundles(&self) -> Result<Vec<SpecBundle>> {
            Err(anyhow::anyhow!("pages dir is gone"))
        }

        fn source_name(&self) -> &'static str {
            "failing"
        }
    }

    fn card(id: &str, title: &str, items: &[&str]) -> SpecBundle {
        SpecBundle {
            id: id.into(),
            title: title.into(),
            price: "1 000 000".into(),
            specs: SpecSource::Compact {
                items: items.iter().map(|s| s.to_string()).collect(),
                details: BTreeMap::new(),
            },
            vin_report: None,
            description: None,
        }
    }

    fn config_for(name: &str) -> (AppConfig, PathBuf) {
        let dir = std::env::temp_dir().join(format!("drom-pipeline-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut config = AppConfig::default();
        config.output.csv_path = dir.join("listings.csv");
        (config, dir)
    }

    const ITEMS: [&str; 4] = ["1.6 л (106 л.с.),", "бензин,", "механика,", "передний"];

    #[test]
    fn test_run_skips_rejected_listings() {
        let (config, dir) = config_for("skip");
        let csv_path = config.output.csv_path.clone();

        let source = FixedSource(vec![
            card("ok-1", "Lada Granta, 2022", &ITEMS),
            card("bad-name", "Lada Granta 2022", &ITEMS),
            card("bad-spec", "Lada Vesta, 2021", &ITEMS[..2]),
            card("ok-2", "Lada Vesta, 2021", &ITEMS),
        ]);

        let stats = tokio_test::block_on(Pipeline::new(config).run(&source)).unwrap();

        assert_eq!(stats.bundles_seen, 4);
        assert_eq!(stats.records_written, 2);
        assert_eq!(stats.rejected_total(), 2);
        assert_eq!(stats.rejected["malformed_name"], 1);
        assert_eq!(stats.rejected["malformed_spec"], 1);
        assert!(stats.finished_at >= stats.started_at);

        let rows = CsvStore::new(&csv_path).read_all().unwrap();
        let models: Vec<&str> = rows.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(models, vec!["Granta", "Vesta"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_without_append_replaces_file() {
        let (mut config, dir) = config_for("replace");
        let csv_path = config.output.csv_path.clone();
        let source = FixedSource(vec![card("ok", "Lada Granta, 2022", &ITEMS)]);

        tokio_test::block_on(Pipeline::new(config.clone()).run(&source)).unwrap();
        tokio_test::block_on(Pipeline::new(config.clone()).run(&source)).unwrap();
        assert_eq!(CsvStore::new(&csv_path).read_all().unwrap().len(), 2);

        config.output.append = false;
        tokio_test::block_on(Pipeline::new(config).run(&source)).unwrap();
        assert_eq!(CsvStore::new(&csv_path).read_all().unwrap().len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failed_source_keeps_previous_output() {
        let (mut config, dir) = config_for("keep");
        let csv_path = config.output.csv_path.clone();
        let source = FixedSource(vec![card("ok", "Lada Granta, 2022", &ITEMS)]);
        tokio_test::block_on(Pipeline::new(config.clone()).run(&source)).unwrap();

        config.output.append = false;
        let err = tokio_test::block_on(Pipeline::new(config).run(&FailingSource)).unwrap_err();
        assert!(format!("{:#}", err).contains("failing source failed"));

        let rows = CsvStore::new(&csv_path).read_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].model, "Granta");

        std::fs::remove_dir_all(&dir).ok();
    }
}
