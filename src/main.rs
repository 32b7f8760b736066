mod config;
mod extract;
mod loader;
mod models;
mod normalizer;
mod pipeline;
mod storage;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;
use crate::extract::{JsonBundleSource, SavedPageSource};
use crate::pipeline::{Pipeline, PipelineStats};
use crate::storage::CsvStore;

#[derive(Parser)]
#[command(name = "drom-listings", about = "Normalize scraped drom.ru car listings", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize spec bundles from a JSON file or a directory of them
    Normalize {
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV (default: output.csv_path from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract listings from saved search/detail pages, then normalize
    Extract {
        /// Directory with saved .html pages
        #[arg(short, long, default_value = "pages")]
        dir: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize a listings CSV
    Stats {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "drom_listings=info,warn",
        1 => "drom_listings=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Normalize { input, output } => {
            let _t = utils::Timer::start("Normalize bundles");
            if let Some(out) = output {
                config.output.csv_path = out;
            }
            let source = JsonBundleSource::new(&input);
            let stats = Pipeline::new(config).run(&source).await?;
            print_run(&stats);
        }

        Command::Extract { dir, output } => {
            let _t = utils::Timer::start("Extract saved pages");
            if let Some(out) = output {
                config.output.csv_path = out;
            }
            let source =
                SavedPageSource::new(&dir, &config.selectors, config.pipeline.concurrency)?;
            let stats = Pipeline::new(config).run(&source).await?;
            print_run(&stats);
        }

        Command::Stats { input } => {
            let path = input.unwrap_or_else(|| config.output.csv_path.clone());
            let records = CsvStore::new(&path).read_all()?;
            info!("Read {} rows from {:?}", records.len(), path);

            if records.is_empty() {
                println!("No listings in {:?}, run `drom-listings normalize` first.", path);
                return Ok(());
            }

            let mut brands: BTreeMap<&str, usize> = BTreeMap::new();
            for r in &records {
                *brands.entry(r.brand.as_str()).or_default() += 1;
            }
            let mut top: Vec<(&str, usize)> = brands.into_iter().collect();
            top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

            let min_price = records.iter().map(|r| r.price).min().unwrap_or(0);
            let max_price = records.iter().map(|r| r.price).max().unwrap_or(0);
            let mean_mileage =
                records.iter().map(|r| r.mileage).sum::<u64>() / records.len() as u64;

            println!("─────────────────────────────────");
            println!("  drom listings: {:?}", path);
            println!("─────────────────────────────────");
            println!("  Listings : {}", utils::fmt_number(records.len() as u64));
            println!("  Brands   : {}", top.len());
            println!(
                "  Price    : {} - {}",
                utils::fmt_number(min_price),
                utils::fmt_number(max_price)
            );
            println!("  Mileage  : {} km avg", utils::fmt_number(mean_mileage));
            for (brand, n) in top.iter().take(5) {
                println!("    {:<12} {}", brand, n);
            }
            println!("─────────────────────────────────");
        }
    }

    Ok(())
}

fn print_run(stats: &PipelineStats) {
    println!(
        "{} listings, {} written, {} rejected in {} ms",
        stats.bundles_seen,
        stats.records_written,
        stats.rejected_total(),
        (stats.finished_at - stats.started_at).num_milliseconds()
    );
    for (kind, n) in &stats.rejected {
        println!("  {:<22} {}", kind, n);
    }
}
