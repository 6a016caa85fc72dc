//! CLI entry point for assetflow.
//!
//! Provides a thin demo harness around the core library:
//! - `run` seeds a small fleet, generates a synthetic telemetry batch and
//!   processes it through the pipeline
//! - `config` prints the resolved configuration
//!
//! # Usage
//!
//! ```bash
//! assetflow run --records 10000
//! assetflow config
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::info;

use assetflow::asset::{Asset, AssetSpec, AssetStatus};
use assetflow::config::Settings;
use assetflow::pipeline::TelemetryPipeline;
use assetflow::registry::AssetRegistry;
use assetflow::sink::MemorySink;
use assetflow::telemetry::{OutcomeError, TelemetryRecord, Warning};
use assetflow::trace;

#[derive(Parser)]
#[command(name = "assetflow")]
#[command(about = "Concurrent asset telemetry engine", long_about = None)]
struct Cli {
    /// Optional configuration file (defaults to config/default.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed a demo fleet and run a synthetic telemetry batch
    Run {
        /// Number of telemetry records to generate
        #[arg(long, default_value_t = 10_000)]
        records: usize,

        /// Override the configured concurrency limit
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    settings.validate().map_err(|e| anyhow!(e))?;
    trace::init_from_settings(&settings).map_err(|e| anyhow!(e))?;

    match cli.command {
        Commands::Run {
            records,
            concurrency,
        } => run_batch(settings, records, concurrency).await,
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

async fn run_batch(
    mut settings: Settings,
    record_count: usize,
    concurrency: Option<usize>,
) -> Result<()> {
    if let Some(limit) = concurrency {
        settings.pipeline.max_concurrent = limit.max(1);
    }

    println!("🚀 assetflow — concurrent asset telemetry engine");

    let registry = Arc::new(AssetRegistry::new());
    let fleet = seed_fleet(&registry).await?;
    info!(assets = fleet.len(), "demo fleet registered");

    let mut rng = rand::thread_rng();
    let records: Vec<TelemetryRecord> = (0..record_count)
        .map(|i| {
            let asset = &fleet[i % fleet.len()];
            TelemetryRecord::new(
                asset.id(),
                asset.kind(),
                rng.gen::<f64>() * 100.0,
                rng.gen::<f64>() * 120.0,
            )
        })
        .collect();

    let sink: Arc<MemorySink> = Arc::new(MemorySink::new());
    let pipeline = TelemetryPipeline::new(Arc::clone(&registry), sink, settings.pipeline.clone());

    let started = std::time::Instant::now();
    let outcomes = pipeline.process(records, CancellationToken::new()).await;
    let elapsed = started.elapsed();

    let persisted = outcomes.iter().filter(|o| o.persisted).count();
    let high_temp = outcomes
        .iter()
        .filter(|o| o.has_warning(Warning::HighTemperature))
        .count();
    let low_power = outcomes
        .iter()
        .filter(|o| o.has_warning(Warning::LowPower))
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| matches!(o.error, Some(OutcomeError::Persistence(_))))
        .count();
    let maintenance = registry
        .find_all_by_status(AssetStatus::Maintenance)
        .await
        .len();

    println!(
        "Processed {} records in {:.2?} ({} workers max)",
        outcomes.len(),
        elapsed,
        settings.pipeline.max_concurrent
    );
    println!("  persisted:          {persisted}");
    println!("  high-temp warnings: {high_temp}");
    println!("  low-power alerts:   {low_power}");
    println!("  persist failures:   {failed}");
    println!("  assets flagged:     {maintenance}");

    Ok(())
}

/// Registers the demo fleet and returns it for record generation.
async fn seed_fleet(registry: &AssetRegistry) -> Result<Vec<Asset>> {
    let installed = |y, m, d| {
        chrono::NaiveDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| anyhow!("invalid seed date {y}-{m}-{d}"))
    };

    let mut fleet = Vec::new();
    fleet.push(
        registry
            .add(Asset::new(
                "Small Turbine",
                AssetStatus::Active,
                installed(2024, 10, 25)?,
                AssetSpec::Turbine { blade_count: 3 },
            ))
            .await?,
    );
    fleet.push(
        registry
            .add(Asset::new(
                "Ridge Turbine",
                AssetStatus::Active,
                installed(2023, 3, 2)?,
                AssetSpec::Turbine { blade_count: 5 },
            ))
            .await?,
    );
    fleet.push(
        registry
            .add(
                Asset::new(
                    "Premium Solar Panel",
                    AssetStatus::Active,
                    installed(2025, 5, 15)?,
                    AssetSpec::SolarPanel {
                        efficiency_rating: 9.2,
                    },
                )
                .with_location("south field"),
            )
            .await?,
    );
    fleet.push(
        registry
            .add(Asset::new(
                "Backup Generator",
                AssetStatus::Active,
                installed(2022, 7, 1)?,
                AssetSpec::Generic,
            ))
            .await?,
    );

    Ok(fleet)
}
