mod runner;
mod schedule;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rxprice_client::CatalogClient;
use rxprice_core::{load_settings, AppConfig, PricingSettings, SettingsOverrides};
use rxprice_engine::RatioTable;
use tracing_subscriber::EnvFilter;

use crate::runner::{price_outlet, run_queue, OutletJob};

#[derive(Debug, Parser)]
#[command(name = "rxprice-cli")]
#[command(about = "Competitive repricing for pharmacy outlets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price a single outlet and export its new prices
    Price {
        /// Enterprise code the export is filed under
        #[arg(long)]
        enterprise: i64,

        /// Outlet serial number
        #[arg(long)]
        serial: i64,

        /// Outlet (branch) identifier
        #[arg(long)]
        branch: String,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Price and log a summary without writing an export
        #[arg(long)]
        dry_run: bool,
    },
    /// Process every outlet in the remote task queue once
    Run {
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Process the task queue on a cron schedule until interrupted
    Schedule {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Cron expression (with seconds); defaults to `RXPRICE_SCHEDULE_CRON`
        #[arg(long)]
        cron: Option<String>,
    },
    /// Print the validated pricing settings and the ratio table
    Settings {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Settings file location plus per-invocation overrides.
#[derive(Debug, Clone, Default, Args)]
struct SettingsArgs {
    /// Pricing settings YAML file
    #[arg(long = "settings", env = "RXPRICE_SETTINGS_PATH")]
    path: Option<PathBuf>,

    /// Price segment bounds, comma separated
    #[arg(long, value_delimiter = ',')]
    prices: Option<Vec<f64>>,

    /// Distance band bounds in meters, comma separated
    #[arg(long, value_delimiter = ',')]
    distances: Option<Vec<f64>>,

    /// Reference distance unit in meters
    #[arg(long)]
    unit: Option<f64>,

    /// Price per reference distance unit
    #[arg(long)]
    unit_price: Option<f64>,

    /// Nearest-band discount, between 0 and 1
    #[arg(long)]
    deviation: Option<f64>,
}

impl SettingsArgs {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            prices: self.prices.clone(),
            distances: self.distances.clone(),
            default_unit: self.unit,
            default_unit_price: self.unit_price,
            deviation: self.deviation,
        }
    }

    /// Loads the settings file (explicit path, else `fallback`) and applies
    /// the overrides.
    fn resolve(&self, fallback: Option<&PathBuf>) -> anyhow::Result<PricingSettings> {
        let path = self
            .path
            .as_ref()
            .or(fallback)
            .cloned()
            .unwrap_or_else(|| PathBuf::from("./config/pricing.yaml"));
        let settings = load_settings(&path)
            .with_context(|| format!("loading pricing settings from {}", path.display()))?;
        let overrides = self.overrides();
        if overrides.is_empty() {
            return Ok(settings);
        }
        Ok(settings.with_overrides(&overrides)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Commands::Settings { settings } = &cli.command {
        let level = std::env::var("RXPRICE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        init_tracing(&level)?;
        return print_settings(settings);
    }

    let config = rxprice_core::load_app_config_from_env()?;
    init_tracing(&config.log_level)?;
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Price {
            enterprise,
            serial,
            branch,
            settings,
            dry_run,
        } => {
            let settings = settings.resolve(Some(&config.settings_path))?;
            let job = OutletJob {
                outlet_id: branch.to_uppercase(),
                enterprise_code: enterprise,
                serial_number: serial,
            };
            price_command(&config, &settings, &job, dry_run).await
        }
        Commands::Run { settings } => {
            let settings = settings.resolve(Some(&config.settings_path))?;
            let client = CatalogClient::from_config(&config)?;
            let summary = run_queue(&client, &settings, &config.save_path).await?;
            println!(
                "queue pass: {} tasks, {} priced, {} skipped, {} failed",
                summary.tasks, summary.priced, summary.skipped, summary.failed
            );
            Ok(())
        }
        Commands::Schedule { settings, cron } => {
            let settings = settings.resolve(Some(&config.settings_path))?;
            let cron = cron.unwrap_or_else(|| config.schedule_cron.clone());
            let client = CatalogClient::from_config(&config)?;
            let mut scheduler =
                schedule::build_scheduler(&cron, client, settings, config.save_path.clone())
                    .await?;
            schedule::shutdown_signal().await;
            scheduler.shutdown().await?;
            Ok(())
        }
        Commands::Settings { .. } => Ok(()),
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

async fn price_command(
    config: &AppConfig,
    settings: &PricingSettings,
    job: &OutletJob,
    dry_run: bool,
) -> anyhow::Result<()> {
    let client = CatalogClient::from_config(config)?;
    let outlets = client.fetch_outlets().await.context("fetching outlets")?;
    let outcome = price_outlet(
        &client,
        settings,
        &outlets,
        &config.save_path,
        job,
        dry_run,
    )
    .await?;

    let s = outcome.summary;
    match outcome.exported {
        Some(path) => println!("exported {} rows to {}", s.rows, path.display()),
        None => println!(
            "dry run: {} rows ({} market, {} without competitors, {} unlinked) against {} competitors",
            s.rows, s.market, s.no_competitors, s.sentinel, s.competitors
        ),
    }
    Ok(())
}

fn print_settings(args: &SettingsArgs) -> anyhow::Result<()> {
    let settings = args.resolve(None)?;
    let table = RatioTable::new(&settings)?;
    println!("prices:             {:?}", settings.prices);
    println!("distances:          {:?}", settings.distances);
    println!("default unit:       {}", settings.default_unit);
    println!("default unit price: {}", settings.default_unit_price);
    println!("deviation:          {}", settings.deviation);
    println!();
    print!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests;
