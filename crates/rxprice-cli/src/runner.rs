//! Per-outlet pricing and the task queue pass.
//!
//! One outlet is priced end to end by [`price_outlet`]: fetch its snapshot,
//! prepare the run, fetch competitor prices, price, export. [`run_queue`]
//! drives that for every queued outlet strictly one after another; a failed
//! outlet is logged and skipped and only successfully priced outlets are
//! removed from the queue.

use std::path::{Path, PathBuf};

use anyhow::Context;
use rxprice_client::CatalogClient;
use rxprice_core::{NewPrice, Outlet, PriceOrigin, PricingSettings, PricingTask};
use rxprice_engine::PricingRun;
use rxprice_export::{export_prices, run_stamp, ExportTarget};

/// The outlet to price and the codes its export is filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutletJob {
    pub outlet_id: String,
    pub enterprise_code: i64,
    pub serial_number: i64,
}

impl OutletJob {
    /// Builds a job from a queue entry, or `None` if a code is missing.
    pub(crate) fn from_task(task: &PricingTask) -> Option<Self> {
        Some(Self {
            outlet_id: task.outlet_id.to_uppercase(),
            enterprise_code: task.enterprise_code?,
            serial_number: task.serial_number?,
        })
    }
}

/// Counts of how each priced row was derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PricingSummary {
    pub rows: usize,
    pub market: usize,
    pub no_competitors: usize,
    pub sentinel: usize,
    pub competitors: usize,
}

impl PricingSummary {
    fn new(rows: &[NewPrice], competitors: usize) -> Self {
        let count = |origin: PriceOrigin| rows.iter().filter(|r| r.origin == origin).count();
        Self {
            rows: rows.len(),
            market: count(PriceOrigin::Market),
            no_competitors: count(PriceOrigin::NoCompetitors),
            sentinel: count(PriceOrigin::Sentinel),
            competitors,
        }
    }
}

#[derive(Debug)]
pub(crate) struct OutletOutcome {
    pub summary: PricingSummary,
    /// `None` on a dry run.
    pub exported: Option<PathBuf>,
}

/// Prices one outlet against the given outlet set.
///
/// # Errors
///
/// Returns an error if any fetch, the pricing run or the export fails. No
/// file is written in that case.
pub(crate) async fn price_outlet(
    client: &CatalogClient,
    settings: &PricingSettings,
    outlets: &[Outlet],
    save_path: &Path,
    job: &OutletJob,
    dry_run: bool,
) -> anyhow::Result<OutletOutcome> {
    let run = PricingRun::prepare(settings, outlets, &job.outlet_id)?;

    let snapshot = client
        .fetch_outlet_prices(job.enterprise_code, &job.outlet_id)
        .await
        .with_context(|| format!("fetching prices for outlet {}", job.outlet_id))?;

    let competitors = run.competitor_outlets(outlets);
    let offers = client
        .fetch_competitor_prices(&competitors)
        .await
        .with_context(|| format!("fetching competitor prices for outlet {}", job.outlet_id))?;

    let priced = run.price(&snapshot, &offers)?;
    let summary = PricingSummary::new(&priced, competitors.len());

    tracing::info!(
        outlet_id = %job.outlet_id,
        rows = summary.rows,
        market = summary.market,
        no_competitors = summary.no_competitors,
        sentinel = summary.sentinel,
        competitors = summary.competitors,
        "outlet priced"
    );

    if dry_run {
        return Ok(OutletOutcome {
            summary,
            exported: None,
        });
    }

    let target = ExportTarget {
        save_path: save_path.to_path_buf(),
        enterprise_code: job.enterprise_code,
        serial_number: job.serial_number,
        stamp: run_stamp(&snapshot),
    };
    let path = export_prices(&target, &priced)?;

    Ok(OutletOutcome {
        summary,
        exported: Some(path),
    })
}

/// Totals for one pass over the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct QueueSummary {
    pub tasks: usize,
    pub priced: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Processes every queued outlet once, oldest first.
///
/// # Errors
///
/// Returns an error only if the queue or outlet list cannot be fetched, or
/// the final queue deletion fails. Per-outlet failures are counted instead.
pub(crate) async fn run_queue(
    client: &CatalogClient,
    settings: &PricingSettings,
    save_path: &Path,
) -> anyhow::Result<QueueSummary> {
    let tasks = client.fetch_tasks().await.context("fetching task queue")?;
    let mut summary = QueueSummary {
        tasks: tasks.len(),
        ..QueueSummary::default()
    };

    if tasks.is_empty() {
        tracing::info!("task queue is empty");
        return Ok(summary);
    }

    let outlets = client.fetch_outlets().await.context("fetching outlets")?;
    let mut done: Vec<String> = Vec::new();

    for task in &tasks {
        let Some(job) = OutletJob::from_task(task) else {
            summary.skipped += 1;
            tracing::warn!(
                outlet_id = %task.outlet_id,
                "skipping task with missing enterprise code or serial number"
            );
            continue;
        };

        match price_outlet(client, settings, &outlets, save_path, &job, false).await {
            Ok(outcome) => {
                summary.priced += 1;
                if let Some(path) = &outcome.exported {
                    println!(
                        "  \u{2713} {:<38} {:>6} rows  {}",
                        job.outlet_id,
                        outcome.summary.rows,
                        path.display()
                    );
                }
                done.push(job.outlet_id);
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!(outlet_id = %job.outlet_id, error = %format!("{e:#}"), "outlet pricing failed");
                println!("  \u{2717} {:<38} {e:#}", job.outlet_id);
            }
        }
    }

    client
        .delete_tasks(&done)
        .await
        .context("removing priced outlets from the task queue")?;

    tracing::info!(
        tasks = summary.tasks,
        priced = summary.priced,
        skipped = summary.skipped,
        failed = summary.failed,
        "queue pass complete"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
