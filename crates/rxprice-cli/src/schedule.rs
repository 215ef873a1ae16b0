//! Cron-driven queue passes.

use std::path::PathBuf;
use std::sync::Arc;

use rxprice_client::CatalogClient;
use rxprice_core::PricingSettings;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::runner::run_queue;

/// Shared state for every tick of the queue job.
struct QueueJob {
    client: CatalogClient,
    settings: PricingSettings,
    save_path: PathBuf,
    /// Held for the duration of a pass; a tick that finds it taken is skipped.
    running: Mutex<()>,
}

/// Builds a scheduler with the queue pass registered on `cron` and starts it.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the cron expression is invalid or the
/// scheduler cannot be started.
pub(crate) async fn build_scheduler(
    cron: &str,
    client: CatalogClient,
    settings: PricingSettings,
    save_path: PathBuf,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    let state = Arc::new(QueueJob {
        client,
        settings,
        save_path,
        running: Mutex::new(()),
    });

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = Arc::clone(&state);

        Box::pin(async move {
            let Ok(_guard) = state.running.try_lock() else {
                tracing::warn!("scheduler: previous queue pass still running; skipping tick");
                return;
            };

            tracing::info!("scheduler: starting queue pass");
            match run_queue(&state.client, &state.settings, &state.save_path).await {
                Ok(summary) => tracing::info!(
                    priced = summary.priced,
                    failed = summary.failed,
                    skipped = summary.skipped,
                    "scheduler: queue pass complete"
                ),
                Err(e) => {
                    tracing::error!(error = %format!("{e:#}"), "scheduler: queue pass failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(cron = %cron, "scheduler: registered queue job");
    Ok(scheduler)
}

/// Resolves on SIGINT or, on unix, SIGTERM.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping scheduler");
}
