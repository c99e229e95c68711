//! Daily scheduling using tokio-cron-scheduler.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::ScheduleConfig;
use crate::job::DigestJob;

/// Run `job` every day at the configured time until Ctrl-C.
pub async fn run_daily(job: Arc<DigestJob>, schedule: &ScheduleConfig) -> Result<()> {
    let cron = schedule.cron_expression()?;
    let mut scheduler = JobScheduler::new().await?;

    let daily_job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let job = job.clone();
        Box::pin(async move {
            if let Err(e) = job.run_once().await {
                tracing::error!("Daily digest failed: {:#}", e);
            }
        })
    })?;

    scheduler.add(daily_job).await?;
    scheduler.start().await?;

    tracing::info!(time = %schedule.time, cron = %cron, "Daily digest scheduled (UTC)");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutting down scheduler");
    scheduler.shutdown().await?;
    Ok(())
}
