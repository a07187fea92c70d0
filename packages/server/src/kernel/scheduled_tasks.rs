//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! Expired verification sessions are already invisible to readers; the sweep
//! only reclaims their storage.
//!
//! ```text
//! Scheduler (SESSION_SWEEP_CRON, default every minute)
//!     │
//!     └─► purge_expired_sessions()
//!             └─► BaseSessionStore::purge_expired()
//! ```

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::auth::actions::purge_expired_sessions;
use crate::kernel::ServerDeps;

/// Start all scheduled tasks
pub async fn start_scheduler(deps: ServerDeps, sweep_cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let sweep_job = Job::new_async(sweep_cron, move |_uuid, _lock| {
        let deps = deps.clone();
        Box::pin(async move {
            run_session_sweep(&deps).await;
        })
    })?;

    scheduler.add(sweep_job).await?;
    scheduler.start().await?;

    tracing::info!(cron = %sweep_cron, "Scheduled tasks started (expired session sweep)");
    Ok(scheduler)
}

/// Run the expired session sweep once
async fn run_session_sweep(deps: &ServerDeps) {
    match purge_expired_sessions(deps).await {
        Ok(0) => tracing::debug!("No expired sessions to purge"),
        Ok(purged) => tracing::info!(purged, "Purged expired verification sessions"),
        Err(e) => tracing::error!(error = %e, "Session sweep failed"),
    }
}
