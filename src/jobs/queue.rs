//! Priority job queue: dequeue/complete/fail lifecycle, a heavy-job
//! semaphore, and staggered watcher startup.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::db::job_queries;
use crate::external::brokerage::BrokerageProvider;
use crate::external::price_provider::PriceProvider;
use crate::models::{JobRow, JobType};

#[derive(Clone)]
pub struct JobContext {
    pub pool: PgPool,
    pub price_provider: Arc<dyn PriceProvider>,
    pub brokerage: Arc<dyn BrokerageProvider>,
    pub heavy_semaphore: Arc<Semaphore>,
}

/// Resets orphaned `running` jobs to `pending` on boot — the last-resort
/// recovery for a process that died mid-job.
pub async fn recover_on_startup(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let reset = job_queries::reset_running_jobs(pool).await?;
    if reset > 0 {
        info!(count = reset, "reset orphaned running jobs to pending");
    }
    Ok(reset)
}

/// Spawns `worker_count` polling watchers, each started `watcher_startup_delay`
/// apart so they don't all hit the queue in the same instant on boot.
pub fn spawn_watchers(ctx: JobContext, worker_count: usize, watcher_startup_delay: StdDuration) {
    for idx in 0..worker_count {
        let ctx = ctx.clone();
        let delay = watcher_startup_delay * idx as u32;
        tokio::spawn(async move {
            sleep(delay).await;
            info!(worker = idx, "job watcher starting");
            watch_loop(ctx).await;
        });
    }
}

async fn watch_loop(ctx: JobContext) {
    loop {
        match job_queries::dequeue(&ctx.pool).await {
            Ok(Some(job)) => run_job(&ctx, job).await,
            Ok(None) => sleep(StdDuration::from_secs(2)).await,
            Err(e) => {
                error!(error = %e, "failed to dequeue job");
                sleep(StdDuration::from_secs(5)).await;
            }
        }
    }
}

async fn run_job(ctx: &JobContext, job: JobRow) {
    let Some(job_type) = JobType::from_str(&job.job_type) else {
        warn!(job_type = %job.job_type, "unknown job type, failing terminally");
        let _ = job_queries::fail(&ctx.pool, &job.id, "unknown job_type", true).await;
        return;
    };

    let _permit = if job_type.is_heavy() {
        Some(ctx.heavy_semaphore.clone().acquire_owned().await.expect("semaphore closed"))
    } else {
        None
    };

    info!(id = %job.id, job_type = %job.job_type, ticker = ?job.ticker, "running job");

    let result = crate::services::job_handlers::execute(ctx, job_type, &job).await;

    match result {
        Ok(()) => {
            if let Err(e) = job_queries::complete(&ctx.pool, &job.id).await {
                error!(error = %e, "failed to mark job completed");
            }
        }
        Err(e) => {
            let terminal = job.attempts >= job.max_attempts || !e.retryable();
            if let Err(db_err) =
                job_queries::fail(&ctx.pool, &job.id, &e.to_string(), terminal).await
            {
                error!(error = %db_err, "failed to mark job failed");
            }
        }
    }
}

pub async fn enqueue_if_stale(
    pool: &PgPool,
    job_type: JobType,
    ticker: &str,
    priority: i32,
    stale_after: chrono::Duration,
) {
    let since = chrono::Utc::now() - stale_after;
    match job_queries::has_recent_job(pool, job_type, ticker, since).await {
        Ok(true) => {}
        Ok(false) => {
            let id = format!("job_{}", uuid::Uuid::new_v4());
            let job = crate::models::NewJob::new(id, job_type, priority).with_ticker(ticker);
            if let Err(e) = job_queries::upsert(pool, &job).await {
                warn!(error = %e, ticker, "failed to enqueue demand-driven job");
            }
        }
        Err(e) => warn!(error = %e, ticker, "failed to check recent job"),
    }
}
