use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    CollectEod,
    CollectFundamentals,
    CollectNews,
    CollectFilings,
    SyncPortfolio,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::CollectEod => "collect_eod",
            JobType::CollectFundamentals => "collect_fundamentals",
            JobType::CollectNews => "collect_news",
            JobType::CollectFilings => "collect_filings",
            JobType::SyncPortfolio => "sync_portfolio",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "collect_eod" => Some(JobType::CollectEod),
            "collect_fundamentals" => Some(JobType::CollectFundamentals),
            "collect_news" => Some(JobType::CollectNews),
            "collect_filings" => Some(JobType::CollectFilings),
            "sync_portfolio" => Some(JobType::SyncPortfolio),
            _ => None,
        }
    }

    /// Heavy jobs load large market-data caches and are bounded by the
    /// heavy-job semaphore; `sync_portfolio` is lighter and runs outside it.
    pub fn is_heavy(&self) -> bool {
        !matches!(self, JobType::SyncPortfolio)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "cancelled" => JobStatus::Cancelled,
            _ => JobStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: String,
    pub job_type: String,
    pub ticker: Option<String>,
    pub priority: i32,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub attempts: i32,
    pub max_attempts: i32,
    pub error: Option<String>,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJob {
    pub id: String,
    pub job_type: JobType,
    pub ticker: Option<String>,
    pub priority: i32,
    #[serde(default)]
    pub max_attempts: i32,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl NewJob {
    pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

    pub fn new(id: impl Into<String>, job_type: JobType, priority: i32) -> Self {
        Self {
            id: id.into(),
            job_type,
            ticker: None,
            priority,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            payload: serde_json::json!({}),
        }
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_type_round_trips_through_as_str() {
        for job_type in [
            JobType::CollectEod,
            JobType::CollectFundamentals,
            JobType::CollectNews,
            JobType::CollectFilings,
            JobType::SyncPortfolio,
        ] {
            assert_eq!(JobType::from_str(job_type.as_str()), Some(job_type));
        }
    }

    #[test]
    fn unknown_job_type_string_is_none() {
        assert_eq!(JobType::from_str("bogus"), None);
    }

    #[test]
    fn only_sync_portfolio_is_light() {
        assert!(!JobType::SyncPortfolio.is_heavy());
        assert!(JobType::CollectEod.is_heavy());
        assert!(JobType::CollectFundamentals.is_heavy());
        assert!(JobType::CollectNews.is_heavy());
        assert!(JobType::CollectFilings.is_heavy());
    }

    #[test]
    fn job_status_parses_unknown_strings_as_pending() {
        assert_eq!(JobStatus::from_str("bogus"), JobStatus::Pending);
        assert_eq!(JobStatus::from_str("running"), JobStatus::Running);
    }

    #[test]
    fn new_job_carries_default_attempts_and_empty_payload() {
        let job = NewJob::new("job_1", JobType::CollectEod, 5).with_ticker("AAPL");
        assert_eq!(job.max_attempts, NewJob::DEFAULT_MAX_ATTEMPTS);
        assert_eq!(job.ticker.as_deref(), Some("AAPL"));
        assert_eq!(job.payload, serde_json::json!({}));
    }
}
