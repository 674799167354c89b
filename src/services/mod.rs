pub mod analytics;
pub mod cash_ledger;
pub mod indicators;
pub mod job_handlers;
pub mod portfolio_sync;
