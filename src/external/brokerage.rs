use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::Holding;

#[derive(Debug, Clone)]
pub struct BrokerageTrade {
    pub ticker: String,
    pub side: String,
    pub quantity: f64,
    pub price: f64,
    pub currency: String,
    pub executed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BrokerageSnapshot {
    pub holdings: Vec<Holding>,
    pub trades: Vec<BrokerageTrade>,
}

#[derive(Debug, Error)]
pub enum BrokerageError {
    #[error("brokerage key not configured")]
    MissingKey,
    #[error("network error: {0}")]
    Network(String),
    #[error("bad response: {0}")]
    BadResponse(String),
}

/// The brokerage integration (Navexa or equivalent) is an external
/// collaborator named only at its interface; this trait is the seam a
/// concrete SDK client would implement.
#[async_trait]
pub trait BrokerageProvider: Send + Sync {
    async fn fetch_snapshot(
        &self,
        navexa_key: &str,
        portfolio_name: &str,
    ) -> Result<BrokerageSnapshot, BrokerageError>;
}

/// Placeholder used until a concrete Navexa client is wired in; every call
/// fails with `MissingKey` so callers fall back to locally-derived data.
pub struct UnconfiguredBrokerageProvider;

#[async_trait]
impl BrokerageProvider for UnconfiguredBrokerageProvider {
    async fn fetch_snapshot(
        &self,
        _navexa_key: &str,
        _portfolio_name: &str,
    ) -> Result<BrokerageSnapshot, BrokerageError> {
        Err(BrokerageError::MissingKey)
    }
}
