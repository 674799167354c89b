use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// `force_refresh` advisory text surfaced on `GET /api/market/stocks/{ticker}`.
pub const REFRESH_ADVISORY: &str =
    "a refresh has been queued as a background job; this response may reflect stale data until it completes";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EodPricePoint {
    pub date: chrono::NaiveDate,
    pub close: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockData {
    pub ticker: String,
    pub last_close: Option<f64>,
    pub currency: String,
    pub history: Vec<EodPricePoint>,
    pub stale: bool,
}

/// Wrapper returned from `GET /api/market/stocks/{ticker}?force_refresh=true`
/// — the bare `StockData` is returned without the flag.
#[derive(Debug, Clone, Serialize)]
pub struct StockDataWithAdvisory {
    pub data: StockData,
    pub advisory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FilingDocument {
    pub ticker: String,
    pub document_key: String,
    pub title: String,
    pub filed_at: chrono::DateTime<chrono::Utc>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub ticker: String,
    pub headline: String,
    pub url: String,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanFieldsResponse {
    pub fields: Vec<&'static str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenRequest {
    pub mode: String,
    #[serde(default)]
    pub criteria: serde_json::Value,
}
