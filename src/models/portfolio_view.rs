use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub quantity: f64,
    pub average_cost: f64,
    pub market_price: f64,
    pub market_value: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_market_value: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalBalance {
    #[serde(rename = "type")]
    pub balance_type: String,
    pub label: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalBalanceInput {
    #[serde(rename = "type")]
    pub balance_type: String,
    pub label: String,
    pub value: f64,
    #[serde(default)]
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Portfolio {
    pub name: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fx_rate: Option<f64>,
    pub last_synced: Option<chrono::DateTime<chrono::Utc>>,
    pub data_version: i32,
    pub holdings: Vec<Holding>,
    pub total_value_holdings: f64,
    pub external_balance_total: f64,
    pub total_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cash: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yesterday_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_week_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yesterday_net_flow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_week_net_flow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capital_performance: Option<crate::models::cash::CapitalPerformance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_series: Option<Vec<crate::models::analytics::TimelinePoint>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertPortfolio {
    pub currency: Option<String>,
}
