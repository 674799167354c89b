use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: chrono::NaiveDate,
    pub value: f64,
    pub cost: f64,
    pub net_return: f64,
    pub net_return_pct: f64,
    pub holding_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_capital: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_deployed: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiSignal {
    Overbought,
    Neutral,
    Oversold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossSignal {
    GoldenCross,
    DeathCross,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorsResponse {
    pub portfolio_name: String,
    pub data_points: usize,
    pub current_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema_20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema_50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema_200: Option<f64>,
    pub above_ema_20: bool,
    pub above_ema_50: bool,
    pub above_ema_200: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    pub rsi_signal: RsiSignal,
    pub ema_50_cross_200: CrossSignal,
    pub trend: Trend,
    pub trend_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_series: Option<Vec<TimelinePoint>>,
}
