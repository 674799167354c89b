use std::collections::BTreeMap;

use crate::db::cash_queries;
use crate::errors::AppError;
use crate::models::{CrossSignal, IndicatorsResponse, RsiSignal, TimelinePoint, Trend};
use crate::services::indicators;

/// Builds the daily capital timeline for a portfolio: one point per distinct
/// transaction date (same-day transactions aggregated), plus today if it
/// isn't already the last ledger date. Capital fields are omitted entirely
/// when the ledger is empty.
pub async fn build_timeline(
    pool: &sqlx::PgPool,
    portfolio_name: &str,
    total_value_holdings: f64,
    external_balance_total: f64,
    holding_count: usize,
) -> Result<Vec<TimelinePoint>, AppError> {
    let transactions = cash_queries::fetch_transactions(pool, portfolio_name)
        .await
        .map_err(AppError::from)?;

    let value = total_value_holdings + external_balance_total;

    if transactions.is_empty() {
        return Ok(vec![TimelinePoint {
            date: chrono::Utc::now().date_naive(),
            value,
            cost: 0.0,
            net_return: value,
            net_return_pct: 0.0,
            holding_count,
            cash_balance: None,
            external_balance: None,
            total_capital: None,
            net_deployed: None,
        }]);
    }

    let mut by_date: BTreeMap<chrono::NaiveDate, Vec<&crate::models::CashTransaction>> =
        BTreeMap::new();
    for txn in &transactions {
        by_date.entry(txn.date).or_default().push(txn);
    }

    let mut points = Vec::with_capacity(by_date.len());
    let mut cash_balance = 0.0;
    let mut net_deployed = 0.0;

    for (date, day_txns) in &by_date {
        for txn in day_txns {
            cash_balance += txn.amount;
            if txn.category == "contribution" {
                if txn.amount > 0.0 {
                    net_deployed += txn.amount;
                } else {
                    net_deployed -= txn.amount.abs();
                }
            }
        }

        let total_capital = value + cash_balance;
        let cost = net_deployed;
        let net_return = total_capital - cost;
        let net_return_pct = if cost != 0.0 { net_return / cost * 100.0 } else { 0.0 };

        points.push(TimelinePoint {
            date: *date,
            value,
            cost,
            net_return,
            net_return_pct,
            holding_count,
            cash_balance: Some(cash_balance),
            external_balance: Some(external_balance_total),
            total_capital: Some(total_capital),
            net_deployed: Some(net_deployed),
        });
    }

    if let Some(last) = points.last_mut() {
        last.value = value;
        last.total_capital = Some(value + last.cash_balance.unwrap_or(0.0));
    }

    Ok(points)
}

pub fn compute_indicators(
    portfolio_name: &str,
    history: &[f64],
    current_value: f64,
    time_series: Option<Vec<TimelinePoint>>,
) -> IndicatorsResponse {
    let ema_20 = last_value(&indicators::ema(history, 20));
    let ema_50 = last_value(&indicators::ema(history, 50));
    let ema_200 = last_value(&indicators::ema(history, 200));
    let rsi_values = indicators::rsi(history, 14);
    let rsi = last_value(&rsi_values);

    let rsi_signal = match rsi {
        Some(v) if v >= 70.0 => RsiSignal::Overbought,
        Some(v) if v <= 30.0 => RsiSignal::Oversold,
        _ => RsiSignal::Neutral,
    };

    let ema_50_cross_200 = match (ema_50, ema_200) {
        (Some(a), Some(b)) if a > b => CrossSignal::GoldenCross,
        (Some(a), Some(b)) if a < b => CrossSignal::DeathCross,
        _ => CrossSignal::None,
    };

    let (trend, trend_description) = match ema_50_cross_200 {
        CrossSignal::GoldenCross => (Trend::Bullish, "50-day EMA above 200-day EMA".to_string()),
        CrossSignal::DeathCross => (Trend::Bearish, "50-day EMA below 200-day EMA".to_string()),
        CrossSignal::None => (Trend::Neutral, "no clear moving-average trend".to_string()),
    };

    IndicatorsResponse {
        portfolio_name: portfolio_name.to_string(),
        data_points: history.len(),
        current_value,
        ema_20,
        ema_50,
        ema_200,
        above_ema_20: ema_20.map(|v| current_value > v).unwrap_or(false),
        above_ema_50: ema_50.map(|v| current_value > v).unwrap_or(false),
        above_ema_200: ema_200.map(|v| current_value > v).unwrap_or(false),
        rsi,
        rsi_signal,
        ema_50_cross_200,
        trend,
        trend_description,
        time_series,
    }
}

fn last_value(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().find_map(|v| *v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising_series(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    fn falling_series(n: usize) -> Vec<f64> {
        (0..n).map(|i| 500.0 - i as f64).collect()
    }

    #[test]
    fn golden_cross_is_bullish() {
        let history = rising_series(250);
        let result = compute_indicators("growth", &history, *history.last().unwrap(), None);
        assert_eq!(result.ema_50_cross_200, CrossSignal::GoldenCross);
        assert_eq!(result.trend, Trend::Bullish);
    }

    #[test]
    fn death_cross_is_bearish() {
        let history = falling_series(250);
        let result = compute_indicators("decline", &history, *history.last().unwrap(), None);
        assert_eq!(result.ema_50_cross_200, CrossSignal::DeathCross);
        assert_eq!(result.trend, Trend::Bearish);
    }

    #[test]
    fn too_short_a_history_has_no_cross() {
        let history = rising_series(10);
        let result = compute_indicators("new", &history, *history.last().unwrap(), None);
        assert_eq!(result.ema_50_cross_200, CrossSignal::None);
        assert_eq!(result.trend, Trend::Neutral);
        assert_eq!(result.ema_50, None);
    }

    #[test]
    fn rsi_signal_follows_overbought_oversold_thresholds() {
        let overbought = compute_indicators("hot", &rising_series(60), 200.0, None);
        assert_eq!(overbought.rsi_signal, RsiSignal::Overbought);

        let oversold = compute_indicators("cold", &falling_series(60), 100.0, None);
        assert_eq!(oversold.rsi_signal, RsiSignal::Oversold);
    }

    #[test]
    fn above_ema_flags_compare_current_value_to_each_band() {
        let history = rising_series(250);
        let last = *history.last().unwrap();
        let result = compute_indicators("growth", &history, last + 50.0, None);
        assert!(result.above_ema_20);
        assert!(result.above_ema_50);
        assert!(result.above_ema_200);
    }
}
