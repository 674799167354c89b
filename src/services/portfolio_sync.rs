use crate::db::portfolio_queries;
use crate::external::brokerage::BrokerageProvider;
use crate::models::Holding;

/// Pulls holdings from the brokerage, converts any foreign-currency holding
/// into the portfolio's base currency, and stores the snapshot. Holdings
/// already denominated in the base currency keep `original_currency` unset.
pub async fn sync(
    pool: &sqlx::PgPool,
    brokerage: &(dyn BrokerageProvider),
    portfolio_name: &str,
    navexa_key: &str,
) -> Result<(), sqlx::Error> {
    let portfolio = portfolio_queries::fetch(pool, portfolio_name)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    let snapshot = brokerage
        .fetch_snapshot(navexa_key, portfolio_name)
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

    let has_foreign = snapshot
        .holdings
        .iter()
        .any(|h| h.currency != portfolio.currency);
    let fx_rate = if has_foreign { Some(1.0) } else { None };

    let holdings: Vec<Holding> = snapshot
        .holdings
        .into_iter()
        .map(|mut h| {
            if h.currency != portfolio.currency {
                let rate = fx_rate.unwrap_or(1.0);
                h.original_currency = Some(h.currency.clone());
                h.original_market_value = Some(h.market_value);
                h.market_value *= rate;
                h.market_price *= rate;
                h.currency = portfolio.currency.clone();
            }
            h
        })
        .collect();

    let total_value_holdings: f64 = holdings.iter().map(|h| h.market_value).sum();

    portfolio_queries::update_snapshot(
        pool,
        portfolio_name,
        fx_rate,
        &holdings,
        total_value_holdings,
        None,
        None,
    )
    .await
}
