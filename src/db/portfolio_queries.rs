use sqlx::{PgPool, Row};

use crate::models::{ExternalBalance, Holding, Portfolio};

pub async fn fetch(pool: &PgPool, name: &str) -> Result<Option<Portfolio>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT name, owner_user_id, currency, fx_rate, last_synced, data_version, holdings,
                total_value_holdings, external_balance_total, yesterday_total, last_week_total
         FROM portfolios WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(portfolio_from_row))
}

pub async fn fetch_all_for_owner(
    pool: &PgPool,
    owner_user_id: &str,
) -> Result<Vec<Portfolio>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT name, owner_user_id, currency, fx_rate, last_synced, data_version, holdings,
                total_value_holdings, external_balance_total, yesterday_total, last_week_total
         FROM portfolios WHERE owner_user_id = $1 ORDER BY name ASC",
    )
    .bind(owner_user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(portfolio_from_row).collect())
}

fn portfolio_from_row(row: sqlx::postgres::PgRow) -> Portfolio {
    let holdings_json: serde_json::Value = row.get("holdings");
    let holdings: Vec<Holding> = serde_json::from_value(holdings_json).unwrap_or_default();
    let total_value_holdings: f64 = row.get("total_value_holdings");
    let external_balance_total: f64 = row.get("external_balance_total");
    Portfolio {
        name: row.get("name"),
        currency: row.get("currency"),
        fx_rate: row.get("fx_rate"),
        last_synced: row.get("last_synced"),
        data_version: row.get("data_version"),
        holdings,
        total_value_holdings,
        external_balance_total,
        total_value: total_value_holdings + external_balance_total,
        total_cash: None,
        yesterday_total: row.get("yesterday_total"),
        last_week_total: row.get("last_week_total"),
        yesterday_net_flow: None,
        last_week_net_flow: None,
        capital_performance: None,
        time_series: None,
    }
}

pub async fn upsert(
    pool: &PgPool,
    name: &str,
    owner_user_id: &str,
    currency: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO portfolios (name, owner_user_id, currency, data_version, holdings)
         VALUES ($1, $2, $3, 1, '[]'::jsonb)
         ON CONFLICT (name) DO UPDATE SET currency = EXCLUDED.currency",
    )
    .bind(name)
    .bind(owner_user_id)
    .bind(currency)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_snapshot(
    pool: &PgPool,
    name: &str,
    fx_rate: Option<f64>,
    holdings: &[Holding],
    total_value_holdings: f64,
    yesterday_total: Option<f64>,
    last_week_total: Option<f64>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE portfolios SET
            fx_rate = $2,
            holdings = $3,
            total_value_holdings = $4,
            last_synced = now(),
            data_version = data_version + 1,
            yesterday_total = COALESCE($5, yesterday_total),
            last_week_total = COALESCE($6, last_week_total)
         WHERE name = $1",
    )
    .bind(name)
    .bind(fx_rate)
    .bind(serde_json::to_value(holdings).unwrap_or_default())
    .bind(total_value_holdings)
    .bind(yesterday_total)
    .bind(last_week_total)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, name: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM portfolios WHERE name = $1")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn fetch_external_balances(
    pool: &PgPool,
    portfolio_name: &str,
) -> Result<Vec<ExternalBalance>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT balance_type, label, value, rate FROM external_balances
         WHERE portfolio_name = $1 ORDER BY created_at ASC",
    )
    .bind(portfolio_name)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ExternalBalance {
            balance_type: row.get("balance_type"),
            label: row.get("label"),
            value: row.get("value"),
            rate: row.get("rate"),
        })
        .collect())
}

pub async fn replace_external_balances(
    pool: &PgPool,
    portfolio_name: &str,
    balances: &[ExternalBalance],
) -> Result<f64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM external_balances WHERE portfolio_name = $1")
        .bind(portfolio_name)
        .execute(&mut *tx)
        .await?;

    let mut total = 0.0;
    for balance in balances {
        sqlx::query(
            "INSERT INTO external_balances (id, portfolio_name, balance_type, label, value, rate)
             VALUES (gen_random_uuid(), $1, $2, $3, $4, $5)",
        )
        .bind(portfolio_name)
        .bind(&balance.balance_type)
        .bind(&balance.label)
        .bind(balance.value)
        .bind(balance.rate)
        .execute(&mut *tx)
        .await?;
        total += balance.value;
    }

    sqlx::query("UPDATE portfolios SET external_balance_total = $2 WHERE name = $1")
        .bind(portfolio_name)
        .bind(total)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(total)
}

pub async fn fetch_brokerage_trades(
    pool: &PgPool,
    portfolio_name: &str,
) -> Result<Vec<(chrono::DateTime<chrono::Utc>, String, f64, f64)>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT executed_at, side, quantity, price FROM brokerage_trades
         WHERE portfolio_name = $1 ORDER BY executed_at ASC",
    )
    .bind(portfolio_name)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.get("executed_at"),
                row.get("side"),
                row.get("quantity"),
                row.get("price"),
            )
        })
        .collect())
}
