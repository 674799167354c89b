use sqlx::PgPool;

use crate::models::{CashAccount, CashTransaction};

pub async fn fetch_transactions(
    pool: &PgPool,
    portfolio_name: &str,
) -> Result<Vec<CashTransaction>, sqlx::Error> {
    sqlx::query_as::<_, CashTransaction>(
        "SELECT id, portfolio_name, account, category, date, amount, description, notes, linked_id, created_at
         FROM cash_transactions WHERE portfolio_name = $1 ORDER BY date ASC, created_at ASC",
    )
    .bind(portfolio_name)
    .fetch_all(pool)
    .await
}

pub async fn insert_transaction(
    pool: &PgPool,
    txn: &CashTransaction,
) -> Result<CashTransaction, sqlx::Error> {
    sqlx::query_as::<_, CashTransaction>(
        "INSERT INTO cash_transactions (id, portfolio_name, account, category, date, amount, description, notes, linked_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING id, portfolio_name, account, category, date, amount, description, notes, linked_id, created_at",
    )
    .bind(&txn.id)
    .bind(&txn.portfolio_name)
    .bind(&txn.account)
    .bind(&txn.category)
    .bind(txn.date)
    .bind(txn.amount)
    .bind(&txn.description)
    .bind(&txn.notes)
    .bind(&txn.linked_id)
    .fetch_one(pool)
    .await
}

/// Wholesale replace of a portfolio's ledger and notes inside one
/// transaction, used by `PUT .../cash-ledger`.
pub async fn replace_all(
    pool: &PgPool,
    portfolio_name: &str,
    transactions: &[CashTransaction],
    notes: Option<&str>,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM cash_transactions WHERE portfolio_name = $1")
        .bind(portfolio_name)
        .execute(&mut *tx)
        .await?;

    for txn in transactions {
        sqlx::query(
            "INSERT INTO cash_transactions (id, portfolio_name, account, category, date, amount, description, notes, linked_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&txn.id)
        .bind(portfolio_name)
        .bind(&txn.account)
        .bind(&txn.category)
        .bind(txn.date)
        .bind(txn.amount)
        .bind(&txn.description)
        .bind(&txn.notes)
        .bind(&txn.linked_id)
        .execute(&mut *tx)
        .await?;
    }

    if let Some(notes) = notes {
        sqlx::query(
            "INSERT INTO cash_ledger_notes (portfolio_name, notes) VALUES ($1, $2)
             ON CONFLICT (portfolio_name) DO UPDATE SET notes = EXCLUDED.notes",
        )
        .bind(portfolio_name)
        .bind(notes)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn fetch_transaction(
    pool: &PgPool,
    portfolio_name: &str,
    id: &str,
) -> Result<Option<CashTransaction>, sqlx::Error> {
    sqlx::query_as::<_, CashTransaction>(
        "SELECT id, portfolio_name, account, category, date, amount, description, notes, linked_id, created_at
         FROM cash_transactions WHERE portfolio_name = $1 AND id = $2",
    )
    .bind(portfolio_name)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Updates an existing transaction in place, preserving its id and
/// `created_at`. Returns `None` if no row matched.
pub async fn update_transaction(
    pool: &PgPool,
    portfolio_name: &str,
    id: &str,
    account: &str,
    category: &str,
    date: chrono::NaiveDate,
    amount: f64,
    description: &str,
    notes: Option<&str>,
) -> Result<Option<CashTransaction>, sqlx::Error> {
    sqlx::query_as::<_, CashTransaction>(
        "UPDATE cash_transactions
         SET account = $3, category = $4, date = $5, amount = $6, description = $7, notes = $8
         WHERE portfolio_name = $1 AND id = $2
         RETURNING id, portfolio_name, account, category, date, amount, description, notes, linked_id, created_at",
    )
    .bind(portfolio_name)
    .bind(id)
    .bind(account)
    .bind(category)
    .bind(date)
    .bind(amount)
    .bind(description)
    .bind(notes)
    .fetch_optional(pool)
    .await
}

pub async fn delete_transaction(
    pool: &PgPool,
    portfolio_name: &str,
    id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cash_transactions WHERE portfolio_name = $1 AND id = $2")
        .bind(portfolio_name)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn fetch_notes(pool: &PgPool, portfolio_name: &str) -> Result<String, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT notes FROM cash_ledger_notes WHERE portfolio_name = $1")
            .bind(portfolio_name)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|r| r.0).unwrap_or_default())
}

pub async fn fetch_accounts(
    pool: &PgPool,
    portfolio_name: &str,
) -> Result<Vec<CashAccount>, sqlx::Error> {
    sqlx::query_as::<_, CashAccount>(
        "SELECT portfolio_name, name, account_type, is_transactional, currency
         FROM cash_accounts WHERE portfolio_name = $1 ORDER BY name ASC",
    )
    .bind(portfolio_name)
    .fetch_all(pool)
    .await
}

pub async fn upsert_account(
    pool: &PgPool,
    portfolio_name: &str,
    name: &str,
    account_type: &str,
    is_transactional: bool,
    currency: &str,
) -> Result<CashAccount, sqlx::Error> {
    sqlx::query_as::<_, CashAccount>(
        "INSERT INTO cash_accounts (portfolio_name, name, account_type, is_transactional, currency)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (portfolio_name, name) DO UPDATE SET
            account_type = EXCLUDED.account_type,
            is_transactional = EXCLUDED.is_transactional,
            currency = EXCLUDED.currency
         RETURNING portfolio_name, name, account_type, is_transactional, currency",
    )
    .bind(portfolio_name)
    .bind(name)
    .bind(account_type)
    .bind(is_transactional)
    .bind(currency)
    .fetch_one(pool)
    .await
}
