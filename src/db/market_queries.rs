use sqlx::PgPool;

use crate::models::{EodPricePoint, FilingDocument};

pub async fn fetch_eod_history(
    pool: &PgPool,
    ticker: &str,
    since: chrono::NaiveDate,
) -> Result<Vec<EodPricePoint>, sqlx::Error> {
    sqlx::query_as::<_, EodPricePoint>(
        "SELECT date, close FROM eod_prices WHERE ticker = $1 AND date >= $2 ORDER BY date ASC",
    )
    .bind(ticker)
    .bind(since)
    .fetch_all(pool)
    .await
}

pub async fn fetch_last_fetched_at(
    pool: &PgPool,
    ticker: &str,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, sqlx::Error> {
    let row: Option<(chrono::DateTime<chrono::Utc>,)> = sqlx::query_as(
        "SELECT fetched_at FROM eod_prices WHERE ticker = $1 ORDER BY date DESC LIMIT 1",
    )
    .bind(ticker)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| r.0))
}

pub async fn upsert_eod_point(
    pool: &PgPool,
    ticker: &str,
    date: chrono::NaiveDate,
    close: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO eod_prices (ticker, date, close, fetched_at)
         VALUES ($1, $2, $3, now())
         ON CONFLICT (ticker, date) DO UPDATE SET close = EXCLUDED.close, fetched_at = now()",
    )
    .bind(ticker)
    .bind(date)
    .bind(close)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_filing(
    pool: &PgPool,
    ticker: &str,
    document_key: &str,
) -> Result<Option<FilingDocument>, sqlx::Error> {
    sqlx::query_as::<_, FilingDocument>(
        "SELECT ticker, document_key, title, filed_at, content
         FROM filing_documents WHERE ticker = $1 AND document_key = $2",
    )
    .bind(ticker)
    .bind(document_key)
    .fetch_optional(pool)
    .await
}

pub async fn upsert_filing(pool: &PgPool, filing: &FilingDocument) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO filing_documents (ticker, document_key, title, filed_at, content)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (ticker, document_key) DO UPDATE SET
            title = EXCLUDED.title, filed_at = EXCLUDED.filed_at, content = EXCLUDED.content,
            fetched_at = now()",
    )
    .bind(&filing.ticker)
    .bind(&filing.document_key)
    .bind(&filing.title)
    .bind(filing.filed_at)
    .bind(&filing.content)
    .execute(pool)
    .await?;
    Ok(())
}
