use sqlx::PgPool;
use std::collections::HashMap;

use crate::models::Feedback;

pub struct FeedbackFilter<'a> {
    pub category: Option<&'a str>,
    pub severity: Option<&'a str>,
    pub ticker: Option<&'a str>,
    pub session_id: Option<&'a str>,
}

pub async fn list(
    pool: &PgPool,
    filter: &FeedbackFilter<'_>,
    sort_desc: bool,
    page: usize,
    per_page: usize,
) -> Result<(Vec<Feedback>, i64), sqlx::Error> {
    let order = if sort_desc { "DESC" } else { "ASC" };
    let offset = ((page.max(1) - 1) * per_page) as i64;
    let limit = per_page as i64;

    let rows = sqlx::query_as::<_, Feedback>(&format!(
        "SELECT id, category, severity, status, description, ticker, portfolio_name, session_id,
                client_type, tool_name, observed_value, expected_value, resolution_notes,
                user_id, user_name, user_email, created_at, updated_at
         FROM feedback
         WHERE ($1::text IS NULL OR category = $1)
           AND ($2::text IS NULL OR severity = $2)
           AND ($3::text IS NULL OR ticker = $3)
           AND ($4::text IS NULL OR session_id = $4)
         ORDER BY created_at {order}
         LIMIT $5 OFFSET $6"
    ))
    .bind(filter.category)
    .bind(filter.severity)
    .bind(filter.ticker)
    .bind(filter.session_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM feedback
         WHERE ($1::text IS NULL OR category = $1)
           AND ($2::text IS NULL OR severity = $2)
           AND ($3::text IS NULL OR ticker = $3)
           AND ($4::text IS NULL OR session_id = $4)",
    )
    .bind(filter.category)
    .bind(filter.severity)
    .bind(filter.ticker)
    .bind(filter.session_id)
    .fetch_one(pool)
    .await?;

    Ok((rows, total.0))
}

pub async fn fetch(pool: &PgPool, id: &str) -> Result<Option<Feedback>, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(
        "SELECT id, category, severity, status, description, ticker, portfolio_name, session_id,
                client_type, tool_name, observed_value, expected_value, resolution_notes,
                user_id, user_name, user_email, created_at, updated_at
         FROM feedback WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn insert(pool: &PgPool, f: &Feedback) -> Result<Feedback, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(
        "INSERT INTO feedback
            (id, category, severity, status, description, ticker, portfolio_name, session_id,
             client_type, tool_name, observed_value, expected_value, resolution_notes,
             user_id, user_name, user_email)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
         RETURNING id, category, severity, status, description, ticker, portfolio_name, session_id,
                   client_type, tool_name, observed_value, expected_value, resolution_notes,
                   user_id, user_name, user_email, created_at, updated_at",
    )
    .bind(&f.id)
    .bind(&f.category)
    .bind(&f.severity)
    .bind(&f.status)
    .bind(&f.description)
    .bind(&f.ticker)
    .bind(&f.portfolio_name)
    .bind(&f.session_id)
    .bind(&f.client_type)
    .bind(&f.tool_name)
    .bind(&f.observed_value)
    .bind(&f.expected_value)
    .bind(&f.resolution_notes)
    .bind(&f.user_id)
    .bind(&f.user_name)
    .bind(&f.user_email)
    .fetch_one(pool)
    .await
}

pub async fn update_status(
    pool: &PgPool,
    id: &str,
    status: &str,
    resolution_notes: Option<&str>,
) -> Result<Option<Feedback>, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(
        "UPDATE feedback SET status = $2, resolution_notes = COALESCE($3, resolution_notes), updated_at = now()
         WHERE id = $1
         RETURNING id, category, severity, status, description, ticker, portfolio_name, session_id,
                   client_type, tool_name, observed_value, expected_value, resolution_notes,
                   user_id, user_name, user_email, created_at, updated_at",
    )
    .bind(id)
    .bind(status)
    .bind(resolution_notes)
    .fetch_optional(pool)
    .await
}

pub async fn bulk_update_status(
    pool: &PgPool,
    ids: &[String],
    status: &str,
    resolution_notes: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE feedback SET status = $2, resolution_notes = COALESCE($3, resolution_notes), updated_at = now()
         WHERE id = ANY($1)",
    )
    .bind(ids)
    .bind(status)
    .bind(resolution_notes)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM feedback WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub struct SummaryRow {
    pub total: i64,
    pub by_status: HashMap<String, i64>,
    pub by_severity: HashMap<String, i64>,
    pub by_category: HashMap<String, i64>,
    pub oldest_unresolved: Option<chrono::DateTime<chrono::Utc>>,
}

pub async fn summary(pool: &PgPool) -> Result<SummaryRow, sqlx::Error> {
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM feedback")
        .fetch_one(pool)
        .await?;

    let by_status: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM feedback GROUP BY status")
            .fetch_all(pool)
            .await?;
    let by_severity: Vec<(String, i64)> =
        sqlx::query_as("SELECT severity, COUNT(*) FROM feedback GROUP BY severity")
            .fetch_all(pool)
            .await?;
    let by_category: Vec<(String, i64)> =
        sqlx::query_as("SELECT category, COUNT(*) FROM feedback GROUP BY category")
            .fetch_all(pool)
            .await?;

    let oldest_unresolved: Option<(chrono::DateTime<chrono::Utc>,)> = sqlx::query_as(
        "SELECT created_at FROM feedback WHERE status NOT IN ('resolved', 'dismissed')
         ORDER BY created_at ASC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(SummaryRow {
        total: total.0,
        by_status: by_status.into_iter().collect(),
        by_severity: by_severity.into_iter().collect(),
        by_category: by_category.into_iter().collect(),
        oldest_unresolved: oldest_unresolved.map(|r| r.0),
    })
}
