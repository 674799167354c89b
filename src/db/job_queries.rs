use sqlx::PgPool;

use crate::models::{JobRow, JobType, NewJob};

pub async fn upsert(pool: &PgPool, job: &NewJob) -> Result<JobRow, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        "INSERT INTO jobs (id, job_type, ticker, priority, status, attempts, max_attempts, payload)
         VALUES ($1, $2, $3, $4, 'pending', 0, $5, $6)
         ON CONFLICT (id) DO UPDATE SET
            job_type = EXCLUDED.job_type,
            ticker = EXCLUDED.ticker,
            priority = EXCLUDED.priority,
            status = 'pending',
            started_at = NULL,
            max_attempts = EXCLUDED.max_attempts,
            payload = EXCLUDED.payload
         RETURNING id, job_type, ticker, priority, status, created_at, started_at, attempts, max_attempts, error, payload",
    )
    .bind(&job.id)
    .bind(job.job_type.as_str())
    .bind(&job.ticker)
    .bind(job.priority)
    .bind(job.max_attempts)
    .bind(&job.payload)
    .fetch_one(pool)
    .await
}

/// Atomically takes the highest-priority pending job and transitions it to
/// `running`, linearizable over `(priority desc, created_at asc)` via
/// `FOR UPDATE SKIP LOCKED` so concurrent workers never race on the same row.
pub async fn dequeue(pool: &PgPool) -> Result<Option<JobRow>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let candidate = sqlx::query_as::<_, JobRow>(
        "SELECT id, job_type, ticker, priority, status, created_at, started_at, attempts, max_attempts, error, payload
         FROM jobs
         WHERE status = 'pending'
         ORDER BY priority DESC, created_at ASC
         LIMIT 1
         FOR UPDATE SKIP LOCKED",
    )
    .fetch_optional(&mut *tx)
    .await?;

    let Some(candidate) = candidate else {
        tx.commit().await?;
        return Ok(None);
    };

    let updated = sqlx::query_as::<_, JobRow>(
        "UPDATE jobs SET status = 'running', started_at = now(), attempts = attempts + 1
         WHERE id = $1
         RETURNING id, job_type, ticker, priority, status, created_at, started_at, attempts, max_attempts, error, payload",
    )
    .bind(&candidate.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(updated))
}

pub async fn complete(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE jobs SET status = 'completed', error = NULL WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Terminal failure or retry, decided by the caller comparing `attempts` to
/// `max_attempts`. `terminal = true` transitions to `failed` permanently;
/// otherwise the job re-enters `pending` with `attempts` preserved.
pub async fn fail(pool: &PgPool, id: &str, error: &str, terminal: bool) -> Result<(), sqlx::Error> {
    if terminal {
        sqlx::query("UPDATE jobs SET status = 'failed', error = $2 WHERE id = $1")
            .bind(id)
            .bind(error)
            .execute(pool)
            .await?;
    } else {
        sqlx::query(
            "UPDATE jobs SET status = 'pending', started_at = NULL, error = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
    }
    Ok(())
}

pub async fn list_all(pool: &PgPool, limit: i64) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        "SELECT id, job_type, ticker, priority, status, created_at, started_at, attempts, max_attempts, error, payload
         FROM jobs ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Startup recovery: resets every `running` row to `pending` and clears
/// `started_at`. Does not touch `pending`/`completed`/`failed`/`cancelled`
/// rows. Tolerant of an empty queue.
pub async fn reset_running_jobs(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE jobs SET status = 'pending', started_at = NULL WHERE status = 'running'",
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn has_recent_job(
    pool: &PgPool,
    job_type: JobType,
    ticker: &str,
    since: chrono::DateTime<chrono::Utc>,
) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS(
            SELECT 1 FROM jobs
            WHERE job_type = $1 AND ticker = $2 AND created_at > $3
              AND status IN ('pending', 'running', 'completed')
        )",
    )
    .bind(job_type.as_str())
    .bind(ticker)
    .bind(since)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}
