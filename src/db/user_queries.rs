use sqlx::PgPool;

use crate::models::User;

pub async fn fetch_by_id(pool: &PgPool, user_id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT user_id, email, name, provider, role, password_hash, navexa_key, created_at, modified_at
         FROM users WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT user_id, email, name, provider, role, password_hash, navexa_key, created_at, modified_at
         FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT user_id, email, name, provider, role, password_hash, navexa_key, created_at, modified_at
         FROM users ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn insert(pool: &PgPool, user: &User) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (user_id, email, name, provider, role, password_hash, navexa_key, created_at, modified_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING user_id, email, name, provider, role, password_hash, navexa_key, created_at, modified_at",
    )
    .bind(&user.user_id)
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.provider)
    .bind(&user.role)
    .bind(&user.password_hash)
    .bind(&user.navexa_key)
    .bind(user.created_at)
    .bind(user.modified_at)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    user_id: &str,
    name: Option<&str>,
    email: Option<&str>,
    navexa_key: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET
            name = COALESCE($2, name),
            email = COALESCE($3, email),
            navexa_key = COALESCE($4, navexa_key),
            modified_at = now()
         WHERE user_id = $1
         RETURNING user_id, email, name, provider, role, password_hash, navexa_key, created_at, modified_at",
    )
    .bind(user_id)
    .bind(name)
    .bind(email)
    .bind(navexa_key)
    .fetch_optional(pool)
    .await
}

pub async fn update_role(
    pool: &PgPool,
    user_id: &str,
    role: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET role = $2, modified_at = now()
         WHERE user_id = $1
         RETURNING user_id, email, name, provider, role, password_hash, navexa_key, created_at, modified_at",
    )
    .bind(user_id)
    .bind(role)
    .fetch_optional(pool)
    .await
}

/// Touches `modified_at` without changing anything else — used by idempotent
/// service re-registration.
pub async fn touch(pool: &PgPool, user_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET modified_at = now() WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, user_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn exists_by_name(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE name = $1)")
            .bind(name)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

/// Service users whose `modified_at` is older than `stale_before` are
/// eligible for the tidy purge.
pub async fn purge_stale_service_users(
    pool: &PgPool,
    stale_before: chrono::DateTime<chrono::Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM users WHERE role = 'service' AND modified_at < $1",
    )
    .bind(stale_before)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn count_service_users(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'service'")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
