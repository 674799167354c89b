use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{AuthorizationCode, OAuthClient, RefreshTokenRow};

pub async fn insert_client(
    pool: &PgPool,
    client_id: &str,
    client_secret: &str,
    client_name: &str,
    redirect_uris: &[String],
) -> Result<OAuthClient, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO oauth_clients (client_id, client_secret, client_name, redirect_uris)
         VALUES ($1, $2, $3, $4)
         RETURNING client_id, client_secret, client_name, redirect_uris, created_at",
    )
    .bind(client_id)
    .bind(client_secret)
    .bind(client_name)
    .bind(serde_json::to_value(redirect_uris).unwrap())
    .fetch_one(pool)
    .await?;

    Ok(client_from_row(row))
}

pub async fn fetch_client(pool: &PgPool, client_id: &str) -> Result<Option<OAuthClient>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT client_id, client_secret, client_name, redirect_uris, created_at
         FROM oauth_clients WHERE client_id = $1",
    )
    .bind(client_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(client_from_row))
}

fn client_from_row(row: sqlx::postgres::PgRow) -> OAuthClient {
    let redirect_uris_json: serde_json::Value = row.get("redirect_uris");
    let redirect_uris: Vec<String> = serde_json::from_value(redirect_uris_json).unwrap_or_default();
    OAuthClient {
        client_id: row.get("client_id"),
        client_secret: row.get("client_secret"),
        client_name: row.get("client_name"),
        redirect_uris,
        created_at: row.get("created_at"),
    }
}

pub async fn insert_code(
    pool: &PgPool,
    code: &AuthorizationCode,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO oauth_codes
            (code, client_id, redirect_uri, user_id, code_challenge, code_challenge_method, scope, state, created_at, expires_at, used)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(&code.code)
    .bind(&code.client_id)
    .bind(&code.redirect_uri)
    .bind(&code.user_id)
    .bind(&code.code_challenge)
    .bind(&code.code_challenge_method)
    .bind(&code.scope)
    .bind(&code.state)
    .bind(code.created_at)
    .bind(code.expires_at)
    .bind(code.used)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_code(pool: &PgPool, code: &str) -> Result<Option<AuthorizationCode>, sqlx::Error> {
    sqlx::query_as::<_, AuthorizationCode>(
        "SELECT code, client_id, redirect_uri, user_id, code_challenge, code_challenge_method, scope, state, created_at, expires_at, used
         FROM oauth_codes WHERE code = $1",
    )
    .bind(code)
    .fetch_optional(pool)
    .await
}

/// Marks a code used only if it is currently unused — an atomic
/// single-redemption guard. Returns true if this call won the race.
pub async fn mark_code_used(pool: &PgPool, code: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE oauth_codes SET used = true WHERE code = $1 AND used = false",
    )
    .bind(code)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn insert_refresh_token(
    pool: &PgPool,
    token: &str,
    client_id: &str,
    user_id: &str,
    chain_id: Uuid,
    expires_at: chrono::DateTime<chrono::Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO refresh_tokens (token, client_id, user_id, chain_id, expires_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(token)
    .bind(client_id)
    .bind(user_id)
    .bind(chain_id)
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_refresh_token(
    pool: &PgPool,
    token: &str,
) -> Result<Option<RefreshTokenRow>, sqlx::Error> {
    sqlx::query_as::<_, RefreshTokenRow>(
        "SELECT token, client_id, user_id, chain_id, created_at, expires_at, revoked
         FROM refresh_tokens WHERE token = $1",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}

/// Atomically revokes a refresh token only if it wasn't already revoked —
/// the guard that makes rotation race-free under concurrent refresh calls.
pub async fn revoke_refresh_token_if_live(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE refresh_tokens SET revoked = true WHERE token = $1 AND revoked = false",
    )
    .bind(token)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}
