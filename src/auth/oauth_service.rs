use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{jwt, pkce};
use crate::db::{oauth_queries, user_queries};
use crate::errors::AppError;
use crate::models::oauth::{AuthorizationCode, OAuthClient, RefreshTokenRow};

const CLIENT_ID_LEN: usize = 24;
const CLIENT_SECRET_LEN: usize = 48;
const CODE_LEN: usize = 32;
const TOKEN_LEN: usize = 48;

fn random_token(len: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..len)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

pub async fn register_client(
    pool: &PgPool,
    client_name: &str,
    redirect_uris: &[String],
) -> Result<OAuthClient, AppError> {
    let client_id = format!("client_{}", random_token(CLIENT_ID_LEN));
    let client_secret = random_token(CLIENT_SECRET_LEN);
    oauth_queries::insert_client(pool, &client_id, &client_secret, client_name, redirect_uris)
        .await
        .map_err(AppError::from)
}

pub struct AuthorizeOutcome {
    pub redirect_uri: String,
    pub code: Option<String>,
    pub state: String,
    pub denied: bool,
}

#[allow(clippy::too_many_arguments)]
pub async fn authorize(
    pool: &PgPool,
    client_id: &str,
    redirect_uri: &str,
    code_challenge: &str,
    code_challenge_method: &str,
    scope: Option<&str>,
    state: &str,
    user_id: &str,
    auth_code_ttl_secs: i64,
) -> Result<AuthorizeOutcome, AppError> {
    let client = oauth_queries::fetch_client(pool, client_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Validation("unknown client_id".into()))?;

    if !client.redirect_uris.iter().any(|uri| uri == redirect_uri) {
        return Err(AppError::Validation("redirect_uri does not match registered URI".into()));
    }

    if code_challenge_method != "S256" {
        return Err(AppError::Validation("code_challenge_method must be S256".into()));
    }

    let code = format!("code_{}", random_token(CODE_LEN));
    let now = Utc::now();
    let record = AuthorizationCode {
        code: code.clone(),
        client_id: client_id.to_string(),
        redirect_uri: redirect_uri.to_string(),
        user_id: user_id.to_string(),
        code_challenge: code_challenge.to_string(),
        code_challenge_method: code_challenge_method.to_string(),
        scope: scope.map(str::to_string),
        state: Some(state.to_string()),
        created_at: now,
        expires_at: now + Duration::seconds(auth_code_ttl_secs),
        used: false,
    };
    oauth_queries::insert_code(pool, &record)
        .await
        .map_err(AppError::from)?;

    Ok(AuthorizeOutcome {
        redirect_uri: redirect_uri.to_string(),
        code: Some(code),
        state: state.to_string(),
        denied: false,
    })
}

pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub async fn exchange_authorization_code(
    pool: &PgPool,
    jwt_signing_key: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
    code_verifier: &str,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
) -> Result<TokenPair, AppError> {
    let client = oauth_queries::fetch_client(pool, client_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Validation("unknown client_id".into()))?;

    if client.client_secret != client_secret {
        return Err(AppError::Validation("invalid client_secret".into()));
    }

    let record = oauth_queries::fetch_code(pool, code)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Validation("unknown authorization code".into()))?;

    if record.used {
        return Err(AppError::Validation("authorization code already redeemed".into()));
    }
    if record.expires_at < Utc::now() {
        return Err(AppError::Validation("authorization code expired".into()));
    }
    if record.client_id != client_id || record.redirect_uri != redirect_uri {
        return Err(AppError::Validation("client_id/redirect_uri mismatch".into()));
    }
    if !pkce::verify(code_verifier, &record.code_challenge, &record.code_challenge_method) {
        return Err(AppError::Validation("code_verifier does not match code_challenge".into()));
    }

    let won = oauth_queries::mark_code_used(pool, code)
        .await
        .map_err(AppError::from)?;
    if !won {
        return Err(AppError::Validation("authorization code already redeemed".into()));
    }

    let user = user_queries::fetch_by_id(pool, &record.user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Validation("authorization code user no longer exists".into()))?;

    mint_pair(
        pool,
        jwt_signing_key,
        client_id,
        &user.user_id,
        &user.role,
        &user.name,
        access_ttl_secs,
        refresh_ttl_secs,
    )
    .await
}

pub async fn refresh(
    pool: &PgPool,
    jwt_signing_key: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
) -> Result<TokenPair, AppError> {
    let client = oauth_queries::fetch_client(pool, client_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Validation("unknown client_id".into()))?;
    if client.client_secret != client_secret {
        return Err(AppError::Validation("invalid client_secret".into()));
    }

    let row: RefreshTokenRow = oauth_queries::fetch_refresh_token(pool, refresh_token)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Validation("unknown refresh token".into()))?;

    if row.revoked || row.expires_at < Utc::now() {
        return Err(AppError::Validation("refresh token is no longer valid".into()));
    }
    if row.client_id != client_id {
        return Err(AppError::Validation("refresh token was not issued to this client".into()));
    }

    let won = oauth_queries::revoke_refresh_token_if_live(pool, refresh_token)
        .await
        .map_err(AppError::from)?;
    if !won {
        return Err(AppError::Validation("refresh token already rotated".into()));
    }

    let user = user_queries::fetch_by_id(pool, &row.user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Validation("refresh token user no longer exists".into()))?;

    mint_pair(
        pool,
        jwt_signing_key,
        client_id,
        &user.user_id,
        &user.role,
        &user.name,
        access_ttl_secs,
        refresh_ttl_secs,
    )
    .await
}

async fn mint_pair(
    pool: &PgPool,
    jwt_signing_key: &str,
    client_id: &str,
    user_id: &str,
    role: &str,
    name: &str,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
) -> Result<TokenPair, AppError> {
    let access_token = jwt::issue_access_token(
        jwt_signing_key,
        user_id,
        role,
        name,
        Some(client_id),
        access_ttl_secs,
    )?;

    let refresh_token = format!("rt_{}", random_token(TOKEN_LEN));
    let chain_id = Uuid::new_v4();
    oauth_queries::insert_refresh_token(
        pool,
        &refresh_token,
        client_id,
        user_id,
        chain_id,
        Utc::now() + Duration::seconds(refresh_ttl_secs),
    )
    .await
    .map_err(AppError::from)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        expires_in: access_ttl_secs,
    })
}
