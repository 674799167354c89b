use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::auth::{password, Principal};
use crate::db::user_queries;
use crate::errors::AppError;
use crate::models::{AuthTokenResponse, PublicUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/oauth", post(oauth_login))
        .route("/auth/validate", post(validate))
        .route("/services/register", post(register_service))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthTokenResponse>, AppError> {
    let user = user_queries::fetch_by_email(&state.pool, &body.email)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Validation("invalid email or password".into()))?;

    if user.role == "service" || user.provider == "service" {
        return Err(AppError::Forbidden(
            "service accounts cannot hold interactive sessions".into(),
        ));
    }

    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| AppError::Validation("invalid email or password".into()))?;
    if !password::verify(&body.password, hash)? {
        return Err(AppError::Validation("invalid email or password".into()));
    }

    let token = crate::auth::jwt::issue_access_token(
        &state.config.jwt_signing_key,
        &user.user_id,
        &user.role,
        &user.name,
        None,
        state.config.access_token_ttl_secs,
    )?;

    info!(user_id = %user.user_id, "password login succeeded");
    Ok(Json(AuthTokenResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

#[derive(Debug, Deserialize)]
struct OAuthLoginRequest {
    provider: String,
}

async fn oauth_login(
    State(state): State<AppState>,
    Json(body): Json<OAuthLoginRequest>,
) -> Result<Json<Value>, AppError> {
    if body.provider != "dev" {
        return Err(AppError::Validation(format!("unsupported provider '{}'", body.provider)));
    }

    let email = "dev@vire.local";
    let user = match user_queries::fetch_by_email(&state.pool, email)
        .await
        .map_err(AppError::from)?
    {
        Some(u) => u,
        None => {
            let now = chrono::Utc::now();
            let new_user = crate::models::User {
                user_id: "dev_user".to_string(),
                email: email.to_string(),
                name: "Dev User".to_string(),
                provider: "dev".to_string(),
                role: "admin".to_string(),
                password_hash: None,
                navexa_key: None,
                created_at: now,
                modified_at: now,
            };
            user_queries::insert(&state.pool, &new_user)
                .await
                .map_err(AppError::from)?
        }
    };

    let token = crate::auth::jwt::issue_access_token(
        &state.config.jwt_signing_key,
        &user.user_id,
        &user.role,
        &user.name,
        None,
        state.config.access_token_ttl_secs,
    )?;

    Ok(Json(json!({
        "status": "ok",
        "data": { "token": token, "user": PublicUser::from(&user) },
    })))
}

async fn validate(principal: Principal, State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let user = user_queries::fetch_by_id(&state.pool, &principal.user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::AuthenticationRequired { resource_metadata: None })?;
    Ok(Json(json!({ "status": "ok", "user": PublicUser::from(&user) })))
}

#[derive(Debug, Deserialize)]
struct RegisterServiceRequest {
    service_id: String,
    key: String,
}

#[derive(Debug, Serialize)]
struct RegisterServiceResponse {
    status: &'static str,
    service_user_id: String,
    registered_at: chrono::DateTime<chrono::Utc>,
}

async fn register_service(
    State(state): State<AppState>,
    Json(body): Json<RegisterServiceRequest>,
) -> Result<Json<RegisterServiceResponse>, AppError> {
    let Some(expected_key) = &state.config.service_key else {
        return Err(AppError::NotImplemented("service registration is not configured".into()));
    };
    if expected_key.len() < 32 {
        return Err(AppError::Validation("configured service key is too short".into()));
    }
    if body.service_id.trim().is_empty() {
        return Err(AppError::Validation("service_id must not be empty".into()));
    }
    if &body.key != expected_key {
        return Err(AppError::Forbidden("service key mismatch".into()));
    }

    let registration = crate::auth::service_registration::register(&state.pool, &body.service_id)
        .await
        .map_err(|e| {
            error!(error = %e, "service registration failed");
            e
        })?;

    Ok(Json(RegisterServiceResponse {
        status: "ok",
        service_user_id: registration.service_user_id,
        registered_at: registration.registered_at,
    }))
}
