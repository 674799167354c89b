use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::auth::password;
use crate::db::user_queries;
use crate::errors::AppError;
use crate::models::{CreateUser, PublicUser, UpdateUser, UpsertUser, User};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/check/:name", get(check_user))
        .route("/users/upsert", post(upsert_user))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, AppError> {
    let users = user_queries::fetch_all(&state.pool).await.map_err(AppError::from)?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, AppError> {
    let user = user_queries::fetch_by_id(&state.pool, &id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("user '{id}' not found")))?;
    Ok(Json(PublicUser::from(&user)))
}

async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUser>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    if user_queries::fetch_by_email(&state.pool, &body.email)
        .await
        .map_err(AppError::from)?
        .is_some()
    {
        return Err(AppError::Conflict(format!("email '{}' already registered", body.email)));
    }

    let password_hash = body.password.as_deref().map(password::hash).transpose()?;
    let now = chrono::Utc::now();
    let user = User {
        user_id: format!("user_{}", uuid::Uuid::new_v4()),
        email: body.email,
        name: body.name,
        provider: "password".to_string(),
        role: "user".to_string(),
        password_hash,
        navexa_key: None,
        created_at: now,
        modified_at: now,
    };

    let inserted = user_queries::insert(&state.pool, &user).await.map_err(|e| {
        error!(error = %e, "failed to insert user");
        AppError::from(e)
    })?;

    info!(user_id = %inserted.user_id, "created user");
    Ok((StatusCode::CREATED, Json(PublicUser::from(&inserted))))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUser>,
) -> Result<Json<PublicUser>, AppError> {
    let updated = user_queries::update(
        &state.pool,
        &id,
        body.name.as_deref(),
        body.email.as_deref(),
        body.navexa_key.as_deref(),
    )
    .await
    .map_err(AppError::from)?
    .ok_or_else(|| AppError::NotFound(format!("user '{id}' not found")))?;

    Ok(Json(PublicUser::from(&updated)))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = user_queries::delete(&state.pool, &id).await.map_err(AppError::from)?;
    if deleted == 0 {
        return Err(AppError::NotFound(format!("user '{id}' not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(serde::Serialize)]
struct CheckUserResponse {
    exists: bool,
}

async fn check_user(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CheckUserResponse>, AppError> {
    let exists = user_queries::exists_by_name(&state.pool, &name)
        .await
        .map_err(AppError::from)?;
    Ok(Json(CheckUserResponse { exists }))
}

async fn upsert_user(
    State(state): State<AppState>,
    Json(body): Json<UpsertUser>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    if let Some(existing) = user_queries::fetch_by_email(&state.pool, &body.email)
        .await
        .map_err(AppError::from)?
    {
        let updated = user_queries::update(&state.pool, &existing.user_id, Some(&body.name), None, None)
            .await
            .map_err(AppError::from)?
            .unwrap_or(existing);
        return Ok((StatusCode::OK, Json(PublicUser::from(&updated))));
    }

    let now = chrono::Utc::now();
    let user = User {
        user_id: format!("user_{}", uuid::Uuid::new_v4()),
        email: body.email,
        name: body.name,
        provider: "password".to_string(),
        role: "user".to_string(),
        password_hash: None,
        navexa_key: None,
        created_at: now,
        modified_at: now,
    };
    let inserted = user_queries::insert(&state.pool, &user).await.map_err(AppError::from)?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(&inserted))))
}
