use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::Principal;
use crate::db::{job_queries, user_queries};
use crate::errors::AppError;
use crate::models::{JobRow, PublicUser, RoleChange};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id/role", patch(change_role))
        .route("/admin/jobs", get(list_jobs))
        .route("/admin/services/tidy", post(tidy_services))
}

fn require_admin(principal: &Principal) -> Result<(), AppError> {
    if principal.is_admin_equivalent() {
        Ok(())
    } else {
        Err(AppError::Forbidden("admin role required".into()))
    }
}

/// Jobs and service-tidy are admin-only in the strict sense: the
/// admin-equivalent grant service principals get over user-management
/// endpoints does not extend to these two.
fn require_strict_admin(principal: &Principal) -> Result<(), AppError> {
    if principal.role == "admin" {
        Ok(())
    } else {
        Err(AppError::Forbidden("admin role required".into()))
    }
}

async fn list_users(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    require_admin(&principal)?;
    let users = user_queries::fetch_all(&state.pool).await.map_err(AppError::from)?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

async fn change_role(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RoleChange>,
) -> Result<Json<PublicUser>, AppError> {
    require_admin(&principal)?;
    if body.role == "service" {
        return Err(AppError::Validation(
            "role cannot be set to 'service' through this endpoint".into(),
        ));
    }
    if body.role != "user" && body.role != "admin" {
        return Err(AppError::Validation(format!("unknown role '{}'", body.role)));
    }

    let updated = user_queries::update_role(&state.pool, &id, &body.role)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("user '{id}' not found")))?;

    info!(user_id = %id, role = %body.role, "role changed by admin");
    Ok(Json(PublicUser::from(&updated)))
}

async fn list_jobs(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    require_strict_admin(&principal)?;
    let jobs = job_queries::list_all(&state.pool, 200).await.map_err(AppError::from)?;
    Ok(Json(jobs))
}

#[derive(Debug, Serialize)]
struct TidyResponse {
    purged: u64,
    remaining: i64,
}

#[derive(Debug, Deserialize)]
struct TidyRequest {
    #[serde(default = "default_stale_days")]
    stale_days: i64,
}

fn default_stale_days() -> i64 {
    30
}

async fn tidy_services(
    principal: Principal,
    State(state): State<AppState>,
    body: Option<Json<TidyRequest>>,
) -> Result<Json<TidyResponse>, AppError> {
    require_strict_admin(&principal)?;
    let stale_days = body.map(|Json(b)| b.stale_days).unwrap_or_else(default_stale_days);
    let stale_before = chrono::Utc::now() - chrono::Duration::days(stale_days);
    let purged = user_queries::purge_stale_service_users(&state.pool, stale_before)
        .await
        .map_err(AppError::from)?;
    let remaining = user_queries::count_service_users(&state.pool)
        .await
        .map_err(AppError::from)?;

    info!(purged, remaining, "tidied stale service users");
    Ok(Json(TidyResponse { purged, remaining }))
}
