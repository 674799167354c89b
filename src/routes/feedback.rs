use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::auth::Principal;
use crate::db::feedback_queries::{self, FeedbackFilter};
use crate::errors::AppError;
use crate::models::{
    BulkUpdateFeedback, CreateFeedback, Feedback, FeedbackCategory, FeedbackListQuery,
    FeedbackListResponse, FeedbackSummary, Severity, UpdateFeedback,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feedback", get(list_feedback).post(create_feedback))
        .route("/feedback/summary", get(summary))
        .route("/feedback/bulk", axum::routing::patch(bulk_update))
        .route(
            "/feedback/:id",
            get(get_feedback).patch(update_feedback).delete(delete_feedback),
        )
}

const DEFAULT_PAGE_SIZE: usize = 20;

async fn list_feedback(
    State(state): State<AppState>,
    Query(query): Query<FeedbackListQuery>,
) -> Result<Json<FeedbackListResponse>, AppError> {
    if let Some(category) = &query.category {
        if FeedbackCategory::from_str(category).is_none() {
            return Err(AppError::Validation(format!("unknown category '{category}'")));
        }
    }
    if let Some(severity) = &query.severity {
        if Severity::from_str(severity).is_none() {
            return Err(AppError::Validation(format!("unknown severity '{severity}'")));
        }
    }

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 200);
    let sort_desc = match query.sort.as_deref() {
        Some("created_at_asc") => false,
        Some("created_at_desc") | None => true,
        Some(other) => {
            return Err(AppError::Validation(format!("unknown sort '{other}'")));
        }
    };

    let filter = FeedbackFilter {
        category: query.category.as_deref(),
        severity: query.severity.as_deref(),
        ticker: query.ticker.as_deref(),
        session_id: query.session_id.as_deref(),
    };

    let (items, total) = feedback_queries::list(&state.pool, &filter, sort_desc, page, per_page)
        .await
        .map_err(AppError::from)?;

    let pages = if total == 0 { 0 } else { (total + per_page as i64 - 1) / per_page as i64 };

    Ok(Json(FeedbackListResponse { items, total, page, per_page, pages }))
}

async fn get_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Feedback>, AppError> {
    let feedback = feedback_queries::fetch(&state.pool, &id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("feedback '{id}' not found")))?;
    Ok(Json(feedback))
}

async fn create_feedback(
    principal: Option<Principal>,
    State(state): State<AppState>,
    Json(body): Json<CreateFeedback>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let category = FeedbackCategory::from_str(&body.category)
        .ok_or_else(|| AppError::Validation(format!("unknown category '{}'", body.category)))?;
    let severity = body
        .severity
        .as_deref()
        .map(|s| Severity::from_str(s).ok_or_else(|| AppError::Validation(format!("unknown severity '{s}'"))))
        .transpose()?
        .unwrap_or(Severity::Low);
    if body.description.trim().is_empty() {
        return Err(AppError::Validation("description must not be blank".into()));
    }

    let (user_id, user_name, user_email) = match &principal {
        Some(p) => {
            let user = crate::db::user_queries::fetch_by_id(&state.pool, &p.user_id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::AuthenticationRequired { resource_metadata: None })?;
            (user.user_id, user.name, user.email)
        }
        None => ("anonymous".to_string(), "Anonymous".to_string(), "anonymous@vire.local".to_string()),
    };

    let feedback = Feedback {
        id: format!("fb_{}", Uuid::new_v4()),
        category: category.as_str().to_string(),
        severity: severity.as_str().to_string(),
        status: "new".to_string(),
        description: body.description,
        ticker: body.ticker,
        portfolio_name: body.portfolio_name,
        session_id: body.session_id,
        client_type: body.client_type,
        tool_name: body.tool_name,
        observed_value: body.observed_value,
        expected_value: body.expected_value,
        resolution_notes: None,
        user_id,
        user_name,
        user_email,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };

    let inserted = feedback_queries::insert(&state.pool, &feedback).await.map_err(AppError::from)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "accepted": true, "feedback_id": inserted.id })),
    ))
}

async fn update_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateFeedback>,
) -> Result<Json<Feedback>, AppError> {
    let status = crate::models::FeedbackStatus::from_str(&body.status)
        .ok_or_else(|| AppError::Validation(format!("unknown status '{}'", body.status)))?;

    let updated = feedback_queries::update_status(
        &state.pool,
        &id,
        status.as_str(),
        body.resolution_notes.as_deref(),
    )
    .await
    .map_err(AppError::from)?
    .ok_or_else(|| AppError::NotFound(format!("feedback '{id}' not found")))?;

    Ok(Json(updated))
}

async fn bulk_update(
    _principal: Principal,
    State(state): State<AppState>,
    Json(body): Json<BulkUpdateFeedback>,
) -> Result<Json<serde_json::Value>, AppError> {
    let status = crate::models::FeedbackStatus::from_str(&body.status)
        .ok_or_else(|| AppError::Validation(format!("unknown status '{}'", body.status)))?;
    if body.ids.is_empty() {
        return Err(AppError::Validation("ids must not be empty".into()));
    }

    let updated = feedback_queries::bulk_update_status(
        &state.pool,
        &body.ids,
        status.as_str(),
        body.resolution_notes.as_deref(),
    )
    .await
    .map_err(AppError::from)?;

    Ok(Json(serde_json::json!({ "updated": updated })))
}

async fn delete_feedback(
    _principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = feedback_queries::delete(&state.pool, &id).await.map_err(AppError::from)?;
    if deleted == 0 {
        return Err(AppError::NotFound(format!("feedback '{id}' not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn summary(State(state): State<AppState>) -> Result<Json<FeedbackSummary>, AppError> {
    let row = feedback_queries::summary(&state.pool).await.map_err(AppError::from)?;
    Ok(Json(FeedbackSummary {
        total: row.total,
        by_status: row.by_status,
        by_severity: row.by_severity,
        by_category: row.by_category,
        oldest_unresolved: row.oldest_unresolved,
    }))
}
