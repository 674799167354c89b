use chrono::Utc;
use sqlx::PgPool;

use crate::db::user_queries;
use crate::errors::AppError;
use crate::models::user::{User, SERVICE_EMAIL_SUFFIX, SERVICE_USER_PREFIX};

pub struct ServiceRegistration {
    pub service_user_id: String,
    pub registered_at: chrono::DateTime<chrono::Utc>,
}

/// Creates or idempotently touches the service user derived from `service_id`.
/// Caller has already validated the shared-secret match and `service_id`
/// non-emptiness.
pub async fn register(pool: &PgPool, service_id: &str) -> Result<ServiceRegistration, AppError> {
    let user_id = format!("{SERVICE_USER_PREFIX}{service_id}");
    let email = format!("{service_id}{SERVICE_EMAIL_SUFFIX}");

    if let Some(existing) = user_queries::fetch_by_id(pool, &user_id)
        .await
        .map_err(AppError::from)?
    {
        user_queries::touch(pool, &existing.user_id)
            .await
            .map_err(AppError::from)?;
        return Ok(ServiceRegistration {
            service_user_id: existing.user_id,
            registered_at: Utc::now(),
        });
    }

    let now = Utc::now();
    let user = User {
        user_id: user_id.clone(),
        email,
        name: format!("service:{service_id}"),
        provider: "service".to_string(),
        role: "service".to_string(),
        password_hash: None,
        navexa_key: None,
        created_at: now,
        modified_at: now,
    };
    let inserted = user_queries::insert(pool, &user).await.map_err(AppError::from)?;

    Ok(ServiceRegistration {
        service_user_id: inserted.user_id,
        registered_at: inserted.modified_at,
    })
}
