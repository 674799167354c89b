use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::auth::jwt;
use crate::db::user_queries;
use crate::errors::AppError;
use crate::models::user::SERVICE_USER_PREFIX;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
    pub role: String,
}

impl Principal {
    pub fn is_admin_equivalent(&self) -> bool {
        self.role == "admin" || self.role == "service"
    }

    pub fn is_service(&self) -> bool {
        self.role == "service"
    }
}

/// Resolves the caller identity in priority order: a valid bearer JWT, then
/// `X-Vire-User-ID`, then `X-Vire-Service-ID`. Handlers that need an
/// authenticated caller extract `Principal`; public endpoints that tolerate
/// anonymous access extract `Option<Principal>` instead.
impl<S> FromRequestParts<S> for Principal
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        if let Some(auth_header) = parts.headers.get(axum::http::header::AUTHORIZATION) {
            let value = auth_header
                .to_str()
                .map_err(|_| unauthenticated(&app_state))?;
            if let Some(token) = value.strip_prefix("Bearer ") {
                let claims = jwt::verify_access_token(&app_state.config.jwt_signing_key, token)
                    .map_err(|_| unauthenticated(&app_state))?;
                let user = user_queries::fetch_by_id(&app_state.pool, &claims.sub)
                    .await
                    .map_err(AppError::from)?
                    .ok_or_else(|| unauthenticated(&app_state))?;
                return Ok(Principal {
                    user_id: user.user_id,
                    role: user.role,
                });
            }
        }

        if let Some(user_id) = parts.headers.get("X-Vire-User-ID") {
            let user_id = user_id
                .to_str()
                .map_err(|_| unauthenticated(&app_state))?
                .to_string();
            let user = user_queries::fetch_by_id(&app_state.pool, &user_id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| unauthenticated(&app_state))?;
            return Ok(Principal {
                user_id: user.user_id,
                role: user.role,
            });
        }

        if let Some(service_id) = parts.headers.get("X-Vire-Service-ID") {
            let service_id = service_id
                .to_str()
                .map_err(|_| unauthenticated(&app_state))?
                .to_string();
            if !service_id.starts_with(SERVICE_USER_PREFIX) {
                return Err(unauthenticated(&app_state));
            }
            let user = user_queries::fetch_by_id(&app_state.pool, &service_id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| unauthenticated(&app_state))?;
            return Ok(Principal {
                user_id: user.user_id,
                role: user.role,
            });
        }

        Err(unauthenticated(&app_state))
    }
}

fn unauthenticated(state: &AppState) -> AppError {
    let resource_metadata = Some(format!(
        "{}/.well-known/oauth-protected-resource",
        state.config.oauth_issuer
    ));
    AppError::AuthenticationRequired { resource_metadata }
}
