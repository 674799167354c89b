use axum::http::{HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use axum::Json;
use reqwest::StatusCode;
use serde_json::json;
use sqlx::Error;
use thiserror::Error;

/// The single error type returned by every handler.
///
/// Each variant maps to exactly one HTTP status and carries a
/// machine-readable `error` kind plus a human `message`, per the error
/// kinds enumerated in the design: `validation_error`,
/// `authentication_required`, `forbidden`, `not_found`, `conflict`,
/// `method_not_allowed`, `not_implemented`, `navexa_key_required`,
/// `internal`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(sqlx::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Authentication required")]
    AuthenticationRequired { resource_metadata: Option<String> },
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Not implemented: {0}")]
    NotImplemented(String),
    #[error("navexa_key_required")]
    NavexaKeyRequired,
    #[error("Rate limited by external provider")]
    RateLimited,
    #[error("External error: {0}")]
    External(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::Db(_) | AppError::Internal(_) => "internal",
            AppError::Validation(_) => "validation_error",
            AppError::AuthenticationRequired { .. } => "authentication_required",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::MethodNotAllowed => "method_not_allowed",
            AppError::NotImplemented(_) => "not_implemented",
            AppError::NavexaKeyRequired => "navexa_key_required",
            AppError::RateLimited => "rate_limited",
            AppError::External(_) => "external_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Db(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationRequired { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::NavexaKeyRequired => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::External(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Human `message` shown alongside the machine `error` field.
    fn message(&self) -> String {
        match self {
            AppError::NavexaKeyRequired => {
                "a brokerage credential (navexa_key) is required for this user".to_string()
            }
            AppError::MethodNotAllowed => "method not allowed on this route".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let kind = self.kind();
        let message = self.message();

        let mut headers = HeaderMap::new();
        match &self {
            AppError::AuthenticationRequired { resource_metadata: Some(url) } => {
                let value = format!(r#"Bearer resource_metadata="{}""#, url);
                if let Ok(hv) = HeaderValue::from_str(&value) {
                    headers.insert("WWW-Authenticate", hv);
                }
            }
            AppError::AuthenticationRequired { resource_metadata: None } => {
                headers.insert("WWW-Authenticate", HeaderValue::from_static("Bearer"));
            }
            AppError::RateLimited => {
                headers.insert("Retry-After", HeaderValue::from_static("60"));
            }
            _ => {}
        }

        (status, headers, Json(json!({ "error": kind, "message": message }))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: Error) -> Self {
        AppError::Db(value)
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navexa_key_required_maps_to_bad_request() {
        assert_eq!(AppError::NavexaKeyRequired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NavexaKeyRequired.kind(), "navexa_key_required");
    }

    #[test]
    fn authentication_required_sets_www_authenticate_header() {
        let response = AppError::AuthenticationRequired { resource_metadata: None }.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get("WWW-Authenticate").unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn authentication_required_carries_resource_metadata_url() {
        let response = AppError::AuthenticationRequired {
            resource_metadata: Some("https://vire.example/.well-known/oauth-protected-resource".into()),
        }
        .into_response();
        let header = response.headers().get("WWW-Authenticate").unwrap().to_str().unwrap();
        assert!(header.starts_with("Bearer resource_metadata="));
    }

    #[test]
    fn rate_limited_sets_retry_after() {
        let response = AppError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "60");
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    }
}
