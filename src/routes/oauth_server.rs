use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;

use crate::auth::{oauth_service, password};
use crate::db::user_queries;
use crate::errors::AppError;
use crate::models::oauth::{
    AuthorizationServerMetadata, AuthorizeParams, ProtectedResourceMetadata,
    RegisterClientRequest, RegisterClientResponse, TokenRequest, TokenResponse,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/.well-known/oauth-protected-resource",
            get(protected_resource_metadata),
        )
        .route(
            "/.well-known/oauth-authorization-server",
            get(authorization_server_metadata),
        )
        .route("/oauth/register", post(register_client))
        .route("/oauth/authorize", get(authorize_form).post(authorize_submit))
        .route("/oauth/token", post(token))
}

async fn protected_resource_metadata(State(state): State<AppState>) -> Json<ProtectedResourceMetadata> {
    let issuer = state.config.oauth_issuer.clone();
    Json(ProtectedResourceMetadata {
        resource: issuer.clone(),
        authorization_servers: vec![issuer],
        bearer_methods_supported: vec!["header".to_string()],
    })
}

async fn authorization_server_metadata(
    State(state): State<AppState>,
) -> Json<AuthorizationServerMetadata> {
    let issuer = state.config.oauth_issuer.clone();
    Json(AuthorizationServerMetadata {
        authorization_endpoint: format!("{issuer}/oauth/authorize"),
        token_endpoint: format!("{issuer}/oauth/token"),
        registration_endpoint: format!("{issuer}/oauth/register"),
        response_types_supported: vec!["code".to_string()],
        grant_types_supported: vec!["authorization_code".to_string(), "refresh_token".to_string()],
        code_challenge_methods_supported: vec!["S256".to_string()],
        issuer,
    })
}

async fn register_client(
    State(state): State<AppState>,
    Json(body): Json<RegisterClientRequest>,
) -> Result<(axum::http::StatusCode, Json<RegisterClientResponse>), AppError> {
    let client = oauth_service::register_client(&state.pool, &body.client_name, &body.redirect_uris)
        .await?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(RegisterClientResponse {
            client_id: client.client_id,
            client_secret: client.client_secret,
            client_name: client.client_name,
            redirect_uris: client.redirect_uris,
        }),
    ))
}

async fn authorize_form(Query(params): Query<AuthorizeParams>) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html><body>
<h1>Authorize {client}</h1>
<form method="post" action="/oauth/authorize">
  <input type="hidden" name="client_id" value="{client_id}" />
  <input type="hidden" name="redirect_uri" value="{redirect_uri}" />
  <input type="hidden" name="response_type" value="code" />
  <input type="hidden" name="code_challenge" value="{code_challenge}" />
  <input type="hidden" name="code_challenge_method" value="S256" />
  <input type="hidden" name="state" value="{state}" />
  <input type="email" name="email" placeholder="Email" />
  <input type="password" name="password" placeholder="Password" />
  <button type="submit" name="deny" value="false">Allow</button>
  <button type="submit" name="deny" value="true">Deny</button>
</form>
</body></html>"#,
        client = params.client_id,
        client_id = params.client_id,
        redirect_uri = params.redirect_uri,
        code_challenge = params.code_challenge,
        state = params.state,
    ))
}

#[derive(Debug, Deserialize)]
struct ConsentForm {
    client_id: String,
    redirect_uri: String,
    code_challenge: String,
    #[serde(default = "default_method")]
    code_challenge_method: String,
    state: String,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    deny: Option<String>,
}

fn default_method() -> String {
    "S256".to_string()
}

async fn authorize_submit(
    State(state): State<AppState>,
    Form(form): Form<ConsentForm>,
) -> Result<Response, AppError> {
    if form.deny.as_deref() == Some("true") {
        let redirect = format!(
            "{}?error=access_denied&state={}",
            form.redirect_uri, form.state
        );
        return Ok(Redirect::to(&redirect).into_response());
    }

    let email = form.email.unwrap_or_default();
    let password_input = form.password.unwrap_or_default();

    let user = user_queries::fetch_by_email(&state.pool, &email)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Validation("invalid credentials".into()))?;
    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| AppError::Validation("invalid credentials".into()))?;
    if !password::verify(&password_input, hash)? {
        return Err(AppError::Validation("invalid credentials".into()));
    }

    let outcome = oauth_service::authorize(
        &state.pool,
        &form.client_id,
        &form.redirect_uri,
        &form.code_challenge,
        &form.code_challenge_method,
        form.scope.as_deref(),
        &form.state,
        &user.user_id,
        state.config.auth_code_ttl_secs,
    )
    .await?;

    let redirect = format!(
        "{}?code={}&state={}",
        outcome.redirect_uri,
        outcome.code.unwrap_or_default(),
        outcome.state
    );
    Ok(Redirect::to(&redirect).into_response())
}

async fn token(
    State(state): State<AppState>,
    Json(body): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let pair = match body {
        TokenRequest::AuthorizationCode {
            code,
            redirect_uri,
            client_id,
            client_secret,
            code_verifier,
        } => {
            oauth_service::exchange_authorization_code(
                &state.pool,
                &state.config.jwt_signing_key,
                &client_id,
                &client_secret,
                &code,
                &redirect_uri,
                &code_verifier,
                state.config.access_token_ttl_secs,
                state.config.refresh_token_ttl_secs,
            )
            .await?
        }
        TokenRequest::RefreshToken {
            refresh_token,
            client_id,
            client_secret,
        } => {
            oauth_service::refresh(
                &state.pool,
                &state.config.jwt_signing_key,
                &client_id,
                &client_secret,
                &refresh_token,
                state.config.access_token_ttl_secs,
                state.config.refresh_token_ttl_secs,
            )
            .await?
        }
    };

    Ok(Json(TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "Bearer",
        expires_in: pair.expires_in,
    }))
}
