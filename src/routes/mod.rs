pub mod admin;
pub mod auth;
pub mod cash;
pub mod feedback;
pub mod health;
pub mod market;
pub mod mcp;
pub mod oauth_server;
pub mod portfolios;
pub mod scan;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Everything under `/api`, plus the OAuth well-known/metadata and
/// authorization-server endpoints, which live outside it per the OAuth 2.1
/// discovery conventions (`/.well-known/...`, `/oauth/...`).
pub fn router() -> Router<AppState> {
    let api = Router::new()
        .merge(health::router())
        .merge(users::router())
        .merge(admin::router())
        .merge(auth::router())
        .merge(portfolios::router())
        .merge(cash::router())
        .merge(market::router())
        .merge(scan::router())
        .merge(feedback::router())
        .merge(mcp::router());

    Router::new()
        .nest("/api", api)
        .merge(oauth_server::router())
}
