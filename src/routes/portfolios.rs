use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::auth::Principal;
use crate::db::{market_queries, portfolio_queries, user_queries};
use crate::errors::AppError;
use crate::models::{
    ExternalBalance, ExternalBalanceInput, JobType, Portfolio, UpsertPortfolio,
};
use crate::services::{analytics, cash_ledger, portfolio_sync};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/portfolios", get(list_portfolios).put(upsert_portfolio))
        .route(
            "/portfolios/:name",
            get(get_portfolio).put(update_portfolio).delete(delete_portfolio),
        )
        .route(
            "/portfolios/:name/external-balances",
            get(get_external_balances)
                .post(replace_external_balances)
                .put(replace_external_balances),
        )
        .route("/portfolios/:name/sync", post(trigger_sync))
        .route("/portfolios/:name/review", post(review_portfolio))
        .route("/portfolios/:name/indicators", get(get_indicators))
        .route("/portfolios/:name/glossary", get(glossary))
}

async fn list_portfolios(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<Vec<Portfolio>>, AppError> {
    let portfolios = portfolio_queries::fetch_all_for_owner(&state.pool, &principal.user_id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(portfolios))
}

#[derive(Debug, Deserialize)]
struct UpsertPortfolioRequest {
    name: String,
    #[serde(flatten)]
    body: UpsertPortfolio,
}

async fn upsert_portfolio(
    principal: Principal,
    State(state): State<AppState>,
    Json(body): Json<UpsertPortfolioRequest>,
) -> Result<(StatusCode, Json<Portfolio>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    let portfolio = do_upsert(&state, &principal.user_id, &body.name, body.body).await?;
    Ok((StatusCode::OK, Json(portfolio)))
}

async fn update_portfolio(
    principal: Principal,
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<UpsertPortfolio>,
) -> Result<Json<Portfolio>, AppError> {
    let portfolio = do_upsert(&state, &principal.user_id, &name, body).await?;
    Ok(Json(portfolio))
}

async fn do_upsert(
    state: &AppState,
    owner_user_id: &str,
    name: &str,
    body: UpsertPortfolio,
) -> Result<Portfolio, AppError> {
    let currency = body.currency.unwrap_or_else(|| "AUD".to_string());

    portfolio_queries::upsert(&state.pool, name, owner_user_id, &currency)
        .await
        .map_err(AppError::from)?;

    let portfolio = portfolio_queries::fetch(&state.pool, name)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Internal("portfolio vanished immediately after upsert".into()))?;

    info!(portfolio = %name, owner = %owner_user_id, "portfolio upserted");
    Ok(portfolio)
}

#[derive(Debug, Deserialize)]
struct GetPortfolioQuery {
    #[serde(default)]
    include_time_series: bool,
    #[serde(default)]
    force_refresh: bool,
}

async fn get_portfolio(
    principal: Principal,
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<GetPortfolioQuery>,
) -> Result<Json<Portfolio>, AppError> {
    if query.force_refresh {
        let user = user_queries::fetch_by_id(&state.pool, &principal.user_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::Internal("principal vanished mid-request".into()))?;
        let navexa_key = user.navexa_key.ok_or(AppError::NavexaKeyRequired)?;

        portfolio_sync::sync(&state.pool, state.brokerage.as_ref(), &name, &navexa_key)
            .await
            .map_err(AppError::from)?;
    }

    let mut portfolio = portfolio_queries::fetch(&state.pool, &name)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("portfolio '{name}' not found")))?;

    let ledger = cash_ledger::build_response(&state.pool, &name).await?;
    portfolio.total_cash = Some(ledger.summary.total_cash);

    let capital_performance = cash_ledger::capital_performance(&state.pool, &name).await.ok();
    portfolio.capital_performance = capital_performance;

    if query.include_time_series {
        let time_series = analytics::build_timeline(
            &state.pool,
            &name,
            portfolio.total_value_holdings,
            portfolio.external_balance_total,
            portfolio.holdings.len(),
        )
        .await?;
        portfolio.time_series = Some(time_series);
    }

    // Demand-driven enqueue: the response above is already computed from
    // cached state, so background collection for stale holdings is fired
    // after this point and its outcome never reaches the caller.
    for holding in &portfolio.holdings {
        let ticker = holding.ticker.clone();
        let pool = state.pool.clone();
        tokio::spawn(async move {
            crate::jobs::queue::enqueue_if_stale(
                &pool,
                JobType::CollectEod,
                &ticker,
                5,
                chrono::Duration::hours(18),
            )
            .await;
        });
    }

    Ok(Json(portfolio))
}

async fn delete_portfolio(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = portfolio_queries::delete(&state.pool, &name).await.map_err(AppError::from)?;
    if deleted == 0 {
        return Err(AppError::NotFound(format!("portfolio '{name}' not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_external_balances(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ExternalBalance>>, AppError> {
    let balances = portfolio_queries::fetch_external_balances(&state.pool, &name)
        .await
        .map_err(AppError::from)?;
    Ok(Json(balances))
}

async fn replace_external_balances(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Vec<ExternalBalanceInput>>,
) -> Result<Json<Vec<ExternalBalance>>, AppError> {
    let balances: Vec<ExternalBalance> = body
        .into_iter()
        .map(|b| ExternalBalance {
            balance_type: b.balance_type,
            label: b.label,
            value: b.value,
            rate: b.rate,
        })
        .collect();

    portfolio_queries::replace_external_balances(&state.pool, &name, &balances)
        .await
        .map_err(AppError::from)?;

    Ok(Json(balances))
}

async fn trigger_sync(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    portfolio_queries::fetch(&state.pool, &name)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("portfolio '{name}' not found")))?;

    let mut job = crate::models::NewJob::new(
        format!("job_{}", uuid::Uuid::new_v4()),
        JobType::SyncPortfolio,
        10,
    );
    job.payload = serde_json::json!({ "portfolio_name": name });

    crate::db::job_queries::upsert(&state.pool, &job)
        .await
        .map_err(AppError::from)?;

    Ok(StatusCode::ACCEPTED)
}

/// Synthesized read combining the portfolio snapshot, its capital-performance
/// figures, and technical indicators. The source spec lists this route
/// without pinning a response shape (an explicit Open Question); this
/// assembles the three projections the rest of the surface already exposes
/// independently rather than inventing a fourth one.
async fn review_portfolio(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let portfolio = portfolio_queries::fetch(&state.pool, &name)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("portfolio '{name}' not found")))?;

    let capital_performance = cash_ledger::capital_performance(&state.pool, &name).await?;
    let indicators = load_indicators(&state, &name, &portfolio).await?;

    Ok(Json(serde_json::json!({
        "portfolio": portfolio,
        "capital_performance": capital_performance,
        "indicators": indicators,
    })))
}

async fn get_indicators(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<crate::models::IndicatorsResponse>, AppError> {
    // Unlike the other per-portfolio routes, a missing portfolio here is
    // treated as an upstream failure (500), not a 404: indicators are
    // derived state, not a resource lookup.
    let portfolio = portfolio_queries::fetch(&state.pool, &name)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Internal(format!("portfolio '{name}' not found")))?;
    Ok(Json(load_indicators(&state, &name, &portfolio).await?))
}

async fn load_indicators(
    state: &AppState,
    name: &str,
    portfolio: &Portfolio,
) -> Result<crate::models::IndicatorsResponse, AppError> {
    let since = chrono::Utc::now().date_naive() - chrono::Duration::days(400);
    let mut history: Vec<f64> = Vec::new();
    for holding in &portfolio.holdings {
        let points = market_queries::fetch_eod_history(&state.pool, &holding.ticker, since)
            .await
            .map_err(AppError::from)?;
        if points.len() > history.len() {
            history = points.iter().map(|p| p.close).collect();
        }
    }

    let current_value = portfolio.total_value_holdings;
    Ok(analytics::compute_indicators(name, &history, current_value, None))
}

/// Hardcoded from the glossary terms this service publishes; static by
/// nature, not derived from any stored record.
async fn glossary() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "terms": {
            "AS": "OAuth 2.1 authorization server.",
            "DCR": "Dynamic Client Registration (RFC 7591 family).",
            "PKCE": "Proof Key for Code Exchange (RFC 7636); S256 method only.",
            "timeline": "Chronological series of portfolio snapshots with per-day value and capital-flow state.",
            "internal_transfer": "A cash transaction whose category is transfer, or a non-transfer whose category labels an external-balance account; excluded from capital-flow totals though included in transaction counts.",
            "service_principal": "A non-human caller authenticated by shared secret at registration, later by X-Vire-Service-ID; role service.",
            "base_currency": "A portfolio's currency; all holdings are rewritten into it while preserving original_currency.",
        }
    }))
}
