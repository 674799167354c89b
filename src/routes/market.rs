use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::market_queries;
use crate::errors::AppError;
use crate::jobs::queue;
use crate::models::market::REFRESH_ADVISORY;
use crate::models::{FilingDocument, JobType, StockData, StockDataWithAdvisory};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/market/stocks/:ticker", get(get_stock))
        .route(
            "/market/stocks/:ticker/filings/:document_key",
            get(get_filing),
        )
}

#[derive(Debug, Deserialize)]
struct StockQuery {
    #[serde(default)]
    force_refresh: bool,
}

const HISTORY_DAYS: i64 = 400;
const STALE_AFTER_HOURS: i64 = 18;

async fn get_stock(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<StockQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ticker = ticker.to_uppercase();
    let since = chrono::Utc::now().date_naive() - chrono::Duration::days(HISTORY_DAYS);
    let last_fetched_at = market_queries::fetch_last_fetched_at(&state.pool, &ticker)
        .await
        .map_err(AppError::from)?;

    let stale = match last_fetched_at {
        Some(ts) => chrono::Utc::now() - ts > chrono::Duration::hours(STALE_AFTER_HOURS),
        None => true,
    };

    if query.force_refresh || stale {
        queue::enqueue_if_stale(
            &state.pool,
            JobType::CollectEod,
            &ticker,
            5,
            chrono::Duration::hours(STALE_AFTER_HOURS),
        )
        .await;
    }

    let history = market_queries::fetch_eod_history(&state.pool, &ticker, since)
        .await
        .map_err(AppError::from)?;
    let last_close = history.last().map(|p| p.close);

    let data = StockData {
        ticker: ticker.clone(),
        last_close,
        currency: "USD".to_string(),
        history,
        stale,
    };

    if query.force_refresh {
        let value = serde_json::to_value(StockDataWithAdvisory {
            data,
            advisory: REFRESH_ADVISORY.to_string(),
        })
        .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Json(value))
    } else {
        let value = serde_json::to_value(data).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Json(value))
    }
}

async fn get_filing(
    State(state): State<AppState>,
    Path((ticker, document_key)): Path<(String, String)>,
) -> Result<Json<FilingDocument>, AppError> {
    let ticker = ticker.to_uppercase();
    let filing = market_queries::fetch_filing(&state.pool, &ticker, &document_key)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| {
            AppError::NotFound(format!("filing '{document_key}' for '{ticker}' not found"))
        })?;
    Ok(Json(filing))
}
