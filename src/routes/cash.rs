use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::db::cash_queries;
use crate::errors::AppError;
use crate::models::{
    BulkReplaceCashTransactions, CapitalPerformance, CashAccount, CashLedgerResponse,
    CashLedgerSummary, CashTransaction, CashTransactionInput, TransferRequest, UpdateCashAccount,
};
use crate::services::cash_ledger;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/portfolios/:name/cash-transactions",
            get(fetch_ledger).post(add_transaction).put(replace_ledger),
        )
        .route(
            "/portfolios/:name/cash-transactions/transfer",
            post(transfer),
        )
        .route(
            "/portfolios/:name/cash-transactions/performance",
            get(capital_performance),
        )
        .route(
            "/portfolios/:name/cash-transactions/:id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        .route("/portfolios/:name/cash-summary", get(cash_summary))
        .route("/portfolios/:name/cash-accounts", get(list_accounts))
        .route("/portfolios/:name/cash-accounts/:name", post(update_account))
}

async fn fetch_ledger(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CashLedgerResponse>, AppError> {
    Ok(Json(cash_ledger::build_response(&state.pool, &name).await?))
}

async fn add_transaction(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<CashTransactionInput>,
) -> Result<(StatusCode, Json<CashLedgerResponse>), AppError> {
    let response = cash_ledger::add_transaction(&state.pool, &name, body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn replace_ledger(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<BulkReplaceCashTransactions>,
) -> Result<Json<CashLedgerResponse>, AppError> {
    Ok(Json(
        cash_ledger::replace_all(&state.pool, &name, body.items, body.notes).await?,
    ))
}

async fn get_transaction(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<CashTransaction>, AppError> {
    let txn = cash_queries::fetch_transaction(&state.pool, &name, &id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("cash transaction '{id}' not found")))?;
    Ok(Json(txn))
}

async fn update_transaction(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
    Json(body): Json<CashTransactionInput>,
) -> Result<Json<CashLedgerResponse>, AppError> {
    Ok(Json(
        cash_ledger::update_transaction(&state.pool, &name, &id, body).await?,
    ))
}

async fn delete_transaction(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<CashLedgerResponse>, AppError> {
    Ok(Json(cash_ledger::delete_transaction(&state.pool, &name, &id).await?))
}

async fn transfer(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<TransferRequest>,
) -> Result<Json<CashLedgerResponse>, AppError> {
    Ok(Json(cash_ledger::transfer(&state.pool, &name, body).await?))
}

async fn capital_performance(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CapitalPerformance>, AppError> {
    Ok(Json(cash_ledger::capital_performance(&state.pool, &name).await?))
}

async fn cash_summary(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CashLedgerSummary>, AppError> {
    let response = cash_ledger::build_response(&state.pool, &name).await?;
    Ok(Json(response.summary))
}

async fn list_accounts(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<CashAccount>>, AppError> {
    let response = cash_ledger::build_response(&state.pool, &name).await?;
    Ok(Json(response.accounts))
}

async fn update_account(
    State(state): State<AppState>,
    Path((portfolio_name, account_name)): Path<(String, String)>,
    Json(body): Json<UpdateCashAccount>,
) -> Result<Json<CashAccount>, AppError> {
    let existing = cash_queries::fetch_accounts(&state.pool, &portfolio_name)
        .await
        .map_err(AppError::from)?
        .into_iter()
        .find(|a| a.name == account_name);

    let default = CashAccount::default_for(&portfolio_name, &account_name);
    let account_type = body
        .account_type
        .or_else(|| existing.as_ref().map(|a| a.account_type.clone()))
        .unwrap_or(default.account_type);
    let currency = body
        .currency
        .or_else(|| existing.as_ref().map(|a| a.currency.clone()))
        .unwrap_or(default.currency);
    let is_transactional = body
        .is_transactional
        .or_else(|| existing.as_ref().map(|a| a.is_transactional))
        .unwrap_or(default.is_transactional);

    let account = cash_queries::upsert_account(
        &state.pool,
        &portfolio_name,
        &account_name,
        &account_type,
        is_transactional,
        &currency,
    )
    .await
    .map_err(AppError::from)?;

    Ok(Json(account))
}
