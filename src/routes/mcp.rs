use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/mcp/tools", get(list_tools))
}

/// Static tool catalog describing the MCP-facing surface of this service.
/// Not derived from stored state — it mirrors the route table this server
/// actually serves.
async fn list_tools() -> Json<Value> {
    Json(json!({
        "tools": [
            {"name": "get_portfolio", "description": "Fetch a portfolio snapshot with derived analytics."},
            {"name": "get_indicators", "description": "Compute technical indicators over a portfolio's value history."},
            {"name": "get_cash_ledger", "description": "Fetch a portfolio's cash ledger and summary."},
            {"name": "get_capital_performance", "description": "Compute capital-performance figures for a portfolio."},
            {"name": "get_stock", "description": "Fetch cached EOD price history for a ticker."},
            {"name": "read_filing", "description": "Read a cached filing document for a ticker by document key."},
            {"name": "submit_feedback", "description": "Record feedback about data quality or tool behavior."},
        ]
    }))
}
