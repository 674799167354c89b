use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashCategory {
    Contribution,
    Dividend,
    Transfer,
    Fee,
    Other,
}

impl CashCategory {
    pub const ALL: [CashCategory; 5] = [
        CashCategory::Contribution,
        CashCategory::Dividend,
        CashCategory::Transfer,
        CashCategory::Fee,
        CashCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CashCategory::Contribution => "contribution",
            CashCategory::Dividend => "dividend",
            CashCategory::Transfer => "transfer",
            CashCategory::Fee => "fee",
            CashCategory::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "contribution" => Some(CashCategory::Contribution),
            "dividend" => Some(CashCategory::Dividend),
            "transfer" => Some(CashCategory::Transfer),
            "fee" => Some(CashCategory::Fee),
            "other" => Some(CashCategory::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CashTransaction {
    pub id: String,
    #[serde(skip_serializing)]
    pub portfolio_name: String,
    pub account: String,
    pub category: String,
    pub date: chrono::NaiveDate,
    pub amount: f64,
    pub description: String,
    pub notes: Option<String>,
    pub linked_id: Option<String>,
    #[serde(skip)]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Body shape for `POST`/`PUT .../cash-transactions`. Any `id` field present
/// in the body is accepted but always ignored — the server always mints a
/// fresh `ct_*` id.
#[derive(Debug, Clone, Deserialize)]
pub struct CashTransactionInput {
    #[serde(default)]
    pub id: Option<String>,
    pub account: String,
    pub category: String,
    pub date: chrono::NaiveDate,
    pub amount: f64,
    pub description: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub linked_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkReplaceCashTransactions {
    pub items: Vec<CashTransactionInput>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferRequest {
    pub from_account: String,
    pub to_account: String,
    pub amount: f64,
    pub date: chrono::NaiveDate,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CashAccount {
    #[serde(skip_serializing)]
    pub portfolio_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub is_transactional: bool,
    pub currency: String,
    #[serde(skip)]
    #[sqlx(default)]
    pub balance: f64,
}

impl CashAccount {
    pub fn default_for(portfolio_name: &str, name: &str) -> Self {
        let is_transactional = name.eq_ignore_ascii_case("trading");
        Self {
            portfolio_name: portfolio_name.to_string(),
            name: name.to_string(),
            account_type: "cash".to_string(),
            is_transactional,
            currency: "AUD".to_string(),
            balance: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCashAccount {
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    pub currency: Option<String>,
    pub is_transactional: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashLedgerSummary {
    pub total_cash: f64,
    pub transaction_count: usize,
    pub by_category: HashMap<String, f64>,
    pub total_cash_by_currency: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashLedgerResponse {
    pub transactions: Vec<CashTransaction>,
    pub accounts: Vec<CashAccount>,
    pub notes: String,
    pub summary: CashLedgerSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapitalPerformance {
    pub total_deposited: f64,
    pub total_withdrawn: f64,
    pub net_capital_deployed: f64,
    pub current_portfolio_value: f64,
    pub simple_return_pct: f64,
    pub annualized_return_pct: f64,
    pub transaction_count: usize,
    pub first_transaction_date: Option<chrono::NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_as_str_round_trips_through_from_str() {
        for category in CashCategory::ALL {
            assert_eq!(CashCategory::from_str(category.as_str()), Some(category));
        }
    }

    #[test]
    fn unknown_category_string_is_none() {
        assert_eq!(CashCategory::from_str("withdrawal"), None);
    }

    #[test]
    fn default_account_for_trading_is_transactional() {
        let account = CashAccount::default_for("growth", "Trading");
        assert!(account.is_transactional);
        assert_eq!(account.currency, "AUD");
        assert_eq!(account.balance, 0.0);
    }

    #[test]
    fn default_account_for_non_trading_is_not_transactional() {
        let account = CashAccount::default_for("growth", "Savings");
        assert!(!account.is_transactional);
    }
}
