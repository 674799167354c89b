use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{cash_queries, portfolio_queries};
use crate::errors::AppError;
use crate::models::{
    CapitalPerformance, CashAccount, CashCategory, CashLedgerResponse, CashLedgerSummary,
    CashTransaction, CashTransactionInput, TransferRequest,
};

fn new_transaction_id() -> String {
    format!("ct_{}", Uuid::new_v4())
}

fn validate_input(input: &CashTransactionInput) -> Result<CashCategory, AppError> {
    if input.account.trim().is_empty() {
        return Err(AppError::Validation("account must not be empty".into()));
    }
    let category = CashCategory::from_str(&input.category)
        .ok_or_else(|| AppError::Validation(format!("unknown category '{}'", input.category)))?;
    if input.date > Utc::now().date_naive() {
        return Err(AppError::Validation("date must not be in the future".into()));
    }
    if input.amount == 0.0 {
        return Err(AppError::Validation("amount must be non-zero".into()));
    }
    if input.description.trim().is_empty() {
        return Err(AppError::Validation("description must not be blank".into()));
    }
    Ok(category)
}

async fn ensure_account(
    pool: &PgPool,
    portfolio_name: &str,
    account: &str,
) -> Result<(), AppError> {
    let existing = cash_queries::fetch_accounts(pool, portfolio_name)
        .await
        .map_err(AppError::from)?;
    if existing.iter().any(|a| a.name == account) {
        return Ok(());
    }
    let default = CashAccount::default_for(portfolio_name, account);
    cash_queries::upsert_account(
        pool,
        portfolio_name,
        &default.name,
        &default.account_type,
        default.is_transactional,
        &default.currency,
    )
    .await
    .map_err(AppError::from)?;
    Ok(())
}

pub async fn add_transaction(
    pool: &PgPool,
    portfolio_name: &str,
    input: CashTransactionInput,
) -> Result<CashLedgerResponse, AppError> {
    validate_input(&input)?;
    ensure_account(pool, portfolio_name, &input.account).await?;

    let txn = CashTransaction {
        id: new_transaction_id(),
        portfolio_name: portfolio_name.to_string(),
        account: input.account,
        category: input.category,
        date: input.date,
        amount: input.amount,
        description: input.description,
        notes: input.notes,
        linked_id: input.linked_id,
        created_at: Utc::now(),
    };
    cash_queries::insert_transaction(pool, &txn)
        .await
        .map_err(AppError::from)?;

    build_response(pool, portfolio_name).await
}

pub async fn replace_all(
    pool: &PgPool,
    portfolio_name: &str,
    items: Vec<CashTransactionInput>,
    notes: Option<String>,
) -> Result<CashLedgerResponse, AppError> {
    let mut transactions = Vec::with_capacity(items.len());
    for input in &items {
        validate_input(input)?;
    }
    for input in items {
        ensure_account(pool, portfolio_name, &input.account).await?;
        transactions.push(CashTransaction {
            id: new_transaction_id(),
            portfolio_name: portfolio_name.to_string(),
            account: input.account,
            category: input.category,
            date: input.date,
            amount: input.amount,
            description: input.description,
            notes: input.notes,
            linked_id: input.linked_id,
            created_at: Utc::now(),
        });
    }

    cash_queries::replace_all(pool, portfolio_name, &transactions, notes.as_deref())
        .await
        .map_err(AppError::from)?;

    build_response(pool, portfolio_name).await
}

pub async fn delete_transaction(
    pool: &PgPool,
    portfolio_name: &str,
    id: &str,
) -> Result<CashLedgerResponse, AppError> {
    let transactions = cash_queries::fetch_transactions(pool, portfolio_name)
        .await
        .map_err(AppError::from)?;
    let target = transactions
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| AppError::NotFound(format!("cash transaction '{id}' not found")))?;

    cash_queries::delete_transaction(pool, portfolio_name, id)
        .await
        .map_err(AppError::from)?;

    if let Some(linked_id) = &target.linked_id {
        cash_queries::delete_transaction(pool, portfolio_name, linked_id)
            .await
            .map_err(AppError::from)?;
    }

    build_response(pool, portfolio_name).await
}

pub async fn update_transaction(
    pool: &PgPool,
    portfolio_name: &str,
    id: &str,
    input: CashTransactionInput,
) -> Result<CashLedgerResponse, AppError> {
    validate_input(&input)?;
    ensure_account(pool, portfolio_name, &input.account).await?;

    let updated = cash_queries::update_transaction(
        pool,
        portfolio_name,
        id,
        &input.account,
        &input.category,
        input.date,
        input.amount,
        &input.description,
        input.notes.as_deref(),
    )
    .await
    .map_err(AppError::from)?;

    if updated.is_none() {
        return Err(AppError::NotFound(format!("cash transaction '{id}' not found")));
    }

    build_response(pool, portfolio_name).await
}

pub async fn transfer(
    pool: &PgPool,
    portfolio_name: &str,
    req: TransferRequest,
) -> Result<CashLedgerResponse, AppError> {
    if req.from_account.trim().is_empty() || req.to_account.trim().is_empty() {
        return Err(AppError::Validation("from_account and to_account are required".into()));
    }
    if req.from_account == req.to_account {
        return Err(AppError::Validation("from_account and to_account must differ".into()));
    }
    if req.amount <= 0.0 {
        return Err(AppError::Validation("amount must be positive".into()));
    }

    ensure_account(pool, portfolio_name, &req.from_account).await?;
    ensure_account(pool, portfolio_name, &req.to_account).await?;

    let debit_id = new_transaction_id();
    let credit_id = new_transaction_id();
    let now = Utc::now();

    let debit = CashTransaction {
        id: debit_id.clone(),
        portfolio_name: portfolio_name.to_string(),
        account: req.from_account,
        category: "transfer".to_string(),
        date: req.date,
        amount: -req.amount,
        description: req.description.clone(),
        notes: None,
        linked_id: Some(credit_id.clone()),
        created_at: now,
    };
    let credit = CashTransaction {
        id: credit_id.clone(),
        portfolio_name: portfolio_name.to_string(),
        account: req.to_account,
        category: "transfer".to_string(),
        date: req.date,
        amount: req.amount,
        description: req.description,
        notes: None,
        linked_id: Some(debit_id),
        created_at: now,
    };

    cash_queries::insert_transaction(pool, &debit)
        .await
        .map_err(AppError::from)?;
    cash_queries::insert_transaction(pool, &credit)
        .await
        .map_err(AppError::from)?;

    build_response(pool, portfolio_name).await
}

pub async fn build_response(
    pool: &PgPool,
    portfolio_name: &str,
) -> Result<CashLedgerResponse, AppError> {
    portfolio_queries::fetch(pool, portfolio_name)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("portfolio '{portfolio_name}' not found")))?;

    let transactions = cash_queries::fetch_transactions(pool, portfolio_name)
        .await
        .map_err(AppError::from)?;
    let mut accounts = cash_queries::fetch_accounts(pool, portfolio_name)
        .await
        .map_err(AppError::from)?;
    let notes = cash_queries::fetch_notes(pool, portfolio_name)
        .await
        .map_err(AppError::from)?;

    if !accounts.iter().any(|a| a.name == "Trading") {
        accounts.push(CashAccount::default_for(portfolio_name, "Trading"));
    }

    for account in &mut accounts {
        account.balance = transactions
            .iter()
            .filter(|t| t.account == account.name)
            .map(|t| t.amount)
            .sum();
    }

    let summary = summarize(&transactions, &accounts);

    Ok(CashLedgerResponse {
        transactions,
        accounts,
        notes,
        summary,
    })
}

pub fn summarize(transactions: &[CashTransaction], accounts: &[CashAccount]) -> CashLedgerSummary {
    let mut by_category: HashMap<String, f64> = CashCategory::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), 0.0))
        .collect();

    for txn in transactions {
        *by_category.entry(txn.category.clone()).or_insert(0.0) += txn.amount;
    }

    let total_cash: f64 = transactions.iter().map(|t| t.amount).sum();

    let mut total_cash_by_currency: HashMap<String, f64> = HashMap::new();
    for account in accounts {
        *total_cash_by_currency.entry(account.currency.clone()).or_insert(0.0) += account.balance;
    }

    CashLedgerSummary {
        total_cash,
        transaction_count: transactions.len(),
        by_category,
        total_cash_by_currency,
    }
}

pub async fn capital_performance(
    pool: &PgPool,
    portfolio_name: &str,
) -> Result<CapitalPerformance, AppError> {
    let portfolio = portfolio_queries::fetch(pool, portfolio_name)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("portfolio '{portfolio_name}' not found")))?;
    let transactions = cash_queries::fetch_transactions(pool, portfolio_name)
        .await
        .map_err(AppError::from)?;

    let current_portfolio_value = portfolio.total_value_holdings + portfolio.external_balance_total;

    if transactions.is_empty() {
        let trades = portfolio_queries::fetch_brokerage_trades(pool, portfolio_name)
            .await
            .map_err(AppError::from)?;
        if trades.is_empty() {
            return Ok(CapitalPerformance {
                total_deposited: 0.0,
                total_withdrawn: 0.0,
                net_capital_deployed: 0.0,
                current_portfolio_value,
                simple_return_pct: 0.0,
                annualized_return_pct: 0.0,
                transaction_count: 0,
                first_transaction_date: None,
            });
        }

        let total_deposited: f64 = trades
            .iter()
            .filter(|(_, side, _, _)| side == "buy")
            .map(|(_, _, qty, price)| qty * price)
            .sum();
        let net_capital_deployed = total_deposited;
        let simple_return_pct = if net_capital_deployed > 0.0 {
            (current_portfolio_value - net_capital_deployed) / net_capital_deployed * 100.0
        } else {
            0.0
        };
        let first_date = trades.first().map(|(executed_at, ..)| executed_at.date_naive());

        return Ok(CapitalPerformance {
            total_deposited,
            total_withdrawn: 0.0,
            net_capital_deployed,
            current_portfolio_value,
            simple_return_pct,
            annualized_return_pct: annualize(simple_return_pct, first_date),
            transaction_count: trades.len(),
            first_transaction_date: first_date,
        });
    }

    let contributions: Vec<f64> = transactions
        .iter()
        .filter(|t| t.category == "contribution")
        .map(|t| t.amount)
        .collect();

    let total_deposited: f64 = contributions.iter().filter(|a| **a > 0.0).sum();
    let total_withdrawn: f64 = contributions.iter().filter(|a| **a < 0.0).map(|a| a.abs()).sum();
    let net_capital_deployed = total_deposited - total_withdrawn;

    let simple_return_pct = if net_capital_deployed != 0.0 {
        (current_portfolio_value - net_capital_deployed) / net_capital_deployed * 100.0
    } else {
        0.0
    };
    let first_transaction_date = transactions.iter().map(|t| t.date).min();

    Ok(CapitalPerformance {
        total_deposited,
        total_withdrawn,
        net_capital_deployed,
        current_portfolio_value,
        simple_return_pct,
        annualized_return_pct: annualize(simple_return_pct, first_transaction_date),
        transaction_count: transactions.len(),
        first_transaction_date,
    })
}

fn annualize(simple_return_pct: f64, first_date: Option<chrono::NaiveDate>) -> f64 {
    let Some(first_date) = first_date else {
        return 0.0;
    };
    let days = (Utc::now().date_naive() - first_date).num_days().max(1) as f64;
    let years = days / 365.25;
    if years <= 0.0 {
        return simple_return_pct;
    }
    ((1.0 + simple_return_pct / 100.0).powf(1.0 / years) - 1.0) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_input(category: &str, amount: f64) -> CashTransactionInput {
        CashTransactionInput {
            id: None,
            account: "Trading".to_string(),
            category: category.to_string(),
            date: Utc::now().date_naive(),
            amount,
            description: "test".to_string(),
            notes: None,
            linked_id: None,
        }
    }

    #[test]
    fn rejects_unknown_category() {
        let input = sample_input("withdrawal", 10.0);
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn rejects_future_dated_transactions() {
        let mut input = sample_input("contribution", 10.0);
        input.date = Utc::now().date_naive() + chrono::Duration::days(1);
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn rejects_zero_amount() {
        let input = sample_input("contribution", 0.0);
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn rejects_blank_account_and_description() {
        let mut input = sample_input("contribution", 10.0);
        input.account = "  ".to_string();
        assert!(validate_input(&input).is_err());

        let mut input = sample_input("contribution", 10.0);
        input.description = "".to_string();
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn accepts_a_well_formed_input() {
        let input = sample_input("dividend", 42.0);
        assert_eq!(validate_input(&input).unwrap(), CashCategory::Dividend);
    }

    fn txn(category: &str, account: &str, amount: f64) -> CashTransaction {
        CashTransaction {
            id: format!("ct_{account}_{amount}"),
            portfolio_name: "growth".to_string(),
            account: account.to_string(),
            category: category.to_string(),
            date: Utc::now().date_naive(),
            amount,
            description: "test".to_string(),
            notes: None,
            linked_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn summarize_aggregates_by_category_and_currency() {
        let transactions = vec![
            txn("contribution", "Trading", 1000.0),
            txn("fee", "Trading", -5.0),
            txn("dividend", "Trading", 20.0),
        ];
        let mut accounts = vec![CashAccount::default_for("growth", "Trading")];
        accounts[0].balance = transactions.iter().map(|t| t.amount).sum();

        let summary = summarize(&transactions, &accounts);
        assert_eq!(summary.transaction_count, 3);
        assert_eq!(summary.total_cash, 1015.0);
        assert_eq!(summary.by_category["contribution"], 1000.0);
        assert_eq!(summary.by_category["fee"], -5.0);
        assert_eq!(summary.by_category["dividend"], 20.0);
        assert_eq!(summary.total_cash_by_currency["AUD"], 1015.0);
    }

    #[test]
    fn summarize_with_no_transactions_is_zeroed_but_categorized() {
        let summary = summarize(&[], &[]);
        assert_eq!(summary.total_cash, 0.0);
        assert_eq!(summary.transaction_count, 0);
        assert_eq!(summary.by_category.len(), CashCategory::ALL.len());
    }

    #[test]
    fn annualize_of_no_first_date_is_zero() {
        assert_eq!(annualize(50.0, None), 0.0);
    }

    #[test]
    fn annualize_over_one_year_approaches_simple_return() {
        let one_year_ago = (Utc::now() - chrono::Duration::days(365)).date_naive();
        let result = annualize(10.0, Some(one_year_ago));
        assert!((result - 10.0).abs() < 1.0);
    }

    #[test]
    fn annualize_handles_a_date_in_the_future_gracefully() {
        let tomorrow = NaiveDate::from_ymd_opt(9999, 1, 1).unwrap();
        let result = annualize(10.0, Some(tomorrow));
        assert!(result.is_finite());
    }
}
