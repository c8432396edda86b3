//! Read-only command handlers: list every record of a kind, or fetch one by id.
//!
//! Budgets and pots are returned together with their derived fields, which are computed fresh on
//! every call.

use crate::aggregate;
use crate::args::IdArgs;
use crate::commands::{plural, Out};
use crate::db::Db;
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{Budget, BudgetView, PotView, RecurringBill, Transaction};
use crate::{Config, Error, Result};

pub async fn list_transactions(config: Config) -> Result<Out<Vec<Transaction>>> {
    let transactions = config
        .db()
        .list_transactions()
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!(
        "Found {}",
        plural(transactions.len(), "transaction", "transactions")
    );
    Ok(Out::new(message, transactions))
}

pub async fn list_budgets(config: Config) -> Result<Out<Vec<BudgetView>>> {
    let db = config.db();
    let budgets = db.list_budgets().await.pub_result(ErrorType::Database)?;
    let transactions = db.list_transactions().await.pub_result(ErrorType::Database)?;
    let views = aggregate::budgets_with_spending(budgets, &transactions);
    let message = format!("Found {}", plural(views.len(), "budget", "budgets"));
    Ok(Out::new(message, views))
}

pub async fn list_pots(config: Config) -> Result<Out<Vec<PotView>>> {
    let pots = config.db().list_pots().await.pub_result(ErrorType::Database)?;
    let views: Vec<PotView> = pots.into_iter().map(aggregate::pot_view).collect();
    let message = format!("Found {}", plural(views.len(), "pot", "pots"));
    Ok(Out::new(message, views))
}

pub async fn list_bills(config: Config) -> Result<Out<Vec<RecurringBill>>> {
    let bills = config.db().list_bills().await.pub_result(ErrorType::Database)?;
    let message = format!(
        "Found {}",
        plural(bills.len(), "recurring bill", "recurring bills")
    );
    Ok(Out::new(message, bills))
}

pub async fn get_transaction(config: Config, args: IdArgs) -> Result<Out<Transaction>> {
    let transaction = config
        .db()
        .get_transaction(args.id)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| not_found("Transaction", args.id))?;
    Ok(Out::new(
        format!("Found transaction {}", transaction.id),
        transaction,
    ))
}

pub async fn get_budget(config: Config, args: IdArgs) -> Result<Out<BudgetView>> {
    let db = config.db();
    let budget = db
        .get_budget(args.id)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| not_found("Budget", args.id))?;
    let view = budget_with_spending(db, budget)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(format!("Found budget {}", args.id), view))
}

pub async fn get_pot(config: Config, args: IdArgs) -> Result<Out<PotView>> {
    let pot = config
        .db()
        .get_pot(args.id)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| not_found("Pot", args.id))?;
    Ok(Out::new(
        format!("Found pot {}", args.id),
        aggregate::pot_view(pot),
    ))
}

pub async fn get_bill(config: Config, args: IdArgs) -> Result<Out<RecurringBill>> {
    let bill = config
        .db()
        .get_bill(args.id)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| not_found("Recurring bill", args.id))?;
    Ok(Out::new(format!("Found recurring bill {}", args.id), bill))
}

/// Computes `current` for a single budget from the stored transactions.
pub(super) async fn budget_with_spending(db: &Db, budget: Budget) -> Res<BudgetView> {
    let transactions = db.list_transactions().await?;
    let spent = aggregate::budget_spent(&budget, &transactions);
    Ok(aggregate::budget_view(budget, spent))
}

pub(super) fn not_found(kind: &str, id: i64) -> Error {
    Error::not_found(format!("{kind} {id} was not found"))
}
