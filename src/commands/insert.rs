//! Insert command handlers.

use crate::aggregate;
use crate::args::{InsertBillArgs, InsertBudgetArgs, InsertPotArgs, InsertTransactionArgs};
use crate::commands::list::budget_with_spending;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{
    BudgetView, NewBill, NewBudget, NewPot, NewTransaction, PotView, RecurringBill, Transaction,
};
use crate::{Config, Result};

/// Inserts a new transaction. A positive amount is income, a negative amount is an expense.
///
/// # Errors
/// - Returns a `Validation` error if any field is invalid.
/// - Returns a `Database` error if the insert fails.
pub async fn insert_transaction(
    config: Config,
    args: InsertTransactionArgs,
) -> Result<Out<Transaction>> {
    let new = NewTransaction::from_args(&args).pub_result(ErrorType::Validation)?;
    let transaction = config
        .db()
        .insert_transaction(&new)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!(
        "Inserted transaction {} ({} {})",
        transaction.id,
        transaction.name,
        transaction.amount.money()
    );
    Ok(Out::new(message, transaction))
}

/// Inserts a new budget. The returned budget already counts the existing expenses in its
/// category.
pub async fn insert_budget(config: Config, args: InsertBudgetArgs) -> Result<Out<BudgetView>> {
    let new = NewBudget::from_args(&args).pub_result(ErrorType::Validation)?;
    let db = config.db();
    let budget = db.insert_budget(&new).await.pub_result(ErrorType::Database)?;
    let view = budget_with_spending(db, budget)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!(
        "Inserted budget {} for '{}'",
        view.budget.id, view.budget.category
    );
    Ok(Out::new(message, view))
}

/// Inserts a new, empty savings pot.
pub async fn insert_pot(config: Config, args: InsertPotArgs) -> Result<Out<PotView>> {
    let new = NewPot::from_args(&args).pub_result(ErrorType::Validation)?;
    let pot = config
        .db()
        .insert_pot(&new)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!("Inserted pot {} '{}'", pot.id, pot.name);
    Ok(Out::new(message, aggregate::pot_view(pot)))
}

pub async fn insert_bill(config: Config, args: InsertBillArgs) -> Result<Out<RecurringBill>> {
    let new = NewBill::from_args(&args).pub_result(ErrorType::Validation)?;
    let bill = config
        .db()
        .insert_bill(&new)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!("Inserted recurring bill {} '{}'", bill.id, bill.name);
    Ok(Out::new(message, bill))
}
