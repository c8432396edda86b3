//! Update command handlers. Updates are partial: only the fields that are present change, and
//! each of them is validated the same way as on insert.

use crate::aggregate;
use crate::args::{UpdateBillArgs, UpdateBudgetArgs, UpdatePotArgs, UpdateTransactionArgs};
use crate::commands::list::{budget_with_spending, not_found};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{
    BillChanges, BudgetChanges, BudgetView, PotChanges, PotView, RecurringBill, Transaction,
    TransactionChanges,
};
use crate::{Config, Result};
use tracing::debug;

/// Updates the fields of one transaction.
///
/// # Errors
/// - `Validation` if no field was given or a given field is invalid.
/// - `NotFound` if there is no transaction with this id.
pub async fn update_transaction(
    config: Config,
    args: UpdateTransactionArgs,
) -> Result<Out<Transaction>> {
    let changes = TransactionChanges::from_updates(&args.updates).pub_result(ErrorType::Validation)?;
    debug!("Updating transaction {} with {changes:?}", args.id);
    let transaction = config
        .db()
        .update_transaction(args.id, &changes)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| not_found("Transaction", args.id))?;
    Ok(Out::new(
        format!("Updated transaction {}", transaction.id),
        transaction,
    ))
}

pub async fn update_budget(config: Config, args: UpdateBudgetArgs) -> Result<Out<BudgetView>> {
    let changes = BudgetChanges::from_updates(&args.updates).pub_result(ErrorType::Validation)?;
    let db = config.db();
    let budget = db
        .update_budget(args.id, &changes)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| not_found("Budget", args.id))?;
    let view = budget_with_spending(db, budget)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(format!("Updated budget {}", args.id), view))
}

/// Updates a pot. Setting `total` overwrites the saved amount.
pub async fn update_pot(config: Config, args: UpdatePotArgs) -> Result<Out<PotView>> {
    let changes = PotChanges::from_updates(&args.updates).pub_result(ErrorType::Validation)?;
    let pot = config
        .db()
        .update_pot(args.id, &changes)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| not_found("Pot", args.id))?;
    Ok(Out::new(
        format!("Updated pot {}", args.id),
        aggregate::pot_view(pot),
    ))
}

pub async fn update_bill(config: Config, args: UpdateBillArgs) -> Result<Out<RecurringBill>> {
    let changes = BillChanges::from_updates(&args.updates).pub_result(ErrorType::Validation)?;
    let bill = config
        .db()
        .update_bill(args.id, &changes)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| not_found("Recurring bill", args.id))?;
    Ok(Out::new(format!("Updated recurring bill {}", args.id), bill))
}
