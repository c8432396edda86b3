//! Types that represent the core data model: transactions, budgets, savings pots and recurring
//! bills, plus the validated forms used to create and change them.
mod amount;
mod bill;
mod budget;
mod pot;
mod transaction;
mod validation;

pub use amount::{Amount, AmountError};
pub use bill::{BillChanges, BillStatus, NewBill, RecurringBill, DEFAULT_BILL_THEME};
pub use budget::{Budget, BudgetChanges, BudgetView, NewBudget, DEFAULT_BUDGET_THEME};
pub use pot::{NewPot, Pot, PotChanges, PotMovement, PotView, DEFAULT_POT_THEME};
pub use transaction::{default_avatar, NewTransaction, Transaction, TransactionChanges};
pub use validation::ValidationErrors;
