//! Derived figures computed from stored records.
//!
//! Everything here is a pure function of its inputs. Nothing is cached and nothing is written
//! back, so a derived value can never be stale: callers load the records and recompute.

use crate::model::{Amount, Budget, BudgetView, Pot, PotView, RecurringBill, Transaction};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// How far a pot is towards its target, from 0 to 100 with two fraction digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percentage(Decimal);

impl Percentage {
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

impl Serialize for Percentage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.0.to_f64().unwrap_or_default())
    }
}

/// The amount spent against `budget`: the sum of the absolute values of all negative
/// transactions whose category equals the budget's category exactly.
pub fn budget_spent(budget: &Budget, transactions: &[Transaction]) -> Amount {
    transactions
        .iter()
        .filter(|t| t.is_expense() && t.category == budget.category)
        .map(|t| t.amount.abs())
        .sum()
}

/// Attaches `current` and `remaining` to every budget.
pub fn budgets_with_spending(budgets: Vec<Budget>, transactions: &[Transaction]) -> Vec<BudgetView> {
    let mut spent: HashMap<&str, Amount> = HashMap::new();
    for t in transactions.iter().filter(|t| t.is_expense()) {
        let entry = spent.entry(t.category.as_str()).or_default();
        *entry = *entry + t.amount.abs();
    }

    budgets
        .into_iter()
        .map(|budget| {
            let current = spent
                .get(budget.category.as_str())
                .copied()
                .unwrap_or_default();
            budget_view(budget, current)
        })
        .collect()
}

/// Builds the view of one budget from an already computed `current`.
pub fn budget_view(budget: Budget, current: Amount) -> BudgetView {
    let left = budget.maximum - current;
    let remaining = if left.is_negative() { Amount::ZERO } else { left };
    BudgetView {
        budget,
        current,
        remaining,
    }
}

/// `total / target * 100`, clamped to `[0, 100]`. A zero target gives zero.
pub fn pot_percentage(total: Amount, target: Amount) -> Percentage {
    if target.is_zero() {
        return Percentage::default();
    }
    if target.is_positive() && total >= target {
        return Percentage(Decimal::ONE_HUNDRED);
    }
    let Some(ratio) = total.value().checked_div(target.value()) else {
        return Percentage::default();
    };
    let percent = ratio
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(if ratio.is_sign_negative() {
            Decimal::ZERO
        } else {
            Decimal::ONE_HUNDRED
        })
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Percentage(percent)
}

pub fn pot_view(pot: Pot) -> PotView {
    let percentage = pot_percentage(pot.total, pot.target);
    PotView { pot, percentage }
}

/// Income, expenses and their difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BalanceSummary {
    /// The sum of all positive amounts.
    pub income: Amount,
    /// The sum of the absolute values of all negative amounts.
    pub expenses: Amount,
    pub balance: Amount,
}

pub fn balance_summary(transactions: &[Transaction]) -> BalanceSummary {
    let income: Amount = transactions
        .iter()
        .filter(|t| t.is_income())
        .map(|t| t.amount)
        .sum();
    let expenses: Amount = transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount.abs())
        .sum();
    BalanceSummary {
        income,
        expenses,
        balance: income - expenses,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BillSummary {
    pub total: Amount,
    pub paid_total: Amount,
    pub upcoming_total: Amount,
    pub paid_count: usize,
    pub upcoming_count: usize,
}

pub fn bill_summary(bills: &[RecurringBill]) -> BillSummary {
    bills.iter().fold(BillSummary::default(), |mut sum, bill| {
        sum.total = sum.total + bill.amount;
        if bill.is_paid() {
            sum.paid_total = sum.paid_total + bill.amount;
            sum.paid_count += 1;
        } else {
            sum.upcoming_total = sum.upcoming_total + bill.amount;
            sum.upcoming_count += 1;
        }
        sum
    })
}

/// Total saved across all pots.
pub fn pots_total(pots: &[Pot]) -> Amount {
    pots.iter().map(|p| p.total).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BudgetTotals {
    pub maximum: Amount,
    pub spent: Amount,
}

/// Everything the dashboard shows at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Overview {
    pub balance: BalanceSummary,
    pub budgets: BudgetTotals,
    pub bills: BillSummary,
    pub pots_total: Amount,
}

pub fn overview(
    transactions: &[Transaction],
    budgets: &[BudgetView],
    pots: &[Pot],
    bills: &[RecurringBill],
) -> Overview {
    Overview {
        balance: balance_summary(transactions),
        budgets: BudgetTotals {
            maximum: budgets.iter().map(|b| b.budget.maximum).sum(),
            spent: budgets.iter().map(|b| b.current).sum(),
        },
        bills: bill_summary(bills),
        pots_total: pots_total(pots),
    }
}
