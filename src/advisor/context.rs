//! Turns the user's records into the plain-text summary that is sent along with each question.

use crate::aggregate::BalanceSummary;
use crate::model::{BudgetView, PotView, RecurringBill, Transaction};
use std::fmt::Write;

/// The records the advisor describes to the model.
#[derive(Debug, Clone, Default)]
pub(crate) struct FinancialSnapshot {
    /// Computed over all transactions, not only the recent ones.
    pub(crate) balance: BalanceSummary,
    /// Newest first.
    pub(crate) recent_transactions: Vec<Transaction>,
    pub(crate) budgets: Vec<BudgetView>,
    /// Only bills that are still upcoming.
    pub(crate) upcoming_bills: Vec<RecurringBill>,
    pub(crate) pots: Vec<PotView>,
}

pub(crate) fn build_context(snapshot: &FinancialSnapshot) -> String {
    let mut s = String::from("Here is a summary of my finances.\n\n");
    let b = &snapshot.balance;
    // Writing to a String cannot fail.
    let _ = writeln!(
        s,
        "Balance: {} (income {}, expenses {})",
        b.balance.money(),
        b.income.money(),
        b.expenses.money()
    );

    section(&mut s, "Recent transactions (newest first)", &snapshot.recent_transactions, |t| {
        format!("{} {} [{}]: {}", t.date, t.name, t.category, t.amount.money())
    });
    section(&mut s, "Budgets", &snapshot.budgets, |v| {
        format!(
            "{}: spent {} of {}",
            v.budget.category,
            v.current.money(),
            v.budget.maximum.money()
        )
    });
    section(&mut s, "Upcoming bills", &snapshot.upcoming_bills, |bill| {
        format!("{}: {} due on day {}", bill.name, bill.amount.money(), bill.due_day)
    });
    section(&mut s, "Savings pots", &snapshot.pots, |v| {
        format!(
            "{}: {} of {} ({})",
            v.pot.name,
            v.pot.total.money(),
            v.pot.target.money(),
            v.percentage
        )
    });
    s
}

fn section<T>(s: &mut String, title: &str, items: &[T], line: impl Fn(&T) -> String) {
    let _ = writeln!(s, "\n{title}:");
    if items.is_empty() {
        s.push_str("- none\n");
    }
    for item in items {
        let _ = writeln!(s, "- {}", line(item));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{self, balance_summary};
    use crate::model::{Amount, BillStatus, Budget, Pot};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_empty_snapshot() {
        let context = build_context(&FinancialSnapshot::default());
        assert!(context.contains("Balance: $0.00 (income $0.00, expenses $0.00)"));
        assert_eq!(context.matches("- none").count(), 4);
    }

    #[test]
    fn test_full_snapshot() {
        let transactions = vec![Transaction {
            id: 1,
            name: "Savory Bites Bistro".to_string(),
            category: "Dining Out".to_string(),
            amount: amount("-55.50"),
            date: NaiveDate::from_ymd_opt(2024, 8, 19).unwrap(),
            avatar: None,
            is_recurring: false,
        }];
        let budgets = aggregate::budgets_with_spending(
            vec![Budget {
                id: 1,
                category: "Dining Out".to_string(),
                maximum: amount("75"),
                theme: "#F2CDAC".to_string(),
            }],
            &transactions,
        );
        let snapshot = FinancialSnapshot {
            balance: balance_summary(&transactions),
            recent_transactions: transactions,
            budgets,
            upcoming_bills: vec![RecurringBill {
                id: 1,
                name: "Spark Energy".to_string(),
                amount: amount("150"),
                due_day: 24,
                status: BillStatus::Upcoming,
                logo: None,
                theme: "#277C78".to_string(),
            }],
            pots: vec![aggregate::pot_view(Pot {
                id: 1,
                name: "Holiday".to_string(),
                target: amount("1500"),
                total: amount("540"),
                theme: "#C94736".to_string(),
            })],
        };
        let context = build_context(&snapshot);
        assert!(context.contains("Balance: -$55.50"));
        assert!(context.contains("- 2024-08-19 Savory Bites Bistro [Dining Out]: -$55.50"));
        assert!(context.contains("- Dining Out: spent $55.50 of $75.00"));
        assert!(context.contains("- Spark Energy: $150.00 due on day 24"));
        assert!(context.contains("- Holiday: $540.00 of $1,500.00 (36.00%)"));
        assert!(!context.contains("- none"));
    }
}
