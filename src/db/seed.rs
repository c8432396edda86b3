//! Demo records for a freshly created database.

use crate::db::Db;
use crate::error::Res;
use crate::model::{Amount, BillStatus, NewBill, NewBudget, NewPot, NewTransaction, PotMovement};
use anyhow::Context;
use chrono::NaiveDate;
use std::str::FromStr;
use tracing::debug;

/// How many records of each kind were inserted by [`Db::seed_demo_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SeedCounts {
    pub transactions: usize,
    pub budgets: usize,
    pub pots: usize,
    pub bills: usize,
}

const BUDGETS: &[(&str, &str, &str)] = &[
    ("Entertainment", "50.00", "#277C78"),
    ("Bills", "750.00", "#82C9D7"),
    ("Dining Out", "75.00", "#F2CDAC"),
    ("Personal Care", "100.00", "#626070"),
];

// name, target, total, theme
const POTS: &[(&str, &str, &str, &str)] = &[
    ("Savings", "2000.00", "159.00", "#277C78"),
    ("Concert Ticket", "150.00", "62.00", "#626070"),
    ("Gift", "60.00", "40.00", "#82C9D7"),
    ("New Laptop", "1000.00", "10.00", "#F2CDAC"),
    ("Holiday", "1500.00", "540.00", "#C94736"),
];

// name, due day, amount, status, logo, theme
const BILLS: &[(&str, u8, &str, BillStatus, &str, &str)] = &[
    ("Spark Energy", 24, "150.00", BillStatus::Upcoming, "⚡", "#277C78"),
    ("Serenity Spa", 28, "40.00", BillStatus::Upcoming, "🧖‍♀️", "#F2CDAC"),
    ("Platinum Gym", 1, "65.00", BillStatus::Paid, "💪", "#82C9D7"),
    ("Housing Rent", 5, "1200.00", BillStatus::Paid, "🏠", "#F2CDAC"),
    ("Spotify Premium", 15, "12.99", BillStatus::Paid, "🎵", "#626070"),
];

// name, category, amount, date, avatar
const TRANSACTIONS: &[(&str, &str, &str, &str, Option<&str>)] = &[
    ("Emma Richardson", "General", "75.50", "2024-08-19", Some("https://i.pravatar.cc/150?u=emma")),
    ("Savory Bites Bistro", "Dining Out", "-55.50", "2024-08-19", None),
    ("Daniel Carter", "General", "-42.30", "2024-08-18", Some("https://i.pravatar.cc/150?u=daniel")),
    ("Sun Park", "General", "120.00", "2024-08-17", Some("https://i.pravatar.cc/150?u=sun")),
    ("Urban Services Hub", "General", "-65.00", "2024-08-17", None),
];

fn amount(s: &str) -> Res<Amount> {
    Amount::from_str(s).with_context(|| format!("Bad demo amount '{s}'"))
}

impl Db {
    /// Inserts a small, fixed set of demo budgets, pots, bills and transactions.
    pub(crate) async fn seed_demo_data(&self) -> Res<SeedCounts> {
        let mut counts = SeedCounts::default();

        for (category, maximum, theme) in BUDGETS {
            self.insert_budget(&NewBudget {
                category: category.to_string(),
                maximum: amount(maximum)?,
                theme: theme.to_string(),
            })
            .await?;
            counts.budgets += 1;
        }

        for (name, target, total, theme) in POTS {
            let pot = self
                .insert_pot(&NewPot {
                    name: name.to_string(),
                    target: amount(target)?,
                    theme: theme.to_string(),
                })
                .await?;
            self.move_pot_funds(pot.id, PotMovement::Deposit(amount(total)?))
                .await?;
            counts.pots += 1;
        }

        for (name, due_day, value, status, logo, theme) in BILLS {
            self.insert_bill(&NewBill {
                name: name.to_string(),
                amount: amount(value)?,
                due_day: *due_day,
                status: *status,
                logo: Some(logo.to_string()),
                theme: theme.to_string(),
            })
            .await?;
            counts.bills += 1;
        }

        for (name, category, value, date, avatar) in TRANSACTIONS {
            let avatar = match avatar {
                Some(url) => url.to_string(),
                None => crate::model::default_avatar(name)?,
            };
            self.insert_transaction(&NewTransaction {
                name: name.to_string(),
                category: category.to_string(),
                amount: amount(value)?,
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d")?,
                avatar,
                is_recurring: false,
            })
            .await?;
            counts.transactions += 1;
        }

        debug!("Seeded demo data: {counts:?}");
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use crate::aggregate;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_seed_demo_data() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        let counts = db.seed_demo_data().await.unwrap();
        assert_eq!(counts.budgets, 4);
        assert_eq!(counts.pots, 5);
        assert_eq!(counts.bills, 5);
        assert_eq!(counts.transactions, 5);

        let transactions = db.list_transactions().await.unwrap();
        let views = aggregate::budgets_with_spending(db.list_budgets().await.unwrap(), &transactions);
        let dining = views
            .iter()
            .find(|v| v.budget.category == "Dining Out")
            .unwrap();
        assert_eq!(dining.current.to_string(), "55.50");

        let pots = db.list_pots().await.unwrap();
        assert_eq!(pots[0].name, "Savings");
        assert_eq!(pots[0].total.to_string(), "159.00");
        assert_eq!(aggregate::pots_total(&pots).to_string(), "811.00");
    }
}
