use crate::aggregate::{self, Overview};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult, Res};
use crate::{Config, Result};

/// Computes the dashboard figures: balance, budget totals, bill totals and total saved.
pub async fn summary(config: Config) -> Result<Out<Overview>> {
    let overview = load_overview(&config).await.pub_result(ErrorType::Database)?;
    let message = format!(
        "Balance {}, spent {} of {} budgeted, {} saved in pots, {} in upcoming bills",
        overview.balance.balance.money(),
        overview.budgets.spent.money(),
        overview.budgets.maximum.money(),
        overview.pots_total.money(),
        overview.bills.upcoming_total.money()
    );
    Ok(Out::new(message, overview))
}

async fn load_overview(config: &Config) -> Res<Overview> {
    let db = config.db();
    let transactions = db.list_transactions().await?;
    let budgets = aggregate::budgets_with_spending(db.list_budgets().await?, &transactions);
    let pots = db.list_pots().await?;
    let bills = db.list_bills().await?;
    Ok(aggregate::overview(&transactions, &budgets, &pots, &bills))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;
    use crate::test::TestEnv;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_summary_empty() {
        let env = TestEnv::new().await;
        let out = summary(env.config()).await.unwrap();
        assert_eq!(out.structure().unwrap(), &Overview::default());
    }

    #[tokio::test]
    async fn test_summary_seeded() {
        let env = TestEnv::seeded().await;
        let overview = summary(env.config()).await.unwrap().into_structure().unwrap();
        assert_eq!(overview.pots_total, Amount::from_str("811.00").unwrap());
        assert_eq!(
            overview.balance.balance,
            overview.balance.income - overview.balance.expenses
        );
        assert_eq!(
            overview.bills.total,
            overview.bills.paid_total + overview.bills.upcoming_total
        );
    }
}
