//! The `ask` command: a question for the financial advisor.

use crate::advisor::{Advisor, FinancialSnapshot};
use crate::aggregate;
use crate::args::AskArgs;
use crate::commands::Out;
use crate::db::Db;
use crate::error::{ErrorType, IntoResult, Res};
use crate::{Config, Mode, Result};
use anyhow::Context;

/// Sends the question, the earlier turns and a summary of the stored records to the model. The
/// reply is the message of the returned `Out`.
///
/// # Errors
/// - `Validation` if the question is blank or too long, or a history turn is blank.
/// - `Config` if no API key is available in `Mode::Google`.
/// - `Upstream` if the model call fails. The message is the provider's own.
pub async fn ask(config: Config, mode: Mode, args: AskArgs) -> Result<Out<()>> {
    Advisor::validate(&args.question, &args.history).pub_result(ErrorType::Validation)?;
    let advisor_config = config.advisor_config().await?;
    let advisor = Advisor::new(advisor_config, mode).pub_result(ErrorType::Config)?;
    answer(&config, &advisor, &args).await
}

async fn answer(config: &Config, advisor: &Advisor, args: &AskArgs) -> Result<Out<()>> {
    let recent = advisor.config().recent_transactions as usize;
    let snapshot = financial_snapshot(config.db(), recent)
        .await
        .pub_result(ErrorType::Database)?;
    let reply = advisor
        .ask(&snapshot, &args.question, &args.history)
        .await
        .pub_result(ErrorType::Upstream)?;
    Ok(reply.into())
}

async fn financial_snapshot(db: &Db, recent: usize) -> Res<FinancialSnapshot> {
    let mut transactions = db
        .list_transactions()
        .await
        .context("Unable to read transactions for the advisor")?;
    let budgets = aggregate::budgets_with_spending(db.list_budgets().await?, &transactions);
    let pots = db.list_pots().await?.into_iter().map(aggregate::pot_view).collect();
    let upcoming_bills = db
        .list_bills()
        .await?
        .into_iter()
        .filter(|bill| !bill.is_paid())
        .collect();
    let balance = aggregate::balance_summary(&transactions);
    // already newest first
    transactions.truncate(recent);
    Ok(FinancialSnapshot {
        balance,
        recent_transactions: transactions,
        budgets,
        upcoming_bills,
        pots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::{AdvisorConfig, TestModel, Turn};
    use crate::test::TestEnv;

    fn args(question: &str) -> AskArgs {
        AskArgs {
            question: question.to_string(),
            history: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_ask_in_test_mode() {
        let env = TestEnv::seeded().await;
        let mut a = args("Can I afford a holiday?");
        a.history = vec![Turn::user("Hi"), Turn::model("Hello, big spender.")];
        let out = ask(env.config(), Mode::Testing, a).await.unwrap();
        assert_eq!(
            out.message(),
            "[test mode] 3 turn(s). Question: Can I afford a holiday?"
        );
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected_before_anything_else() {
        let env = TestEnv::new().await;
        // Google mode without a key would fail, so validation must come first.
        let err = ask(env.config(), Mode::Google, args("  ")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }

    #[tokio::test]
    async fn test_model_failure_is_upstream() {
        let env = TestEnv::new().await;
        let advisor = Advisor::with_model(
            AdvisorConfig::default(),
            Box::new(TestModel::failing("Quota exceeded for this project")),
        );
        let err = answer(&env.config(), &advisor, &args("Why?"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Upstream);
        assert_eq!(err.to_string(), "Quota exceeded for this project");
    }

    #[tokio::test]
    async fn test_snapshot_limits_recent_transactions() {
        let env = TestEnv::seeded().await;
        let db = env.config().db().clone();
        let all = db.list_transactions().await.unwrap();
        let snapshot = financial_snapshot(&db, 3).await.unwrap();
        assert_eq!(snapshot.recent_transactions, all[..3].to_vec());
        assert_eq!(snapshot.balance, aggregate::balance_summary(&all));
        assert!(snapshot.upcoming_bills.iter().all(|b| !b.is_paid()));
    }
}
