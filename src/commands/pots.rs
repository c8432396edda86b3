//! Moving money into and out of savings pots.

use crate::aggregate;
use crate::args::PotFundsArgs;
use crate::commands::list::not_found;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{PotMovement, PotView};
use crate::{Config, Result};

/// Adds `amount` to the pot. The total may go past the target.
pub async fn deposit(config: Config, args: PotFundsArgs) -> Result<Out<PotView>> {
    let movement = PotMovement::deposit(args.amount).pub_result(ErrorType::Validation)?;
    move_funds(config, args.id, movement).await
}

/// Takes `amount` out of the pot. Taking more than the pot holds leaves it at zero.
pub async fn withdraw(config: Config, args: PotFundsArgs) -> Result<Out<PotView>> {
    let movement = PotMovement::withdraw(args.amount).pub_result(ErrorType::Validation)?;
    move_funds(config, args.id, movement).await
}

async fn move_funds(config: Config, id: i64, movement: PotMovement) -> Result<Out<PotView>> {
    let pot = config
        .db()
        .move_pot_funds(id, movement)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| not_found("Pot", id))?;
    let verb = match movement {
        PotMovement::Deposit(_) => "Added",
        PotMovement::Withdraw(_) => "Withdrew",
    };
    let view = aggregate::pot_view(pot);
    let message = format!(
        "{verb} {} for '{}', which now holds {} ({} of its target)",
        movement.amount().money(),
        view.pot.name,
        view.pot.total.money(),
        view.percentage
    );
    Ok(Out::new(message, view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::InsertPotArgs;
    use crate::commands::insert_pot;
    use crate::model::Amount;
    use crate::test::TestEnv;
    use std::str::FromStr;

    fn funds(id: i64, value: &str) -> PotFundsArgs {
        PotFundsArgs {
            id,
            amount: Amount::from_str(value).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_deposit_then_withdraw_clamps() {
        let env = TestEnv::new().await;
        let pot = insert_pot(
            env.config(),
            InsertPotArgs {
                name: "Gift".to_string(),
                target: Amount::from_str("100").unwrap(),
                theme: None,
            },
        )
        .await
        .unwrap()
        .into_structure()
        .unwrap();
        let id = pot.pot.id;

        let out = deposit(env.config(), funds(id, "40")).await.unwrap();
        let view = out.structure().unwrap();
        assert_eq!(view.pot.total, Amount::from_str("40").unwrap());
        assert_eq!(view.percentage.to_string(), "40.00%");
        assert_eq!(
            out.message(),
            "Added $40.00 for 'Gift', which now holds $40.00 (40.00% of its target)"
        );

        let out = withdraw(env.config(), funds(id, "60")).await.unwrap();
        let view = out.structure().unwrap();
        assert_eq!(view.pot.total, Amount::ZERO);
        assert_eq!(view.percentage.to_string(), "0.00%");
    }

    #[tokio::test]
    async fn test_amount_must_be_positive() {
        let env = TestEnv::seeded().await;
        for value in ["0", "-5"] {
            let err = deposit(env.config(), funds(1, value)).await.unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Validation);
            assert!(err.validation_errors().unwrap().has("amount"));
        }
    }

    #[tokio::test]
    async fn test_missing_pot() {
        let env = TestEnv::new().await;
        let err = withdraw(env.config(), funds(3, "1")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
    }
}
