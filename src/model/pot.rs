use crate::aggregate::Percentage;
use crate::args::{InsertPotArgs, PotUpdates};
use crate::model::{Amount, ValidationErrors};
use serde::Serialize;

/// The theme used when a pot is created without one.
pub const DEFAULT_POT_THEME: &str = "#277C78";

/// A savings goal. `total` is what has been put aside so far and is never negative. It may
/// exceed `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pot {
    pub id: i64,
    pub name: String,
    pub target: Amount,
    pub total: Amount,
    pub theme: String,
}

/// A pot together with its progress towards the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PotView {
    #[serde(flatten)]
    pub pot: Pot,
    pub percentage: Percentage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPot {
    pub name: String,
    pub target: Amount,
    pub theme: String,
}

impl NewPot {
    pub(crate) fn from_args(args: &InsertPotArgs) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = errors.text("name", &args.name);
        let target = errors.non_negative("target", args.target);
        let theme = args
            .theme
            .as_deref()
            .map(|v| errors.text("theme", v))
            .unwrap_or_else(|| DEFAULT_POT_THEME.to_string());
        errors.into_result()?;
        Ok(Self {
            name,
            target,
            theme,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PotChanges {
    pub name: Option<String>,
    pub target: Option<Amount>,
    pub total: Option<Amount>,
    pub theme: Option<String>,
}

impl PotChanges {
    pub(crate) fn from_updates(updates: &PotUpdates) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if updates.is_empty() {
            errors.add("id", "at least one field must be provided to update");
            return Err(errors);
        }
        let changes = Self {
            name: updates.name.as_deref().map(|v| errors.text("name", v)),
            target: updates.target.map(|v| errors.non_negative("target", v)),
            total: updates.total.map(|v| errors.non_negative("total", v)),
            theme: updates.theme.as_deref().map(|v| errors.text("theme", v)),
        };
        errors.into_result()?;
        Ok(changes)
    }
}

/// Money moved into or out of a pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PotMovement {
    Deposit(Amount),
    Withdraw(Amount),
}

impl PotMovement {
    /// Validates that the moved amount is greater than zero.
    pub(crate) fn deposit(amount: Amount) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.positive("amount", amount);
        errors.into_result().map(|_| Self::Deposit(amount))
    }

    pub(crate) fn withdraw(amount: Amount) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.positive("amount", amount);
        errors.into_result().map(|_| Self::Withdraw(amount))
    }

    pub fn amount(&self) -> Amount {
        match self {
            PotMovement::Deposit(amount) | PotMovement::Withdraw(amount) => *amount,
        }
    }

    /// The pot total after this movement. Withdrawing more than the pot holds empties it.
    pub fn apply(&self, total: Amount) -> Amount {
        match self {
            PotMovement::Deposit(amount) => total + *amount,
            PotMovement::Withdraw(amount) => {
                let remaining = total - *amount;
                if remaining.is_negative() {
                    Amount::ZERO
                } else {
                    remaining
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_deposit_then_withdraw_clamps() {
        let total = PotMovement::deposit(amount("40")).unwrap().apply(Amount::ZERO);
        assert_eq!(total, amount("40"));
        let total = PotMovement::withdraw(amount("60")).unwrap().apply(total);
        assert_eq!(total, Amount::ZERO);
    }

    #[test]
    fn test_movements_are_bounded() {
        let huge = amount("1000000000000000.01");
        assert!(PotMovement::deposit(huge).unwrap_err().has("amount"));
        assert!(PotMovement::withdraw(huge).unwrap_err().has("amount"));

        // a total that is already at the limit of Decimal saturates instead of overflowing
        let full = Amount::new(rust_decimal::Decimal::MAX);
        let total = PotMovement::deposit(Amount::MAX).unwrap().apply(full);
        assert_eq!(total, full);
    }

    #[test]
    fn test_deposit_may_exceed_target() {
        let total = PotMovement::deposit(amount("500")).unwrap().apply(amount("1500"));
        assert_eq!(total, amount("2000"));
    }

    #[test]
    fn test_movement_requires_positive_amount() {
        assert!(PotMovement::deposit(Amount::ZERO).unwrap_err().has("amount"));
        assert!(PotMovement::withdraw(amount("-5")).unwrap_err().has("amount"));
    }

    #[test]
    fn test_new_pot() {
        let args = InsertPotArgs {
            name: "Holiday".to_string(),
            target: amount("1500"),
            theme: Some("#C94736".to_string()),
        };
        let pot = NewPot::from_args(&args).unwrap();
        assert_eq!(pot.theme, "#C94736");

        let args = InsertPotArgs {
            name: "".to_string(),
            target: amount("-1"),
            theme: None,
        };
        let errors = NewPot::from_args(&args).unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("target"));
    }

    #[test]
    fn test_changes_reject_negative_total() {
        let updates = PotUpdates {
            total: Some(amount("-0.01")),
            ..Default::default()
        };
        assert!(PotChanges::from_updates(&updates).unwrap_err().has("total"));
    }
}
