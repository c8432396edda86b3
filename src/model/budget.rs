use crate::args::{BudgetUpdates, InsertBudgetArgs};
use crate::model::{Amount, ValidationErrors};
use serde::Serialize;

/// The theme used when a budget is created without one.
pub const DEFAULT_BUDGET_THEME: &str = "#277C78";

/// A spending limit for one transaction category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Budget {
    pub id: i64,
    pub category: String,
    pub maximum: Amount,
    pub theme: String,
}

/// A budget together with what has been spent against it.
///
/// `current` is never stored. It is computed from the transactions each time a budget is read.
/// It is not capped at `maximum`; `remaining` is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetView {
    #[serde(flatten)]
    pub budget: Budget,
    pub current: Amount,
    pub remaining: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBudget {
    pub category: String,
    pub maximum: Amount,
    pub theme: String,
}

impl NewBudget {
    pub(crate) fn from_args(args: &InsertBudgetArgs) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let category = errors.text("category", &args.category);
        let maximum = errors.non_negative("maximum", args.maximum);
        let theme = args
            .theme
            .as_deref()
            .map(|v| errors.text("theme", v))
            .unwrap_or_else(|| DEFAULT_BUDGET_THEME.to_string());
        errors.into_result()?;
        Ok(Self {
            category,
            maximum,
            theme,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetChanges {
    pub category: Option<String>,
    pub maximum: Option<Amount>,
    pub theme: Option<String>,
}

impl BudgetChanges {
    pub(crate) fn from_updates(updates: &BudgetUpdates) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if updates.is_empty() {
            errors.add("id", "at least one field must be provided to update");
            return Err(errors);
        }
        let changes = Self {
            category: updates
                .category
                .as_deref()
                .map(|v| errors.text("category", v)),
            maximum: updates.maximum.map(|v| errors.non_negative("maximum", v)),
            theme: updates.theme.as_deref().map(|v| errors.text("theme", v)),
        };
        errors.into_result()?;
        Ok(changes)
    }
}
