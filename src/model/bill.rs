use crate::args::{BillUpdates, InsertBillArgs};
use crate::model::{Amount, ValidationErrors};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The theme used when a bill is created without one.
pub const DEFAULT_BILL_THEME: &str = "#000000";

/// Whether a recurring bill has been paid for the current cycle. It only changes when the user
/// changes it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Paid,
    Upcoming,
}

serde_plain::derive_display_from_serialize!(BillStatus);
serde_plain::derive_fromstr_from_deserialize!(BillStatus);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurringBill {
    pub id: i64,
    pub name: String,
    pub amount: Amount,
    pub due_day: u8,
    pub status: BillStatus,
    pub logo: Option<String>,
    pub theme: String,
}

impl RecurringBill {
    pub fn is_paid(&self) -> bool {
        self.status == BillStatus::Paid
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBill {
    pub name: String,
    pub amount: Amount,
    pub due_day: u8,
    pub status: BillStatus,
    pub logo: Option<String>,
    pub theme: String,
}

impl NewBill {
    pub(crate) fn from_args(args: &InsertBillArgs) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = errors.text("name", &args.name);
        let amount = errors.non_negative("amount", args.amount);
        let due_day = due_day(&mut errors, args.due_day);
        let theme = args
            .theme
            .as_deref()
            .map(|v| errors.text("theme", v))
            .unwrap_or_else(|| DEFAULT_BILL_THEME.to_string());
        errors.into_result()?;
        Ok(Self {
            name,
            amount,
            due_day,
            status: args.status,
            logo: logo(args.logo.as_deref()),
            theme,
        })
    }
}

/// Validated changes to a bill. For `logo`, `Some(None)` removes the logo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillChanges {
    pub name: Option<String>,
    pub amount: Option<Amount>,
    pub due_day: Option<u8>,
    pub status: Option<BillStatus>,
    pub logo: Option<Option<String>>,
    pub theme: Option<String>,
}

impl BillChanges {
    pub(crate) fn from_updates(updates: &BillUpdates) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if updates.is_empty() {
            errors.add("id", "at least one field must be provided to update");
            return Err(errors);
        }
        let changes = Self {
            name: updates.name.as_deref().map(|v| errors.text("name", v)),
            amount: updates.amount.map(|v| errors.non_negative("amount", v)),
            due_day: updates.due_day.map(|v| due_day(&mut errors, v)),
            status: updates.status,
            logo: updates.logo.as_deref().map(|v| logo(Some(v))),
            theme: updates.theme.as_deref().map(|v| errors.text("theme", v)),
        };
        errors.into_result()?;
        Ok(changes)
    }
}

fn due_day(errors: &mut ValidationErrors, value: i64) -> u8 {
    match u8::try_from(value) {
        Ok(day) if (1..=31).contains(&day) => day,
        _ => {
            errors.add("due_day", "must be between 1 and 31");
            0
        }
    }
}

/// Blank logos are stored as no logo.
fn logo(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn insert_args() -> InsertBillArgs {
        InsertBillArgs {
            name: "Spotify Premium".to_string(),
            amount: Amount::from_str("12.99").unwrap(),
            due_day: 15,
            status: BillStatus::Paid,
            logo: Some("🎵".to_string()),
            theme: None,
        }
    }

    #[test]
    fn test_status_text() {
        assert_eq!(BillStatus::Upcoming.to_string(), "upcoming");
        assert_eq!("paid".parse::<BillStatus>().unwrap(), BillStatus::Paid);
        assert!("overdue".parse::<BillStatus>().is_err());
    }

    #[test]
    fn test_new_bill_defaults() {
        let bill = NewBill::from_args(&insert_args()).unwrap();
        assert_eq!(bill.theme, DEFAULT_BILL_THEME);
        assert_eq!(bill.due_day, 15);
        assert_eq!(bill.logo.as_deref(), Some("🎵"));
    }

    #[test]
    fn test_due_day_range() {
        for day in [0, 32, -1, 1000] {
            let mut args = insert_args();
            args.due_day = day;
            assert!(NewBill::from_args(&args).unwrap_err().has("due_day"), "{day}");
        }
        for day in [1, 31] {
            let mut args = insert_args();
            args.due_day = day;
            assert!(NewBill::from_args(&args).is_ok());
        }
    }

    #[test]
    fn test_empty_logo_clears() {
        let updates = BillUpdates {
            logo: Some(String::new()),
            ..Default::default()
        };
        let changes = BillChanges::from_updates(&updates).unwrap();
        assert_eq!(changes.logo, Some(None));

        let updates = BillUpdates {
            status: Some(BillStatus::Upcoming),
            ..Default::default()
        };
        let changes = BillChanges::from_updates(&updates).unwrap();
        assert_eq!(changes.logo, None);
    }
}
