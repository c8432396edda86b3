use crate::args::{InsertTransactionArgs, TransactionUpdates};
use crate::error::Res;
use crate::model::{Amount, ValidationErrors};
use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use url::Url;

/// Generated avatars come from this service.
const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";

/// A single income or expense.
///
/// The sign of `amount` decides whether this is income (positive) or an expense (negative). The
/// `is_income` flag seen by clients is computed from it and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub amount: Amount,
    pub date: NaiveDate,
    pub avatar: Option<String>,
    pub is_recurring: bool,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.amount.is_positive()
    }

    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }
}

impl Serialize for Transaction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("Transaction", 8)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("category", &self.category)?;
        s.serialize_field("amount", &self.amount)?;
        s.serialize_field("date", &self.date.format("%Y-%m-%d").to_string())?;
        s.serialize_field("avatar", &self.avatar)?;
        s.serialize_field("is_income", &self.is_income())?;
        s.serialize_field("is_recurring", &self.is_recurring)?;
        s.end()
    }
}

/// A validated transaction that is ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub name: String,
    pub category: String,
    pub amount: Amount,
    pub date: NaiveDate,
    pub avatar: String,
    pub is_recurring: bool,
}

impl NewTransaction {
    pub(crate) fn from_args(args: &InsertTransactionArgs) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = errors.text("name", &args.name);
        let category = errors.text("category", &args.category);
        let amount = errors.money("amount", args.amount);
        let date = errors.date("date", &args.date);
        let avatar = avatar_or_default(&mut errors, args.avatar.as_deref(), &name);
        errors.into_result()?;

        Ok(Self {
            name,
            category,
            amount,
            // present whenever `errors` was empty
            date: date.unwrap_or_default(),
            avatar: avatar.unwrap_or_default(),
            is_recurring: args.is_recurring.unwrap_or(false),
        })
    }
}

/// Validated changes to an existing transaction. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub amount: Option<Amount>,
    pub date: Option<NaiveDate>,
    pub avatar: Option<String>,
    pub is_recurring: Option<bool>,
}

impl TransactionChanges {
    /// An explicit avatar wins; otherwise a new name regenerates the avatar.
    pub(crate) fn from_updates(updates: &TransactionUpdates) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if updates.is_empty() {
            errors.add("id", "at least one field must be provided to update");
            return Err(errors);
        }
        let name = updates.name.as_deref().map(|v| errors.text("name", v));
        let category = updates.category.as_deref().map(|v| errors.text("category", v));
        let amount = updates.amount.map(|v| errors.money("amount", v));
        let date = match updates.date.as_deref() {
            Some(v) => errors.date("date", v),
            None => None,
        };
        let avatar = match (updates.avatar.as_deref(), name.as_deref()) {
            (Some(avatar), _) => avatar_or_default(&mut errors, Some(avatar), ""),
            (None, Some(name)) => avatar_or_default(&mut errors, None, name),
            (None, None) => None,
        };
        errors.into_result()?;

        Ok(Self {
            name,
            category,
            amount,
            date,
            avatar,
            is_recurring: updates.is_recurring,
        })
    }
}

/// The avatar URL generated for a counterparty `name`.
pub fn default_avatar(name: &str) -> Res<String> {
    let mut url = Url::parse(AVATAR_SERVICE)?;
    url.query_pairs_mut()
        .append_pair("name", name)
        .append_pair("background", "random");
    Ok(url.into())
}

fn avatar_or_default(
    errors: &mut ValidationErrors,
    avatar: Option<&str>,
    name: &str,
) -> Option<String> {
    match avatar.map(str::trim) {
        Some(avatar) if !avatar.is_empty() => Some(avatar.to_string()),
        _ => match default_avatar(name) {
            Ok(url) => Some(url),
            Err(e) => {
                errors.add("avatar", format!("could not be generated: {e}"));
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn insert_args() -> InsertTransactionArgs {
        InsertTransactionArgs {
            name: "Savory Bites Bistro".to_string(),
            category: "Dining Out".to_string(),
            amount: Amount::from_str("-55.50").unwrap(),
            date: "2024-08-19".to_string(),
            avatar: None,
            is_recurring: None,
        }
    }

    #[test]
    fn test_is_income_follows_sign() {
        let mut txn = Transaction {
            id: 1,
            name: "Emma Richardson".to_string(),
            category: "General".to_string(),
            amount: Amount::from_str("75.50").unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 8, 19).unwrap(),
            avatar: None,
            is_recurring: false,
        };
        assert!(txn.is_income());
        txn.amount = Amount::from_str("-75.50").unwrap();
        assert!(!txn.is_income());
        assert!(txn.is_expense());
        txn.amount = Amount::ZERO;
        assert!(!txn.is_income());
        assert!(!txn.is_expense());
    }

    #[test]
    fn test_serialize_includes_derived_flag() {
        let txn = Transaction {
            id: 7,
            name: "Sun Park".to_string(),
            category: "General".to_string(),
            amount: Amount::from_str("120").unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 8, 17).unwrap(),
            avatar: None,
            is_recurring: true,
        };
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["is_income"], true);
        assert_eq!(json["date"], "2024-08-17");
        assert_eq!(json["amount"], 120.0);
        assert!(json["avatar"].is_null());
    }

    #[test]
    fn test_default_avatar_encodes_name() {
        let url = default_avatar("Savory Bites & Co").unwrap();
        assert_eq!(
            url,
            "https://ui-avatars.com/api/?name=Savory+Bites+%26+Co&background=random"
        );
    }

    #[test]
    fn test_new_transaction_defaults() {
        let txn = NewTransaction::from_args(&insert_args()).unwrap();
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 8, 19).unwrap());
        assert!(txn.avatar.contains("name=Savory+Bites+Bistro"));
        assert!(!txn.is_recurring);
    }

    #[test]
    fn test_new_transaction_keeps_explicit_avatar() {
        let mut args = insert_args();
        args.avatar = Some("https://i.pravatar.cc/150?u=emma".to_string());
        let txn = NewTransaction::from_args(&args).unwrap();
        assert_eq!(txn.avatar, "https://i.pravatar.cc/150?u=emma");
    }

    #[test]
    fn test_new_transaction_field_errors() {
        let mut args = insert_args();
        args.name = " ".to_string();
        args.date = "yesterday".to_string();
        let errors = NewTransaction::from_args(&args).unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("date"));
        assert!(!errors.has("category"));
    }

    #[test]
    fn test_changes_regenerate_avatar_on_rename() {
        let updates = TransactionUpdates {
            name: Some("Daniel Carter".to_string()),
            ..Default::default()
        };
        let changes = TransactionChanges::from_updates(&updates).unwrap();
        assert!(changes.avatar.unwrap().contains("name=Daniel+Carter"));
        assert!(changes.amount.is_none());
    }

    #[test]
    fn test_changes_without_rename_keep_avatar() {
        let updates = TransactionUpdates {
            category: Some("Bills".to_string()),
            ..Default::default()
        };
        let changes = TransactionChanges::from_updates(&updates).unwrap();
        assert!(changes.avatar.is_none());
        assert_eq!(changes.category.as_deref(), Some("Bills"));
    }

    #[test]
    fn test_amount_must_be_in_bounds() {
        let mut args = insert_args();
        args.amount = Amount::from_str("-50000000000000000000000000000").unwrap();
        let errors = NewTransaction::from_args(&args).unwrap_err();
        assert!(errors.has("amount"));

        let updates = TransactionUpdates {
            amount: Some(Amount::from_str("1000000000000000.01").unwrap()),
            ..Default::default()
        };
        let errors = TransactionChanges::from_updates(&updates).unwrap_err();
        assert!(errors.has("amount"));
    }

    #[test]
    fn test_empty_changes_are_rejected() {
        let errors = TransactionChanges::from_updates(&TransactionUpdates::default()).unwrap_err();
        assert!(!errors.is_empty());
    }
}
