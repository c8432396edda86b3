//! Reading request bodies.
//!
//! Bodies are read as loose JSON objects first and then field by field, so that a single request
//! can report every missing or mistyped field at once instead of failing on the first one.

use crate::advisor::Turn;
use crate::args::{
    AskArgs, BillUpdates, BudgetUpdates, InsertBillArgs, InsertBudgetArgs, InsertPotArgs,
    InsertTransactionArgs, PotUpdates, TransactionUpdates,
};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, BillStatus, ValidationErrors};
use crate::web::error::ApiError;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A JSON object request body. An empty body is read as an empty object.
#[derive(Debug, Clone, Default)]
pub(super) struct JsonObject(pub(super) Map<String, Value>);

#[async_trait::async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        parse_object(&bytes).map(JsonObject)
    }
}

fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::bad_request("The request body must be a JSON object")),
        Err(e) => Err(ApiError::bad_request(format!("Malformed JSON body: {e}"))),
    }
}

/// Pulls typed fields out of a JSON object and records a message for each one that is missing or
/// has the wrong type.
pub(super) struct Fields {
    map: Map<String, Value>,
    errors: ValidationErrors,
}

impl Fields {
    pub(super) fn new(JsonObject(map): JsonObject) -> Self {
        Self {
            map,
            errors: ValidationErrors::default(),
        }
    }

    /// `None` when the field is absent or null.
    fn optional<T: DeserializeOwned>(&mut self, name: &str, expected: &str) -> Option<T> {
        match self.map.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(v) => Some(v),
                Err(_) => {
                    self.errors.add(name, format!("must be {expected}"));
                    None
                }
            },
        }
    }

    fn required<T: DeserializeOwned>(&mut self, name: &str, expected: &str) -> Option<T> {
        if matches!(self.map.get(name), None | Some(Value::Null)) {
            self.errors.add(name, "is required");
            return None;
        }
        self.optional(name, expected)
    }

    fn string(&mut self, name: &str) -> Option<String> {
        self.optional(name, "a string")
    }

    fn amount(&mut self, name: &str) -> Option<Amount> {
        self.optional(name, "a number")
    }

    /// Like [`Fields::string`], but an explicit null reads as the empty string so it can clear
    /// the field.
    fn clearable_string(&mut self, name: &str) -> Option<String> {
        match self.map.get(name) {
            Some(Value::Null) => Some(String::new()),
            _ => self.string(name),
        }
    }

    fn bool(&mut self, name: &str) -> Option<bool> {
        match self.map.get(name) {
            Some(Value::Number(n)) if n.as_u64() == Some(0) => Some(false),
            Some(Value::Number(n)) if n.as_u64() == Some(1) => Some(true),
            _ => self.optional(name, "true or false"),
        }
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ApiError> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(self.errors).pub_result(ErrorType::Validation).map_err(ApiError::from),
        }
    }

    pub(super) fn insert_transaction(mut self) -> Result<InsertTransactionArgs, ApiError> {
        let name = self.required("name", "a string");
        let category = self.required("category", "a string");
        let amount = self.required("amount", "a number");
        let date = self.required("date", "a date in the format YYYY-MM-DD");
        let avatar = self.string("avatar");
        let is_recurring = self.bool("is_recurring");
        let args = (|| {
            Some(InsertTransactionArgs {
                name: name?,
                category: category?,
                amount: amount?,
                date: date?,
                avatar,
                is_recurring,
            })
        })();
        self.finish(args)
    }

    pub(super) fn transaction_updates(mut self) -> Result<TransactionUpdates, ApiError> {
        let updates = TransactionUpdates {
            name: self.string("name"),
            category: self.string("category"),
            amount: self.amount("amount"),
            date: self.string("date"),
            avatar: self.string("avatar"),
            is_recurring: self.bool("is_recurring"),
        };
        self.finish(Some(updates))
    }

    pub(super) fn insert_budget(mut self) -> Result<InsertBudgetArgs, ApiError> {
        let category = self.required("category", "a string");
        let maximum = self.required("maximum", "a number");
        let theme = self.string("theme");
        let args = (|| {
            Some(InsertBudgetArgs {
                category: category?,
                maximum: maximum?,
                theme,
            })
        })();
        self.finish(args)
    }

    pub(super) fn budget_updates(mut self) -> Result<BudgetUpdates, ApiError> {
        let updates = BudgetUpdates {
            category: self.string("category"),
            maximum: self.amount("maximum"),
            theme: self.string("theme"),
        };
        self.finish(Some(updates))
    }

    pub(super) fn insert_pot(mut self) -> Result<InsertPotArgs, ApiError> {
        let name = self.required("name", "a string");
        let target = self.required("target", "a number");
        let theme = self.string("theme");
        let args = (|| {
            Some(InsertPotArgs {
                name: name?,
                target: target?,
                theme,
            })
        })();
        self.finish(args)
    }

    pub(super) fn pot_updates(mut self) -> Result<PotUpdates, ApiError> {
        let updates = PotUpdates {
            name: self.string("name"),
            target: self.amount("target"),
            total: self.amount("total"),
            theme: self.string("theme"),
        };
        self.finish(Some(updates))
    }

    /// The `{amount}` body of a deposit or withdrawal.
    pub(super) fn pot_amount(mut self) -> Result<Amount, ApiError> {
        let amount = self.required("amount", "a number");
        self.finish(amount)
    }

    pub(super) fn insert_bill(mut self) -> Result<InsertBillArgs, ApiError> {
        let name = self.required("name", "a string");
        let amount = self.required("amount", "a number");
        let due_day = self.required("due_day", "an integer");
        let status: Option<BillStatus> = self.required("status", "one of: paid, upcoming");
        let logo = self.string("logo");
        let theme = self.string("theme");
        let args = (|| {
            Some(InsertBillArgs {
                name: name?,
                amount: amount?,
                due_day: due_day?,
                status: status?,
                logo,
                theme,
            })
        })();
        self.finish(args)
    }

    pub(super) fn bill_updates(mut self) -> Result<BillUpdates, ApiError> {
        let updates = BillUpdates {
            name: self.string("name"),
            amount: self.amount("amount"),
            due_day: self.optional("due_day", "an integer"),
            status: self.optional("status", "one of: paid, upcoming"),
            logo: self.clearable_string("logo"),
            theme: self.string("theme"),
        };
        self.finish(Some(updates))
    }

    pub(super) fn ask(mut self) -> Result<AskArgs, ApiError> {
        let question = self.required("question", "a string");
        let history: Option<Vec<Turn>> = self.optional(
            "history",
            "a list of {role, text} objects where role is user or model",
        );
        let args = question.map(|question| AskArgs {
            question,
            history: history.unwrap_or_default(),
        });
        self.finish(args)
    }
}
