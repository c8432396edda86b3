//! Field-level validation messages shared by every entity.

use crate::model::Amount;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// The longest value accepted for names, categories and themes.
pub(crate) const MAX_TEXT_LEN: usize = 255;

/// Validation failures keyed by field name. Each field can carry more than one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// Records `message` against `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if at least one message was recorded for `field`.
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// The messages recorded for `field`, empty if there are none.
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Checks a free-form text field: it must not be blank and must not be too long. Returns the
    /// trimmed value.
    pub(crate) fn text(&mut self, field: &str, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.add(field, "must not be blank");
        } else if trimmed.chars().count() > MAX_TEXT_LEN {
            self.add(
                field,
                format!("must not be longer than {MAX_TEXT_LEN} characters"),
            );
        }
        trimmed.to_string()
    }

    /// Checks that a money value is no larger than [`Amount::MAX`] in either direction.
    pub(crate) fn money(&mut self, field: &str, value: Amount) -> Amount {
        if !value.is_within_bounds() {
            self.add(
                field,
                format!("must be between -{max} and {max}", max = Amount::MAX.money()),
            );
        }
        value
    }

    /// Checks that a money value is not negative.
    pub(crate) fn non_negative(&mut self, field: &str, value: Amount) -> Amount {
        if value.is_negative() {
            self.add(field, "must be zero or greater");
        }
        self.money(field, value)
    }

    /// Checks that a money value is strictly positive.
    pub(crate) fn positive(&mut self, field: &str, value: Amount) -> Amount {
        if !value.is_positive() {
            self.add(field, "must be greater than zero");
        }
        self.money(field, value)
    }

    /// Parses a `YYYY-MM-DD` date.
    pub(crate) fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.add(field, "must be a valid date in the form YYYY-MM-DD");
                None
            }
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "The given data was invalid")?;
        let mut separator = ": ";
        for (field, messages) in &self.0 {
            for message in messages {
                write!(f, "{separator}{field} {message}")?;
                separator = "; ";
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
