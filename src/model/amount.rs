//! Amount type for handling monetary values.
//!
//! An `Amount` wraps a `Decimal` that always has at most two fraction digits. Values with more
//! digits are rounded half away from zero when the `Amount` is created.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use schemars::JsonSchema;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt::{self, Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Number of fraction digits kept for money values.
const SCALE: u32 = 2;

/// Represents an amount of money.
///
/// JSON serialization writes a number. Deserialization accepts a number or a string. Strings may
/// carry a leading dollar sign and thousands separators, e.g. `"-$1,250.00"`.
///
/// ```
/// # use fintrack::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-$1,250.005").unwrap();
/// assert_eq!(amount.to_string(), "-1250.01");
/// assert_eq!(amount.money(), "-$1,250.01");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// The largest magnitude accepted for any money field: one quadrillion.
    pub const MAX: Amount = Amount(Decimal::from_parts(0xA4C6_8000, 0x3_8D7E, 0, false, 0));

    /// Creates a new `Amount`, rounding `value` to two fraction digits.
    pub fn new(value: Decimal) -> Self {
        let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(SCALE);
        Self(rounded)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// True for amounts above zero. Zero is neither positive nor negative.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// True when the magnitude is at most [`Amount::MAX`].
    pub fn is_within_bounds(&self) -> bool {
        self.0.abs() <= Self::MAX.0
    }

    /// Formats the amount for people, e.g. `-$60,000.00`.
    pub fn money(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let digits = format_num::format_num!(",.2", self.0.abs().to_f64().unwrap_or_default());
        format!("{sign}${digits}")
    }

    /// The exact text stored in the database, e.g. `-75.50`.
    pub(crate) fn to_sql(self) -> String {
        self.to_string()
    }

    pub(crate) fn from_sql(s: &str) -> crate::error::Res<Self> {
        use anyhow::Context;
        Decimal::from_str(s)
            .map(Amount::new)
            .with_context(|| format!("Invalid amount '{s}' stored in the database"))
    }
}

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountError(String);

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid amount", self.0)
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // "-$50.00", "$50.00", "-50.00", "50.00"
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);
        let digits = rest.replace(',', "");
        if digits.is_empty() || digits.starts_with(['-', '+']) {
            return Err(AmountError(s.to_string()));
        }

        let value = Decimal::from_str(&digits).map_err(|_| AmountError(s.to_string()))?;
        Ok(Amount::new(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Debug for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({self})")
    }
}

// Arithmetic saturates at the limits of `Decimal` so that no stored value can make a read panic.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount::new(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount::new(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.0.to_f64().unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Decimal::from_f64(v)
            .map(Amount::new)
            .ok_or_else(|| E::custom(format!("{v} is not a valid amount")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl JsonSchema for Amount {
    fn schema_name() -> Cow<'static, str> {
        "Amount".into()
    }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": ["number", "string"],
            "description": "An amount of money with two fraction digits, e.g. 75.5 or \"-$1,250.00\". Negative transaction amounts are expenses."
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain_and_dollar() {
        assert_eq!(Amount::from_str("50").unwrap().value(), dec("50.00"));
        assert_eq!(Amount::from_str("$50.00").unwrap().value(), dec("50.00"));
        assert_eq!(Amount::from_str("-$50.00").unwrap().value(), dec("-50.00"));
        assert_eq!(Amount::from_str("  -50.5  ").unwrap().value(), dec("-50.50"));
    }

    #[test]
    fn test_parse_commas() {
        let amount = Amount::from_str("$1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Amount::from_str("").is_err());
        assert!(Amount::from_str("$").is_err());
        assert!(Amount::from_str("--5").is_err());
        assert!(Amount::from_str("abc").is_err());
        assert!(Amount::from_str("12x").is_err());
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(Amount::from_str("1.005").unwrap().to_string(), "1.01");
        assert_eq!(Amount::from_str("-1.005").unwrap().to_string(), "-1.01");
        assert_eq!(Amount::from_str("1.004").unwrap().to_string(), "1.00");
    }

    #[test]
    fn test_display_always_has_two_digits() {
        assert_eq!(Amount::from_str("75.5").unwrap().to_string(), "75.50");
        assert_eq!(Amount::from_str("3").unwrap().to_sql(), "3.00");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_money() {
        assert_eq!(Amount::from_str("-60000").unwrap().money(), "-$60,000.00");
        assert_eq!(Amount::from_str("12.99").unwrap().money(), "$12.99");
        assert_eq!(Amount::ZERO.money(), "$0.00");
    }

    #[test]
    fn test_sign_helpers() {
        let zero = Amount::from_str("0.00").unwrap();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert!(Amount::from_str("-0.01").unwrap().is_negative());
        assert!(Amount::from_str("0.01").unwrap().is_positive());
    }

    #[test]
    fn test_arithmetic() {
        let a = Amount::from_str("10.10").unwrap();
        let b = Amount::from_str("0.20").unwrap();
        assert_eq!((a + b).to_string(), "10.30");
        assert_eq!((b - a).to_string(), "-9.90");
        let total: Amount = vec![a, b, b].into_iter().sum();
        assert_eq!(total.to_string(), "10.50");
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Amount::new(Decimal::MAX);
        let tiny = Amount::new(Decimal::MIN);
        assert_eq!(huge + huge, huge);
        assert_eq!(tiny - huge, tiny);
        let total: Amount = vec![huge, huge, Amount::from_str("1").unwrap()].into_iter().sum();
        assert_eq!(total, huge);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(Amount::MAX, Amount::from_str("1,000,000,000,000,000").unwrap());
        assert!(Amount::MAX.is_within_bounds());
        assert!(Amount::from_str("-1000000000000000.00").unwrap().is_within_bounds());
        assert!(!Amount::from_str("1000000000000000.01").unwrap().is_within_bounds());
        assert!(!Amount::from_str("-50000000000000000000000000000").unwrap().is_within_bounds());
    }

    #[test]
    fn test_serialize_as_number() {
        let amount = Amount::from_str("-75.50").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "-75.5");
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let a: Amount = serde_json::from_str("75.5").unwrap();
        let b: Amount = serde_json::from_str("\"$75.50\"").unwrap();
        let c: Amount = serde_json::from_str("-12").unwrap();
        assert_eq!(a, b);
        assert_eq!(c.value(), dec("-12.00"));
        assert!(serde_json::from_str::<Amount>("true").is_err());
        assert!(serde_json::from_str::<Amount>("\"nope\"").is_err());
    }

    #[test]
    fn test_sql_round_trip_is_exact() {
        let a = Amount::from_str("0.10").unwrap() + Amount::from_str("0.20").unwrap();
        assert_eq!(Amount::from_sql(&a.to_sql()).unwrap(), a);
    }
}
