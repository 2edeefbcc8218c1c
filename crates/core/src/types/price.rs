//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as an integer number of cents and exposed on the wire
//! as a two-decimal string (e.g. `"19.99"`), matching what relational
//! storage and JSON clients expect. `rust_decimal` handles the conversion
//! so no floating-point arithmetic ever touches an amount.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error converting a decimal amount into a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    /// The amount was negative.
    #[error("price must not be negative")]
    Negative,
    /// The amount had more than two decimal places.
    #[error("price must have at most two decimal places")]
    TooPrecise,
    /// The amount does not fit in an i64 cent count.
    #[error("price is out of range")]
    OutOfRange,
}

/// A monetary amount in the smallest currency unit (cents).
///
/// Serializes as a decimal string (`"19.99"`) and deserializes from one,
/// rejecting negative amounts and sub-cent precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    /// Create a price from a cent count.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Get the underlying cent count.
    #[must_use]
    pub const fn as_cents(&self) -> i64 {
        self.0
    }

    /// Convert a decimal amount (e.g. `19.99`) into a price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for negative amounts,
    /// `PriceError::TooPrecise` for sub-cent precision, and
    /// `PriceError::OutOfRange` when the cent count overflows `i64`.
    pub fn from_decimal(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() {
            return Err(PriceError::Negative);
        }

        let cents = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(PriceError::OutOfRange)?;

        if !cents.fract().is_zero() {
            return Err(PriceError::TooPrecise);
        }

        cents.to_i64().map(Self).ok_or(PriceError::OutOfRange)
    }

    /// The decimal amount in the currency's standard unit (e.g. dollars).
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        <Decimal as Serialize>::serialize(&self.to_decimal(), serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::from_decimal(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Price {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Price {
    fn decode(
        value: sqlx::sqlite::SqliteValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let cents = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(cents))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn from_decimal_whole_and_fractional() {
        let price = Price::from_decimal(Decimal::from_str("19.99").unwrap()).unwrap();
        assert_eq!(price.as_cents(), 1999);

        let price = Price::from_decimal(Decimal::from_str("5").unwrap()).unwrap();
        assert_eq!(price.as_cents(), 500);
    }

    #[test]
    fn from_decimal_rejects_negative() {
        let result = Price::from_decimal(Decimal::from_str("-1.00").unwrap());
        assert_eq!(result, Err(PriceError::Negative));
    }

    #[test]
    fn from_decimal_rejects_sub_cent_precision() {
        let result = Price::from_decimal(Decimal::from_str("9.999").unwrap());
        assert_eq!(result, Err(PriceError::TooPrecise));
    }

    #[test]
    fn display_has_two_decimal_places() {
        assert_eq!(Price::from_cents(1999).to_string(), "19.99");
        assert_eq!(Price::from_cents(500).to_string(), "5.00");
    }

    #[test]
    fn serializes_as_decimal_string() {
        let json = serde_json::to_string(&Price::from_cents(1250)).unwrap();
        assert_eq!(json, "\"12.50\"");
    }

    #[test]
    fn deserializes_from_decimal_string() {
        let price: Price = serde_json::from_str("\"7.25\"").unwrap();
        assert_eq!(price.as_cents(), 725);

        let result: Result<Price, _> = serde_json::from_str("\"-7.25\"");
        assert!(result.is_err());
    }
}
