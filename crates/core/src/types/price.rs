//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The amount has more decimal places than the currency allows.
    #[error("price can have at most {max} decimal places (got {0})", max = Price::SCALE)]
    TooPrecise(Decimal),
    /// The amount does not fit the stored column.
    #[error("price must be less than {limit} (got {0})", limit = Price::LIMIT)]
    TooLarge(Decimal),
}

/// A non-negative catalog price in the store's currency.
///
/// Deserialization goes through [`Price::new`], so an amount the catalog
/// cannot store exactly is rejected before it reaches any workflow. Accepted
/// amounts fit `NUMERIC(12, 2)` without rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Maximum number of decimal places.
    pub const SCALE: u32 = 2;

    /// Exclusive upper bound on the amount (10 integer digits).
    pub const LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero,
    /// `PriceError::TooPrecise` if it has more than two significant decimal
    /// places, and `PriceError::TooLarge` if it reaches [`Price::LIMIT`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount.normalize().scale() > Self::SCALE {
            return Err(PriceError::TooPrecise(amount));
        }
        if amount >= Self::LIMIT {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_zero_and_positive() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
        assert!(Price::new(Decimal::new(1999, 2)).is_ok());
    }

    #[test]
    fn test_new_rejects_negative() {
        assert!(matches!(
            Price::new(Decimal::new(-1, 2)),
            Err(PriceError::Negative(_))
        ));
    }

    #[test]
    fn test_limit_is_ten_integer_digits() {
        assert_eq!(Price::LIMIT, Decimal::new(10_000_000_000, 0));
    }

    #[test]
    fn test_new_rejects_sub_cent_amounts() {
        assert!(matches!(
            Price::new(Decimal::new(19_999, 3)),
            Err(PriceError::TooPrecise(_))
        ));
        // Trailing zeros are not extra precision.
        let price = Price::new(Decimal::new(20_000, 3)).unwrap();
        assert_eq!(price.amount(), Decimal::new(20, 0));
    }

    #[test]
    fn test_new_upper_bound() {
        let largest = Decimal::new(999_999_999_999, 2);
        assert_eq!(Price::new(largest).unwrap().amount(), largest);
        assert!(matches!(
            Price::new(Price::LIMIT),
            Err(PriceError::TooLarge(_))
        ));
        assert!(matches!(
            Price::new(Decimal::new(100_000_000_000, 0)),
            Err(PriceError::TooLarge(_))
        ));
    }

    #[test]
    fn test_deserialize_rejects_unstorable_amounts() {
        assert!(serde_json::from_str::<Price>("\"19.999\"").is_err());
        assert!(serde_json::from_str::<Price>("\"100000000000\"").is_err());
        assert!(serde_json::from_str::<Price>("\"9999999999.99\"").is_ok());
    }

    #[test]
    fn test_display_two_decimals() {
        let price = Price::new(Decimal::new(5, 0)).unwrap();
        assert_eq!(price.to_string(), "5.00");
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("\"-3.50\"").is_err());
        let price: Price = serde_json::from_str("\"3.50\"").unwrap();
        assert_eq!(price.amount(), Decimal::new(350, 2));
    }
}
