//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The amount is negative.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more than two fractional digits.
    #[error("price must have at most {max} decimal places")]
    TooPrecise {
        /// Maximum allowed fractional digits.
        max: u32,
    },
    /// The amount has more integer digits than the backing column stores.
    #[error("price must have at most {max_digits} digits before the decimal point")]
    TooLarge {
        /// Maximum allowed integer digits.
        max_digits: u32,
    },
}

/// A non-negative monetary amount with at most two fractional digits and at
/// most four integer digits, the range of a `NUMERIC(6,2)` column.
///
/// Stored with exactly two fractional digits so `50` and `50.00` compare and
/// render identically. Serializes as a decimal string (e.g. `"50.00"`).
///
/// ## Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use skillet_core::Price;
///
/// let price = Price::new(Decimal::new(5, 0)).unwrap();
/// assert_eq!(price.to_string(), "5.00");
///
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());    // negative
/// assert!(Price::new(Decimal::new(1234, 3)).is_err());  // 1.234
/// assert!(Price::new(Decimal::new(10_000, 0)).is_err()); // out of range
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Maximum number of fractional digits.
    pub const MAX_SCALE: u32 = 2;

    /// Maximum number of integer digits.
    pub const MAX_INTEGER_DIGITS: u32 = 4;

    /// Validate and construct a `Price` from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for amounts below zero,
    /// [`PriceError::TooPrecise`] for amounts with more than two fractional
    /// digits, and [`PriceError::TooLarge`] for amounts of 10000 or more.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        if amount.normalize().scale() > Self::MAX_SCALE {
            return Err(PriceError::TooPrecise {
                max: Self::MAX_SCALE,
            });
        }

        if amount >= Decimal::from(10_u32.pow(Self::MAX_INTEGER_DIGITS)) {
            return Err(PriceError::TooLarge {
                max_digits: Self::MAX_INTEGER_DIGITS,
            });
        }

        let mut amount = amount.normalize();
        amount.rescale(Self::MAX_SCALE);
        Ok(Self(amount))
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// SQLx support (with postgres feature): delegate to NUMERIC via Decimal.
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
        // Database values satisfy the column CHECK constraints
        let mut amount = amount.normalize();
        amount.rescale(Self::MAX_SCALE);
        Ok(Self(amount))
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
    fn test_new_valid() {
        assert!(Price::new(Decimal::new(0, 0)).is_ok());
        assert!(Price::new(Decimal::new(500, 1)).is_ok()); // 50.0
        assert!(Price::new(Decimal::new(1999, 2)).is_ok()); // 19.99
    }

    #[test]
    fn test_new_negative() {
        assert!(matches!(
            Price::new(Decimal::new(-1, 2)),
            Err(PriceError::Negative)
        ));
    }

    #[test]
    fn test_new_too_precise() {
        assert!(matches!(
            Price::new(Decimal::new(1234, 3)), // 1.234
            Err(PriceError::TooPrecise { .. })
        ));
    }

    #[test]
    fn test_new_rejects_amounts_beyond_column_range() {
        // NUMERIC(6,2) tops out at 9999.99
        assert!(Price::new(Decimal::new(999_999, 2)).is_ok());
        assert!(matches!(
            Price::new(Decimal::new(10_000, 0)),
            Err(PriceError::TooLarge { .. })
        ));
        assert!(matches!(
            Price::new(Decimal::new(1_000_000, 0)),
            Err(PriceError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_trailing_zeros_are_not_too_precise() {
        // 1.230 normalizes to 1.23
        let price = Price::new(Decimal::new(1230, 3)).unwrap();
        assert_eq!(price.to_string(), "1.23");
    }

    #[test]
    fn test_rescaled_to_two_digits() {
        let price = Price::new(Decimal::new(5, 0)).unwrap();
        assert_eq!(price.to_string(), "5.00");
    }

    #[test]
    fn test_serde_as_string() {
        let price = Price::new(Decimal::new(1050, 2)).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"10.50\"");

        let parsed: Price = serde_json::from_str("\"10.50\"").unwrap();
        assert_eq!(parsed, price);
    }
}
