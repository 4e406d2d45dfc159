//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are persisted by the browser as plain JSON numbers (`"price": 129.9`),
//! so the wire form is a float while all arithmetic stays in `Decimal`.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A unit price in the store currency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Difference clamped at zero.
    ///
    /// An "original" price below the selling price yields no discount rather
    /// than a negative one.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if self.0 > other.0 {
            Self(self.0 - other.0)
        } else {
            Self::ZERO
        }
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_reads_json_numbers() {
        let price: Price = serde_json::from_str("129").unwrap();
        assert_eq!(price, Price::new(Decimal::new(129, 0)));

        let price: Price = serde_json::from_str("19.5").unwrap();
        assert_eq!(price, Price::new(Decimal::new(195, 1)));
    }

    #[test]
    fn test_price_writes_json_numbers() {
        let json = serde_json::to_string(&Price::new(Decimal::new(250, 0))).unwrap();
        assert_eq!(json, "250.0");
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Price::new(Decimal::new(1250, 2));
        assert_eq!(unit.times(3), Price::new(Decimal::new(3750, 2)));

        let total: Price = [unit, unit.times(2)].into_iter().sum();
        assert_eq!(total.to_string(), "37.50");
    }

    #[test]
    fn test_saturating_sub_never_negative() {
        let high = Price::new(Decimal::new(100, 0));
        let low = Price::new(Decimal::new(80, 0));
        assert_eq!(high.saturating_sub(low), Price::new(Decimal::new(20, 0)));
        assert!(low.saturating_sub(high).is_zero());
    }
}
