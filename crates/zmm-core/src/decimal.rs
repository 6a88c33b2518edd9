//! Precision-safe decimal types for quoting.
//!
//! Uses `rust_decimal` so quote arithmetic (`fair * (1 - edge)`) is exact and
//! reproducible; no floating-point rounding creeps into prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

/// Price with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// prices with sizes in calculations.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Midpoint of two prices: (a + b) / 2.
    #[inline]
    pub fn mid(a: Price, b: Price) -> Self {
        Self((a.0 + b.0) / Decimal::TWO)
    }

    /// Absolute distance between two prices.
    #[inline]
    pub fn abs_diff(&self, other: Price) -> Decimal {
        (self.0 - other.0).abs()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Order quantity in base units (lots).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_mid() {
        let mid = Price::mid(Price::new(dec!(99.5)), Price::new(dec!(100.5)));
        assert_eq!(mid.inner(), dec!(100));
    }

    #[test]
    fn test_price_abs_diff() {
        let a = Price::new(dec!(99.8));
        let b = Price::new(dec!(100.1));
        assert_eq!(a.abs_diff(b), dec!(0.3));
        assert_eq!(b.abs_diff(a), dec!(0.3));
    }

    #[test]
    fn test_price_parse() {
        let p: Price = "101.25".parse().unwrap();
        assert_eq!(p.inner(), dec!(101.25));
        assert!("abc".parse::<Price>().is_err());
    }

    #[test]
    fn test_price_default_is_zero_and_scales() {
        assert!(Price::default().is_zero());
        let scaled = Price::new(dec!(100.2)) * (dec!(1) - dec!(0.0002));
        assert_eq!(scaled.inner(), dec!(100.17996));
    }
}
