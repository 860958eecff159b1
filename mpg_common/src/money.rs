use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const CURRENCY_CODE: &str = "USD";
pub const CURRENCY_CODE_LOWER: &str = "usd";

//--------------------------------------       Money       -----------------------------------------------------------
/// An amount of money in minor units (cents). All prices, totals, fees and earnings in the system are carried as
/// `Money`; floating point never touches a currency value.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in cents: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {value} is too large to convert to Money")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", cents / 100, cents % 100)
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Build an amount from whole currency units (dollars).
    pub fn from_major(units: i64) -> Self {
        Self(units * 100)
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

#[cfg(test)]
mod test {
    use super::Money;

    #[test]
    fn display_formats_minor_units() {
        assert_eq!(Money::from_cents(1098).to_string(), "$10.98");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_major(3).to_string(), "$3.00");
        assert_eq!(Money::from_cents(-299).to_string(), "-$2.99");
    }

    #[test]
    fn arithmetic() {
        let total = Money::from_cents(299) * 2 + Money::from_cents(500);
        assert_eq!(total, Money::from_cents(1098));
        assert_eq!(total - Money::from_cents(1098), Money::default());
        let sum: Money = [Money::from_cents(1000), Money::from_cents(1500)].into_iter().sum();
        assert_eq!(sum, Money::from_cents(2500));
    }
}
