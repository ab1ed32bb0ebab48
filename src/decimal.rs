use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use std::str::FromStr;

/// number of decimal places kept for currency amounts (cents)
pub const MONEY_SCALE: u32 = 2;

/// Money type with cent precision, backed by a fixed-point decimal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(from = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, MONEY_SCALE));
    /// largest obligation a single loan may carry (10^15)
    pub const MAX: Money = Money(Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0));

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(MONEY_SCALE))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s.trim())?.round_dp(MONEY_SCALE)))
    }

    /// create from integer amount (dollars, bolivars, etc)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor amount (cents)
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, MONEY_SCALE))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// amount in minor units (cents)
    pub fn to_minor(&self) -> i128 {
        let mut scaled = self.0.round_dp(MONEY_SCALE);
        scaled.rescale(MONEY_SCALE);
        scaled.mantissa()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// flat percentage of this amount (e.g., 15% of 5000)
    pub fn percentage(&self, rate: Rate) -> Self {
        Money((self.0 * rate.as_decimal()).round_dp(MONEY_SCALE))
    }

    /// `None` on decimal overflow
    pub fn checked_percentage(&self, rate: Rate) -> Option<Self> {
        self.0.checked_mul(rate.as_decimal()).map(Money::from_decimal)
    }

    pub fn checked_add(self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money::from_decimal)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(MONEY_SCALE))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(MONEY_SCALE);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(MONEY_SCALE))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = (self.0 - other.0).round_dp(MONEY_SCALE);
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money((self.0 * other).round_dp(MONEY_SCALE))
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, other: Decimal) -> Money {
        Money((self.0 / other).round_dp(MONEY_SCALE))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + *x)
    }
}

/// flat interest rate, stored as a fraction (0.15 for 15%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from decimal fraction (e.g., 0.05 for 5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from percentage (e.g., 5 or 7.5)
    pub fn from_percentage(p: Decimal) -> Self {
        Rate(p / Decimal::ONE_HUNDRED)
    }

    /// parse a percentage string such as "12.5"
    pub fn from_percentage_str(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Rate::from_percentage(Decimal::from_str(s.trim())?))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// get as percentage
    pub fn as_percentage(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("100.125").unwrap();
        // banker's rounding on the midpoint
        assert_eq!(m.to_string(), "100.12");

        let m = Money::from_str_exact(" 42.5 ").unwrap();
        assert_eq!(m.to_string(), "42.50");
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Money::from_minor(12_345), Money::from_str_exact("123.45").unwrap());
        assert_eq!(Money::from_major(3).to_minor(), 300);
        assert_eq!(Money::CENT.to_minor(), 1);
    }

    #[test]
    fn test_repeated_additions_do_not_drift() {
        let mut total = Money::ZERO;
        for _ in 0..1_000 {
            total += Money::from_str_exact("0.10").unwrap();
        }
        assert_eq!(total, Money::from_major(100));
    }

    #[test]
    fn test_flat_percentage() {
        let principal = Money::from_major(5_000);
        let rate = Rate::from_percentage(dec!(15));
        assert_eq!(principal.percentage(rate), Money::from_major(750));

        let rate = Rate::from_percentage_str("7.5").unwrap();
        assert_eq!(Money::from_major(1_000).percentage(rate), Money::from_major(75));
        assert_eq!(rate.to_string(), "7.5%");
    }

    #[test]
    fn test_deserialize_rounds_to_cents() {
        let m: Money = serde_json::from_str("\"0.004\"").unwrap();
        assert_eq!(m, Money::ZERO);
        assert!(!m.is_positive());

        let m: Money = serde_json::from_str("\"12.345\"").unwrap();
        assert_eq!(m, Money::from_minor(1_234));
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(Money::MAX, Money::from_major(1_000_000_000_000_000));

        let huge = Money::from_major(i64::MAX);
        let rate = Rate::from_percentage(dec!(10000000000000));
        assert_eq!(huge.checked_percentage(rate), None);
        assert_eq!(
            Money::from_major(100).checked_percentage(Rate::from_percentage(dec!(10))),
            Some(Money::from_major(10))
        );
        assert_eq!(Money::from_decimal(Decimal::MAX).checked_add(Money::from_major(1)), None);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_major(1), Money::from_minor(50), Money::from_minor(25)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total, Money::from_minor(175));
    }
}
