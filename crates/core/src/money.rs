//! Monetary amounts in the smallest currency unit.

use serde::{Deserialize, Serialize};

/// Amount in smallest currency unit (e.g., cents).
///
/// Signed so that callers can hand in negative input, which setters reject.
/// Arithmetic saturates instead of overflowing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Price times quantity.
    pub fn times(self, quantity: i64) -> Money {
        Money(self.0.saturating_mul(quantity))
    }

    /// Percentage of this amount, rounded half away from zero.
    pub fn percent(self, rate: f64) -> Money {
        Money((self.0 as f64 * rate / 100.0).round() as i64)
    }

    /// The part of a tax-inclusive amount that is tax at `rate` percent.
    pub fn included_tax(self, rate: f64) -> Money {
        let net = (self.0 as f64 / (1.0 + rate / 100.0)).round() as i64;
        Money(self.0.saturating_sub(net))
    }
}

impl core::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl core::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}
