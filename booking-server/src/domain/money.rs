//! Money as integer minor units.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// A monetary amount in minor units (cents).
///
/// Fares are priced per seat and multiplied by whole passenger counts, so
/// integer arithmetic is exact; there is no floating point anywhere in the
/// money path.
///
/// # Examples
///
/// ```
/// use booking_server::domain::Money;
///
/// let fare = Money::from_cents(4550);
/// assert_eq!(fare.cents(), 4550);
/// assert_eq!(fare.to_string(), "$45.50");
///
/// // Per-seat fare for three passengers
/// assert_eq!(fare.times(3), Money::from_cents(13650));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(u64);

impl Money {
    /// Zero amount.
    pub const ZERO: Money = Money(0);

    /// Create an amount from minor units (cents).
    pub const fn from_cents(cents: u64) -> Self {
        Money(cents)
    }

    /// Create an amount from major units (whole currency units).
    pub const fn from_major(units: u64) -> Self {
        Money(units * 100)
    }

    /// Returns the amount in minor units.
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Multiply a per-seat amount by a passenger count.
    ///
    /// Saturates at `u64::MAX` cents rather than wrapping.
    pub fn times(&self, count: u32) -> Money {
        Money(self.0.saturating_mul(u64::from(count)))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({self})")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn times_matches_repeated_addition(cents in 0u64..100_000, count in 0u32..20) {
            let fare = Money::from_cents(cents);
            let mut total = Money::ZERO;
            for _ in 0..count {
                total = total + fare;
            }
            prop_assert_eq!(fare.times(count), total);
        }

        #[test]
        fn display_always_has_two_minor_digits(cents in 0u64..10_000_000) {
            let rendered = Money::from_cents(cents).to_string();
            let (_, minor) = rendered.rsplit_once('.').unwrap();
            prop_assert_eq!(minor.len(), 2);
        }
    }
}
