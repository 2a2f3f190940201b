use serde::{Deserialize, Serialize};

/// Money amount stored as cents to avoid floating-point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Creates a new money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new money amount from whole dollars.
    ///
    /// Returns `None` if the amount does not fit in cents.
    pub fn from_dollars(dollars: i64) -> Option<Self> {
        dollars.checked_mul(100).map(Self::from_cents)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    pub fn cents_part(&self) -> i64 {
        (self.cents % 100).abs()
    }

    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Multiplies a unit price by a quantity, returning `None` on overflow.
    pub fn checked_mul(&self, quantity: u32) -> Option<Money> {
        self.cents.checked_mul(i64::from(quantity)).map(Self::from_cents)
    }

    /// Adds two amounts, returning `None` on overflow.
    pub fn checked_add(&self, rhs: Money) -> Option<Money> {
        self.cents.checked_add(rhs.cents).map(Self::from_cents)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_dollars_and_cents() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_dollars(3).unwrap().to_string(), "$3.00");
        assert_eq!(Money::from_cents(-250).to_string(), "-$2.50");
    }

    #[test]
    fn line_totals_add_up() {
        let line = Money::from_cents(999).checked_mul(2).unwrap();
        let total = line.checked_add(Money::from_cents(1)).unwrap();
        assert_eq!(total.cents(), 1999);
        assert!(total.is_positive());
        assert!(!Money::zero().is_positive());
    }

    #[test]
    fn arithmetic_overflow_is_none() {
        assert_eq!(Money::from_cents(i64::MAX / 2).checked_mul(3), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_dollars(i64::MAX), None);
    }
}
