//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a new [`Money`] amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero [`Money`] amount in the provided [`Currency`].
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Indicates whether this [`Money`] amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Indicates whether this [`Money`] amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Multiplies this [`Money`] amount by the provided number of days.
    #[must_use]
    pub fn times(self, days: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(days),
            currency: self.currency,
        }
    }

    /// Adds the `other` [`Money`] amount to this one.
    ///
    /// [`None`] is returned on a [`Currency`] mismatch.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        (self.currency == other.currency).then(|| Self {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// Subtracts the `other` [`Money`] amount from this one, clamping
    /// the result at zero.
    ///
    /// On a [`Currency`] mismatch this amount is returned unchanged:
    /// mixed currencies are a data defect surfaced by auditing, not a
    /// reason to fail a computation.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if self.currency != other.currency {
            return self;
        }
        Self {
            amount: (self.amount - other.amount).max(Decimal::ZERO),
            currency: self.currency,
        }
    }

    /// Indicates whether this [`Money`] amount differs from the `other`
    /// one by more than the provided `tolerance`.
    ///
    /// A [`Currency`] mismatch always counts as a difference.
    #[must_use]
    pub fn differs_from(&self, other: &Self, tolerance: Decimal) -> bool {
        self.currency != other.currency
            || (self.amount - other.amount).abs() > tolerance
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        if amount.is_integer() {
            write!(f, "{}{currency}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount}{currency}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 {
            return Err("too short");
        }
        if !s.is_char_boundary(s.len() - 3) {
            return Err("invalid currency");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.

    use std::str::FromStr as _;

    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use super::Money;

    impl serde::Serialize for Money {
        fn serialize<S: Serializer>(
            &self,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for Money {
        fn deserialize<D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Self, D::Error> {
            Self::from_str(&String::deserialize(deserializer)?)
                .map_err(D::Error::custom)
        }
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Euro."]
        Eur = 1,

        #[doc = "US Dollar."]
        Usd = 2,

        #[doc = "Pound Sterling."]
        Gbp = 3,
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn eur(s: &str) -> Money {
        Money::new(decimal(s), Currency::Eur)
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("123.45EUR").unwrap(),
            Money {
                amount: decimal("123.45"),
                currency: Currency::Eur,
            },
        );

        assert_eq!(
            Money::from_str("123.45USD").unwrap(),
            Money {
                amount: decimal("123.45"),
                currency: Currency::Usd,
            },
        );

        assert!(Money::from_str("123.45").is_err());
        assert!(Money::from_str("123.45Eu").is_err());
        assert!(Money::from_str("123.45Euros").is_err());
        assert!(Money::from_str("45€a").is_err());
        assert!(Money::from_str("45€€").is_err());

        assert!(Money::from_str("123.00EUR").is_ok());
        assert!(Money::from_str("123.0EUR").is_ok());
        assert!(Money::from_str("123EUR").is_ok());
    }

    #[test]
    fn to_string() {
        assert_eq!(eur("123.45").to_string(), "123.45EUR");
        assert_eq!(eur("123.00").to_string(), "123EUR");
        assert_eq!(
            Money::new(decimal("123"), Currency::Usd).to_string(),
            "123USD",
        );
    }

    #[test]
    fn times_scales_by_whole_days() {
        assert_eq!(eur("300").times(4), eur("1200"));
        assert_eq!(eur("99.50").times(2), eur("199.00"));
        assert_eq!(eur("300").times(0), eur("0"));
    }

    #[test]
    fn saturating_sub_never_goes_negative() {
        assert_eq!(eur("1200").saturating_sub(eur("200")), eur("1000"));
        assert_eq!(eur("200").saturating_sub(eur("1200")), eur("0"));
        assert_eq!(eur("200").saturating_sub(eur("200")), eur("0"));
    }

    #[test]
    fn currency_mismatch_degrades_safely() {
        let usd = Money::new(decimal("100"), Currency::Usd);
        assert_eq!(eur("300").checked_add(usd), None);
        assert_eq!(eur("300").saturating_sub(usd), eur("300"));
        assert!(eur("100").differs_from(&usd, decimal("0.01")));
    }

    #[test]
    fn tolerance_absorbs_rounding_noise() {
        assert!(!eur("100.00").differs_from(&eur("100.004"), decimal("0.01")));
        assert!(eur("100.00").differs_from(&eur("100.02"), decimal("0.01")));
    }
}
