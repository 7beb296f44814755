//! Derived [`Summary`] of a [`Contract`].

use common::{
    date::{days_between, Inclusion},
    define_kind, Date, Money,
};

use super::{Contract, Extension};

/// Read-time financial summary of a [`Contract`].
///
/// Cheap to produce repeatedly: cached figures are preferred over date
/// math, and nothing is written back.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Summary {
    /// Rental days of the original period.
    pub base_days: u32,

    /// Agreed extension days.
    pub extension_days: u32,

    /// Accrued overdue days.
    pub overdue_days: u32,

    /// Total billable duration, the sum of the three components above.
    pub duration: u32,

    /// Price of a single rental day.
    pub unit_price: Money,

    /// Total price of the rental.
    pub total: Money,

    /// Amount already paid up front.
    pub amount_advanced: Money,

    /// Amount still owed, never negative.
    pub amount_remaining: Money,

    /// Coarse payment [`Phase`].
    pub phase: Phase,
}

impl Default for Summary {
    /// A zeroed [`Summary`], produced when there is no [`Contract`] to
    /// summarize.
    fn default() -> Self {
        let zero = Money::zero(common::money::Currency::Eur);
        Self {
            base_days: 0,
            extension_days: 0,
            overdue_days: 0,
            duration: 0,
            unit_price: zero,
            total: zero,
            amount_advanced: zero,
            amount_remaining: zero,
            phase: Phase::Pending,
        }
    }
}

define_kind! {
    #[doc = "Coarse payment phase of a [`Contract`]."]
    enum Phase {
        #[doc = "Nothing has been paid yet."]
        Pending = 1,

        #[doc = "Partially paid."]
        InProgress = 2,

        #[doc = "Nothing remains to be paid."]
        Paid = 3,
    }
}

impl Contract {
    /// Summarizes this [`Contract`]'s finances as of the provided
    /// calendar day.
    ///
    /// Cached figures win over re-derivation from dates, so a stale
    /// cache reproduces stale numbers by design: refreshing the cache
    /// is recalculation's job, not this reader's.
    #[must_use]
    pub fn summarize(&self, as_of: Date) -> Summary {
        let cached = self.cache.as_ref().map(|c| &c.financials);

        let base_days = {
            let days = cached
                .map(|f| f.original_days)
                .filter(|days| *days > 0)
                .or(self.duration_override.filter(|days| *days > 0))
                .unwrap_or_else(|| {
                    days_between(
                        self.start_date,
                        self.end_date,
                        Inclusion::Exclusive,
                    )
                });
            // Even a dateless record bills a minimum of one day.
            days.max(1)
        };

        let extension_days = cached
            .map(|f| f.extension_days)
            .filter(|days| *days > 0)
            .unwrap_or_else(|| match self.extension {
                Some(Extension::Until(until)) => days_between(
                    self.end_date,
                    Some(until),
                    Inclusion::Exclusive,
                ),
                Some(Extension::Days(days)) => days,
                None => 0,
            });

        let overdue_days = cached
            .map(|f| f.overdue_days)
            .filter(|days| *days > 0)
            .unwrap_or_else(|| {
                if self.is_closed() {
                    return 0;
                }
                self.effective_end()
                    .filter(|end| *end < as_of)
                    .map_or(0, |end| {
                        days_between(
                            Some(end),
                            Some(as_of),
                            Inclusion::Exclusive,
                        )
                    })
            });

        let duration = base_days + extension_days + overdue_days;
        let unit_price = self.daily_rate;
        let total = if unit_price.is_positive() && duration > 0 {
            unit_price.times(duration)
        } else {
            Money::zero(unit_price.currency)
        };

        let amount_advanced = self.advance_payment;
        let amount_remaining = total.saturating_sub(amount_advanced);

        let phase = if amount_remaining.is_zero() {
            Phase::Paid
        } else if amount_advanced.is_positive() {
            Phase::InProgress
        } else {
            Phase::Pending
        };

        Summary {
            base_days,
            extension_days,
            overdue_days,
            duration,
            unit_price,
            total,
            amount_advanced,
            amount_remaining,
            phase,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::domain::contract::{
        Contract, Extension, Id, Lifecycle, Number,
    };

    use super::Phase;

    fn date(s: &str) -> Date {
        Date::from_iso(s).unwrap()
    }

    fn contract() -> Contract {
        Contract {
            id: Id::new(),
            number: Number::new("VR-2025-0001").unwrap(),
            start_date: Some(date("2025-01-10")),
            end_date: Some(date("2025-01-14")),
            extension: None,
            duration_override: None,
            daily_rate: "300EUR".parse().unwrap(),
            advance_payment: "0EUR".parse().unwrap(),
            total_amount: "0EUR".parse().unwrap(),
            lifecycle: Lifecycle::Open,
            cache: None,
            migration: None,
        }
    }

    #[test]
    fn summarizes_a_running_rental() {
        let s = contract().summarize(date("2025-01-12"));
        assert_eq!(s.base_days, 4);
        assert_eq!(s.extension_days, 0);
        assert_eq!(s.overdue_days, 0);
        assert_eq!(s.duration, 4);
        assert_eq!(s.total, "1200EUR".parse().unwrap());
        assert_eq!(s.amount_remaining, "1200EUR".parse().unwrap());
        assert_eq!(s.phase, Phase::Pending);
    }

    #[test]
    fn duration_is_the_sum_of_its_components() {
        let mut c = contract();
        c.extension = Some(Extension::Until(date("2025-01-18")));
        let s = c.summarize(date("2025-01-20"));
        assert_eq!(s.base_days, 4);
        assert_eq!(s.extension_days, 4);
        assert_eq!(s.overdue_days, 2);
        assert_eq!(s.duration, s.base_days + s.extension_days + s.overdue_days);
        assert_eq!(s.total, "3000EUR".parse().unwrap());
    }

    #[test]
    fn cached_figures_win_over_date_math() {
        let c = contract().recalculated(date("2025-01-12"));
        let mut repriced = c.clone();
        // Summary is a truth-reader: it must not notice the raw dates
        // behind a populated cache.
        repriced.start_date = Some(date("2025-01-01"));
        let s = repriced.summarize(date("2025-01-12"));
        assert_eq!(s.base_days, 4);
    }

    #[test]
    fn duration_override_beats_date_math() {
        let mut c = contract();
        c.duration_override = Some(10);
        let s = c.summarize(date("2025-01-12"));
        assert_eq!(s.base_days, 10);
        assert_eq!(s.total, "3000EUR".parse().unwrap());
    }

    #[test]
    fn dateless_contracts_bill_a_single_day() {
        let mut c = contract();
        c.start_date = None;
        c.end_date = None;
        let s = c.summarize(date("2025-01-12"));
        assert_eq!(s.base_days, 1);
        assert_eq!(s.duration, 1);
        assert_eq!(s.total, "300EUR".parse().unwrap());
    }

    #[test]
    fn closed_contracts_do_not_accrue_overdue() {
        let mut c = contract();
        c.lifecycle = Lifecycle::Closed;
        let s = c.summarize(date("2025-02-20"));
        assert_eq!(s.overdue_days, 0);
    }

    #[test]
    fn remaining_is_never_negative() {
        let mut c = contract();
        c.advance_payment = "5000EUR".parse().unwrap();
        let s = c.summarize(date("2025-01-12"));
        assert_eq!(s.amount_remaining, "0EUR".parse().unwrap());
        assert_eq!(s.phase, Phase::Paid);
    }

    #[test]
    fn partial_advance_marks_payment_in_progress() {
        let mut c = contract();
        c.advance_payment = "200EUR".parse().unwrap();
        let s = c.summarize(date("2025-01-12"));
        assert_eq!(s.amount_remaining, "1000EUR".parse().unwrap());
        assert_eq!(s.phase, Phase::InProgress);
    }

    #[test]
    fn advance_is_never_inferred() {
        // A missing advance stays zero; price math must not fabricate
        // payment data.
        let s = contract().summarize(date("2025-01-12"));
        assert_eq!(s.amount_advanced, "0EUR".parse().unwrap());
    }
}
