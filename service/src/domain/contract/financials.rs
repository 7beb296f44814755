//! Derived financial figures of a [`Contract`].

use common::{
    date::{days_between, Inclusion},
    Date, Money,
};
use xxhash_rust::xxh3;

use super::{Contract, Extension};

/// Financial figures derived from a [`Contract`]'s raw fields.
///
/// The one value object every consumer agrees on: the summary reads it
/// from the cache, recalculation writes it back, auditing re-derives it
/// for comparison.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct DerivedFinancials {
    /// Rental days between the original start and end dates.
    pub original_days: u32,

    /// Price of the original rental period.
    pub original_amount: Money,

    /// Agreed extension days past the original end date.
    pub extension_days: u32,

    /// Price of the extension period.
    pub extension_amount: Money,

    /// Unplanned days past the effective end date of a still-open
    /// rental.
    pub overdue_days: u32,

    /// Price of the overdue period.
    pub overdue_amount: Money,

    /// Total price of the whole rental.
    pub total: Money,
}

impl DerivedFinancials {
    /// Derives the financial figures of the provided [`Contract`] from
    /// first principles (dates and rate), ignoring any cached values.
    ///
    /// `as_of` is the calendar day overdue accrual is evaluated
    /// against; figures for an open overdue [`Contract`] grow as it
    /// advances.
    #[must_use]
    pub fn derive(contract: &Contract, as_of: Date) -> Self {
        let rate = contract.daily_rate;
        let zero = Money::zero(rate.currency);

        let original_days = days_between(
            contract.start_date,
            contract.end_date,
            Inclusion::Exclusive,
        );
        // A record without parsable dates keeps whatever total it
        // already had instead of being silently zeroed.
        let original_amount = if original_days > 0 {
            rate.times(original_days)
        } else {
            contract.total_amount
        };

        let extension_days = match contract.extension {
            Some(Extension::Until(until)) => days_between(
                contract.end_date,
                Some(until),
                Inclusion::Exclusive,
            ),
            Some(Extension::Days(days)) => days,
            None => 0,
        };
        let extension_amount = if extension_days > 0 {
            rate.times(extension_days)
        } else {
            zero
        };

        let overdue_days = if contract.is_closed() {
            // Closed rentals never accrue overdue charge.
            0
        } else {
            contract
                .effective_end()
                .filter(|end| *end < as_of)
                .map_or(0, |end| {
                    days_between(Some(end), Some(as_of), Inclusion::Exclusive)
                })
        };
        let overdue_amount = if overdue_days > 0 {
            rate.times(overdue_days)
        } else {
            zero
        };

        let billable = original_days + extension_days + overdue_days;
        let total = if billable > 0 && rate.is_positive() {
            rate.times(billable)
        } else {
            contract.total_amount
        };

        Self {
            original_days,
            original_amount,
            extension_days,
            extension_amount,
            overdue_days,
            overdue_amount,
            total,
        }
    }
}

/// Hash of the raw fields a recalculation depends on.
///
/// A [`Cache`] carrying a different [`SourceHash`] than its
/// [`Contract`] currently produces is stale, whatever its figures say.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(transparent)
)]
pub struct SourceHash(pub u64);

/// Memoized recalculation result persisted on a [`Contract`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cache {
    /// Figures produced by the recalculation.
    pub financials: DerivedFinancials,

    /// [`SourceHash`] of the raw fields the figures were derived from.
    ///
    /// [`None`] on records migrated before hashing existed; such a
    /// [`Cache`] is always considered stale.
    pub source_hash: Option<SourceHash>,

    /// Calendar day the overdue figures were evaluated against.
    pub as_of: Option<Date>,
}

impl Contract {
    /// Returns the [`SourceHash`] of this [`Contract`]'s raw
    /// recalculation inputs.
    #[must_use]
    pub fn source_hash(&self) -> SourceHash {
        use std::hash::{Hash as _, Hasher as _};

        // WARNING: Avoid changing the order of the fields in the
        //          hasher, otherwise all persisted caches will be
        //          considered stale at once.
        let mut hasher = xxh3::Xxh3Builder::new().build();
        self.start_date.map(|d| d.to_iso()).hash(&mut hasher);
        self.end_date.map(|d| d.to_iso()).hash(&mut hasher);
        self.daily_rate.to_string().hash(&mut hasher);
        match self.extension {
            Some(Extension::Until(until)) => {
                1_u8.hash(&mut hasher);
                until.to_iso().hash(&mut hasher);
            }
            Some(Extension::Days(days)) => {
                2_u8.hash(&mut hasher);
                days.hash(&mut hasher);
            }
            None => 0_u8.hash(&mut hasher),
        }
        SourceHash(hasher.finish())
    }

    /// Returns this [`Contract`] with its financial figures recomputed
    /// from first principles and memoized into the [`Cache`].
    ///
    /// The input is never mutated. The returned value is the input
    /// itself when the [`Cache`] is fresh: its [`SourceHash`] matches
    /// and no extension or overdue charge is present (those drift as
    /// calendar days pass and must be re-evaluated on every run).
    #[must_use]
    pub fn recalculated(&self, as_of: Date) -> Self {
        let financials = DerivedFinancials::derive(self, as_of);
        let source_hash = self.source_hash();

        let fresh = self
            .cache
            .as_ref()
            .is_some_and(|c| c.source_hash == Some(source_hash));
        let drifting = financials.extension_amount.is_positive()
            || financials.overdue_amount.is_positive();
        if fresh && !drifting {
            return self.clone();
        }

        let mut updated = self.clone();
        updated.total_amount = financials.total;
        updated.cache = Some(Cache {
            financials,
            source_hash: Some(source_hash),
            as_of: Some(as_of),
        });
        updated
    }
}
