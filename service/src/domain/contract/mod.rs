//! [`Contract`] definitions.

pub mod audit;
pub mod financials;
#[cfg(feature = "serde")]
pub mod legacy;
pub mod status;
pub mod summary;

use common::{define_kind, Date, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::{
    audit::Audit,
    financials::{Cache, DerivedFinancials, SourceHash},
    status::FinancialStatus,
    summary::Summary,
};

/// Rental contract.
///
/// This is the canonical shape every computation works on. Historical
/// field-name variants and stringly-typed values are normalized into it
/// once, by [`legacy::Record`], so no fallback chains exist past this
/// boundary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Contract {
    /// ID of this [`Contract`].
    pub id: Id,

    /// Human-readable [`Number`] of this [`Contract`].
    pub number: Number,

    /// First day of the rental.
    ///
    /// [`None`] means the source record carried no parsable date; such
    /// a [`Contract`] cannot be billed from dates, but must not fail
    /// any batch computation either.
    pub start_date: Option<Date>,

    /// Last agreed day of the rental (before any [`Extension`]).
    pub end_date: Option<Date>,

    /// Agreed prolongation of the rental past its [`end_date`], if any.
    ///
    /// [`end_date`]: Contract::end_date
    pub extension: Option<Extension>,

    /// Directly entered rental duration, overriding the date-derived
    /// one.
    pub duration_override: Option<u32>,

    /// Price of a single rental day.
    pub daily_rate: common::Money,

    /// Up-front payment recorded on this [`Contract`] itself.
    ///
    /// Supplementary payments live in the external ledger and are
    /// layered on top by [`PaymentSummary`], never merged into this
    /// field.
    ///
    /// [`PaymentSummary`]: crate::domain::PaymentSummary
    pub advance_payment: common::Money,

    /// Total price of this [`Contract`].
    ///
    /// Both an input (legacy and manually edited records) and an
    /// output (refreshed by recalculation).
    pub total_amount: common::Money,

    /// [`Lifecycle`] state of this [`Contract`].
    pub lifecycle: Lifecycle,

    /// Previously computed figures, memoized by recalculation.
    pub cache: Option<Cache>,

    /// Bulk-migration marker, if this [`Contract`] was migrated.
    pub migration: Option<Migration>,
}

impl Contract {
    /// Indicates whether this [`Contract`] is closed.
    ///
    /// Every [`Lifecycle`] state other than [`Lifecycle::Closed`]
    /// behaves as open.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lifecycle == Lifecycle::Closed
    }

    /// Returns the effective end date of this [`Contract`]: the
    /// extension boundary when one is agreed, the plain [`end_date`]
    /// otherwise.
    ///
    /// This is the reference point for overdue accrual.
    ///
    /// [`end_date`]: Contract::end_date
    #[must_use]
    pub fn effective_end(&self) -> Option<Date> {
        match self.extension {
            Some(Extension::Until(date)) => Some(date),
            Some(Extension::Days(days)) => {
                self.end_date.and_then(|end| end.plus_days(days))
            }
            None => self.end_date,
        }
    }
}

/// ID of a [`Contract`].
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, FromStr, Hash, Into,
    PartialEq,
)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Human-readable number of a [`Contract`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Number(String);

impl Number {
    /// Creates a new [`Number`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Creates a [`Number`] recovered from the [`Contract`]'s [`Id`],
    /// for records whose own number is absent or unusable.
    #[must_use]
    pub fn recovered(id: Id) -> Self {
        Self(format!("contract-{id}"))
    }

    /// Returns the inner string of this [`Number`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether the given `number` is a valid [`Number`].
    fn check(number: impl AsRef<str>) -> bool {
        let number = number.as_ref();
        number.trim() == number && !number.is_empty() && number.len() <= 64
    }
}

impl std::str::FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Number`")
    }
}

/// Agreed prolongation of a rental past its original end date.
///
/// Source records may carry both a prolongation date and a day count;
/// normalization keeps exactly one, the date winning over the count.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Extension {
    /// Prolonged until the provided calendar date.
    Until(Date),

    /// Prolonged by the provided number of days past the original end
    /// date. Always positive: a zero count means no extension and is
    /// normalized away.
    Days(u32),
}

define_kind! {
    #[doc = "Lifecycle state of a [`Contract`]."]
    enum Lifecycle {
        #[doc = "The rental is running."]
        Open = 1,

        #[doc = "The rental is finished and settled administratively."]
        Closed = 2,

        #[doc = "The [`Contract`] is drafted but not yet in force."]
        Draft = 3,

        #[doc = "The [`Contract`] was cancelled before its start."]
        Cancelled = 4,
    }
}

/// Marker type indicating [`Contract`] migration.
#[derive(Clone, Copy, Debug)]
pub struct Migrated;

/// Bulk-migration marker of a [`Contract`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Migration {
    /// When the [`Contract`] was migrated.
    pub at: DateTimeOf<(Contract, Migrated)>,

    /// Version of the migration that processed the [`Contract`].
    pub version: u16,
}
