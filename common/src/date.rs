//! Calendar date utilities.

use std::{cmp::Ordering, marker::PhantomData, str::FromStr};

use derive_more::{Debug, Display, Error};
use time::{format_description::BorrowedFormatItem, macros::format_description};

/// ISO 8601 calendar date format (`YYYY-MM-DD`).
const ISO_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]");

/// Untyped calendar date.
pub type Date = DateOf;

/// Calendar date without any time-of-day component.
///
/// Rental billing operates on whole calendar days, so whatever
/// time-of-day a source record carried is discarded at the boundary
/// and never reaches the math.
#[derive(Debug)]
pub struct DateOf<Of: ?Sized = ()> {
    /// Inner representation of the date.
    inner: time::Date,

    /// Type parameter describing the kind of date.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateOf<Of> {
    /// Creates a new [`Date`] representing the current calendar day (UTC).
    #[must_use]
    pub fn today() -> Self {
        Self {
            inner: time::OffsetDateTime::now_utc().date(),
            _of: PhantomData,
        }
    }

    /// Creates a new [`Date`] from the provided ISO 8601 `YYYY-MM-DD`
    /// string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid calendar date.
    pub fn from_iso(input: &str) -> Result<Self, ParseError> {
        time::Date::parse(input, ISO_FORMAT)
            .map(|inner| Self {
                inner,
                _of: PhantomData,
            })
            .map_err(ParseError)
    }

    /// Returns this [`Date`] as an ISO 8601 `YYYY-MM-DD` string.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn to_iso(&self) -> String {
        self.inner
            .format(ISO_FORMAT)
            .unwrap_or_else(|e| panic!("cannot format `Date` as ISO 8601: {e}"))
    }

    /// Returns the number of whole days from this [`Date`] until the
    /// `other` one.
    ///
    /// Negative if `other` is earlier than this [`Date`].
    #[must_use]
    pub fn days_until<OtherOf: ?Sized>(&self, other: DateOf<OtherOf>) -> i64 {
        (other.inner - self.inner).whole_days()
    }

    /// Returns this [`Date`] advanced by the provided number of days.
    ///
    /// [`None`] is returned on calendar overflow.
    #[must_use]
    pub fn plus_days(self, days: u32) -> Option<Self> {
        self.inner
            .checked_add(time::Duration::days(i64::from(days)))
            .map(|inner| Self {
                inner,
                _of: PhantomData,
            })
    }

    /// Coerces one kind of [`Date`] into another.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateOf<NewOf> {
        DateOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> FromStr for DateOf<Of> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_iso(s)
    }
}

/// Error of parsing a [`Date`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid calendar date: {_0}")]
pub struct ParseError(time::error::Parse);

impl<Of: ?Sized> Copy for DateOf<Of> {}
impl<Of: ?Sized> Clone for DateOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateOf<Of> {}
impl<Of: ?Sized> PartialEq for DateOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> From<time::Date> for DateOf<Of> {
    fn from(inner: time::Date) -> Self {
        Self {
            inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> From<DateOf<Of>> for time::Date {
    fn from(date: DateOf<Of>) -> Self {
        date.inner
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    //! Custom Serde support for [`Date`].

    #[cfg(doc)]
    use super::Date;

    pub mod iso {
        //! [`Date`] (de)serialization as an ISO 8601 `YYYY-MM-DD`
        //! string.

        use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

        use crate::DateOf;

        /// Serializes a [`DateOf`] as an ISO 8601 string.
        ///
        /// # Errors
        ///
        /// Never errors by itself, only if the `serializer` does.
        pub fn serialize<S, Of>(
            date: &DateOf<Of>,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
            Of: ?Sized,
        {
            serializer.serialize_str(&date.to_iso())
        }

        /// Deserializes a [`DateOf`] from an ISO 8601 string.
        ///
        /// # Errors
        ///
        /// If the deserialized string is not a valid calendar date.
        pub fn deserialize<'de, D, Of>(
            deserializer: D,
        ) -> Result<DateOf<Of>, D::Error>
        where
            D: Deserializer<'de>,
            Of: ?Sized,
        {
            DateOf::from_iso(&String::deserialize(deserializer)?)
                .map_err(D::Error::custom)
        }
    }
}

/// Mode of a [`days_between()`] span.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Inclusion {
    /// Plain whole-day difference between the boundaries.
    Exclusive,

    /// The final boundary day counts in addition to the exclusive span.
    Inclusive,
}

/// Counts billable days between the two provided calendar dates.
///
/// - Either boundary missing yields `0` (a record without dates cannot
///   be billed, but must not fail a batch run either).
/// - Equal dates yield `1`: a same-day rental is still one billable
///   day.
/// - Otherwise the exclusive whole-day difference is returned, floored
///   at `1`, plus one more day under [`Inclusion::Inclusive`].
#[must_use]
pub fn days_between<Of: ?Sized>(
    start: Option<DateOf<Of>>,
    end: Option<DateOf<Of>>,
    inclusion: Inclusion,
) -> u32 {
    let (Some(start), Some(end)) = (start, end) else {
        return 0;
    };

    if start == end {
        return 1;
    }

    #[expect(clippy::cast_possible_truncation, reason = "clamped")]
    #[expect(clippy::cast_sign_loss, reason = "clamped")]
    let exclusive = start.days_until(end).max(1) as u32;
    match inclusion {
        Inclusion::Exclusive => exclusive,
        Inclusion::Inclusive => exclusive + 1,
    }
}

#[cfg(test)]
mod spec {
    use time::macros::date;

    use super::{days_between, Date, Inclusion};

    fn d(inner: time::Date) -> Date {
        inner.into()
    }

    #[test]
    fn parses_and_formats_iso() {
        let date = Date::from_iso("2025-01-10").unwrap();
        assert_eq!(date, d(date!(2025 - 01 - 10)));
        assert_eq!(date.to_iso(), "2025-01-10");

        assert!(Date::from_iso("2025-13-01").is_err());
        assert!(Date::from_iso("10/01/2025").is_err());
        assert!(Date::from_iso("").is_err());
    }

    #[test]
    fn same_day_counts_as_one() {
        let day = d(date!(2025 - 03 - 07));
        assert_eq!(days_between(Some(day), Some(day), Inclusion::Exclusive), 1);
        assert_eq!(days_between(Some(day), Some(day), Inclusion::Inclusive), 1);
    }

    #[test]
    fn missing_boundary_yields_zero() {
        let day = d(date!(2025 - 03 - 07));
        assert_eq!(days_between(Some(day), None, Inclusion::Exclusive), 0);
        assert_eq!(days_between(None, Some(day), Inclusion::Exclusive), 0);
        assert_eq!(days_between::<()>(None, None, Inclusion::Inclusive), 0);
    }

    #[test]
    fn exclusive_and_inclusive_spans() {
        let start = d(date!(2025 - 01 - 10));
        let end = d(date!(2025 - 01 - 14));
        assert_eq!(
            days_between(Some(start), Some(end), Inclusion::Exclusive),
            4,
        );
        assert_eq!(
            days_between(Some(start), Some(end), Inclusion::Inclusive),
            5,
        );
    }

    #[test]
    fn never_below_one_for_valid_dates() {
        let start = d(date!(2025 - 01 - 14));
        let end = d(date!(2025 - 01 - 10));
        // Reversed boundaries still bill a single day.
        assert_eq!(
            days_between(Some(start), Some(end), Inclusion::Exclusive),
            1,
        );
    }

    #[test]
    fn spans_a_month_boundary() {
        let start = d(date!(2025 - 01 - 30));
        let end = d(date!(2025 - 02 - 02));
        assert_eq!(
            days_between(Some(start), Some(end), Inclusion::Exclusive),
            3,
        );
    }

    #[test]
    fn plus_days_advances_the_calendar() {
        let day = d(date!(2025 - 01 - 30)).plus_days(5).unwrap();
        assert_eq!(day, d(date!(2025 - 02 - 04)));
    }
}
