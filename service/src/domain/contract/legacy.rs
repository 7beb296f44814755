//! Legacy-record adapter for [`Contract`]s.
//!
//! The back office accumulated several historical names and encodings
//! for the same concepts (French-era field names, duration overrides
//! under three spellings, extension markers as either a date or a day
//! count). All that tolerance lives here, in one serde [`Record`]:
//! stored records are read under any historical name and written back
//! under the canonical one, and every computation past this boundary
//! sees only the canonical [`Contract`].

use std::str::FromStr as _;

use common::{money::Currency, Date, DateTime, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing as log;

use super::{
    financials::{Cache, DerivedFinancials, SourceHash},
    Contract, Extension, Id, Lifecycle, Migration, Number,
};

/// Stored representation of a [`Contract`], tolerant of historical
/// field names and partially migrated data.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Record {
    /// ID of the contract.
    pub id: Option<Id>,

    /// Human-readable contract number.
    #[serde(alias = "contractNumber", alias = "numero")]
    pub number: Option<String>,

    /// First rental day, as an ISO 8601 date string.
    #[serde(alias = "dateDebut")]
    pub start_date: Option<String>,

    /// Last agreed rental day, as an ISO 8601 date string.
    #[serde(alias = "dateFin")]
    pub end_date: Option<String>,

    /// Extension boundary date, under either of its historical names.
    #[serde(alias = "prolongationJusquau")]
    pub extension_until: Option<String>,

    /// Extension day count.
    #[serde(alias = "joursSupplementaires")]
    pub extended_days: Option<u32>,

    /// Price of a single rental day.
    #[serde(alias = "tarifJournalier")]
    pub daily_rate: Option<Decimal>,

    /// Up-front payment recorded on the contract.
    #[serde(alias = "avance")]
    pub advance_payment: Option<Decimal>,

    /// Stored total price.
    #[serde(alias = "montantTotal")]
    pub total_amount: Option<Decimal>,

    /// Currency all the record's amounts are denominated in.
    pub currency: Option<Currency>,

    /// Lifecycle state, as a string.
    #[serde(alias = "statut")]
    pub lifecycle: Option<String>,

    /// Previously computed figures and duration overrides.
    pub contract_data: Option<CacheRecord>,

    /// Unix timestamp of the bulk migration that processed the record.
    pub migrated_at: Option<i64>,

    /// Version of the bulk migration that processed the record.
    pub migrated_version: Option<u16>,
}

/// Stored bag of previously computed figures.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheRecord {
    /// Hash of the raw fields the figures were derived from.
    pub source_hash: Option<u64>,

    /// Calendar day the overdue figures were evaluated against.
    pub as_of: Option<String>,

    /// Rental days of the original period.
    pub original_days: Option<u32>,

    /// Price of the original period.
    pub original_amount: Option<Decimal>,

    /// Agreed extension days.
    pub extension_days: Option<u32>,

    /// Price of the extension period.
    pub extension_amount: Option<Decimal>,

    /// Accrued overdue days.
    pub overdue_days: Option<u32>,

    /// Price of the overdue period.
    pub overdue_amount: Option<Decimal>,

    /// Directly entered duration, under any of its historical names.
    #[serde(alias = "rentalDays", alias = "nombreDeJours")]
    pub duration: Option<u32>,
}

impl CacheRecord {
    /// Indicates whether this bag carries any computed figure at all.
    fn has_figures(&self) -> bool {
        self.source_hash.is_some()
            || self.original_days.is_some()
            || self.original_amount.is_some()
            || self.extension_days.is_some()
            || self.extension_amount.is_some()
            || self.overdue_days.is_some()
            || self.overdue_amount.is_some()
    }
}

impl Record {
    /// Normalizes this [`Record`] into the canonical [`Contract`].
    ///
    /// Never fails: unparsable dates are logged and degrade to
    /// [`None`], unknown lifecycle states degrade to open semantics,
    /// missing amounts degrade to zero. A bad record must not fail a
    /// batch read of the whole collection.
    #[must_use]
    pub fn normalize(self) -> Contract {
        let id = self.id.unwrap_or_else(|| {
            let id = Id::new();
            log::warn!("contract record without an id, assigned `{id}`");
            id
        });
        let number = self
            .number
            .and_then(Number::new)
            .unwrap_or_else(|| Number::recovered(id));

        let start_date = parse_date("start_date", self.start_date.as_deref());
        let end_date = parse_date("end_date", self.end_date.as_deref());

        // The extension date wins over the day count whenever a record
        // carries both.
        let extension = parse_date(
            "extension_until",
            self.extension_until.as_deref(),
        )
        .map(Extension::Until)
        .or_else(|| {
            self.extended_days
                .filter(|days| *days > 0)
                .map(Extension::Days)
        });

        let currency = self.currency.unwrap_or(Currency::Eur);
        let money = |amount: Option<Decimal>| {
            Money::new(amount.unwrap_or(Decimal::ZERO), currency)
        };

        let lifecycle = self
            .lifecycle
            .as_deref()
            .map(str::trim)
            .map(str::to_uppercase)
            .and_then(|s| Lifecycle::from_str(&s).ok())
            .unwrap_or(Lifecycle::Open);

        let duration_override = self
            .contract_data
            .as_ref()
            .and_then(|data| data.duration)
            .filter(|days| *days > 0);

        let cache = self
            .contract_data
            .filter(CacheRecord::has_figures)
            .map(|data| Cache {
                financials: DerivedFinancials {
                    original_days: data.original_days.unwrap_or(0),
                    original_amount: money(data.original_amount),
                    extension_days: data.extension_days.unwrap_or(0),
                    extension_amount: money(data.extension_amount),
                    overdue_days: data.overdue_days.unwrap_or(0),
                    overdue_amount: money(data.overdue_amount),
                    total: money(self.total_amount),
                },
                source_hash: data.source_hash.map(SourceHash),
                as_of: parse_date("as_of", data.as_of.as_deref()),
            });

        let migration = match (self.migrated_at, self.migrated_version) {
            (Some(at), Some(version)) => DateTime::from_unix_timestamp(at)
                .map(|at| Migration {
                    at: at.coerce(),
                    version,
                }),
            (None, _) | (_, None) => None,
        };

        Contract {
            id,
            number,
            start_date,
            end_date,
            extension,
            duration_override,
            daily_rate: money(self.daily_rate),
            advance_payment: money(self.advance_payment),
            total_amount: money(self.total_amount),
            lifecycle,
            cache,
            migration,
        }
    }
}

impl From<&Contract> for Record {
    /// Writes the canonical [`Contract`] back under canonical field
    /// names only.
    fn from(contract: &Contract) -> Self {
        let (extension_until, extended_days) = match contract.extension {
            Some(Extension::Until(until)) => (Some(until.to_iso()), None),
            Some(Extension::Days(days)) => (None, Some(days)),
            None => (None, None),
        };

        let contract_data = match (&contract.cache, contract.duration_override)
        {
            (None, None) => None,
            (cache, duration) => Some(CacheRecord {
                source_hash: cache
                    .as_ref()
                    .and_then(|c| c.source_hash.map(|h| h.0)),
                as_of: cache
                    .as_ref()
                    .and_then(|c| c.as_of.map(|d| d.to_iso())),
                original_days: cache
                    .as_ref()
                    .map(|c| c.financials.original_days),
                original_amount: cache
                    .as_ref()
                    .map(|c| c.financials.original_amount.amount),
                extension_days: cache
                    .as_ref()
                    .map(|c| c.financials.extension_days),
                extension_amount: cache
                    .as_ref()
                    .map(|c| c.financials.extension_amount.amount),
                overdue_days: cache.as_ref().map(|c| c.financials.overdue_days),
                overdue_amount: cache
                    .as_ref()
                    .map(|c| c.financials.overdue_amount.amount),
                duration,
            }),
        };

        Self {
            id: Some(contract.id),
            number: Some(contract.number.as_str().to_owned()),
            start_date: contract.start_date.map(|d| d.to_iso()),
            end_date: contract.end_date.map(|d| d.to_iso()),
            extension_until,
            extended_days,
            daily_rate: Some(contract.daily_rate.amount),
            advance_payment: Some(contract.advance_payment.amount),
            total_amount: Some(contract.total_amount.amount),
            currency: Some(contract.daily_rate.currency),
            lifecycle: Some(contract.lifecycle.to_string()),
            contract_data,
            migrated_at: contract.migration.map(|m| m.at.unix_timestamp()),
            migrated_version: contract.migration.map(|m| m.version),
        }
    }
}

/// Parses an optional ISO 8601 date string, logging and discarding
/// unparsable input instead of failing.
fn parse_date(field: &str, value: Option<&str>) -> Option<Date> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    match Date::from_iso(raw) {
        Ok(date) => Some(date),
        Err(e) => {
            log::warn!("ignoring unparsable `{field}` value `{raw}`: {e}");
            None
        }
    }
}

#[cfg(test)]
mod spec {
    use common::money::Currency;

    use crate::domain::contract::{Extension, Lifecycle};

    use super::Record;

    fn record(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn normalizes_canonical_fields() {
        let c = record(
            r#"{
                "id": "0191d1a0-0000-7000-8000-000000000001",
                "number": "VR-2025-0001",
                "startDate": "2025-01-10",
                "endDate": "2025-01-14",
                "dailyRate": 300,
                "advancePayment": 0,
                "totalAmount": 1200,
                "lifecycle": "OPEN"
            }"#,
        )
        .normalize();

        assert_eq!(c.number.as_str(), "VR-2025-0001");
        assert_eq!(c.start_date.unwrap().to_iso(), "2025-01-10");
        assert_eq!(c.daily_rate, "300EUR".parse().unwrap());
        assert_eq!(c.lifecycle, Lifecycle::Open);
        assert_eq!(c.cache, None);
    }

    #[test]
    fn accepts_historical_field_names() {
        let c = record(
            r#"{
                "numero": "VR-2019-0042",
                "dateDebut": "2019-06-01",
                "dateFin": "2019-06-10",
                "tarifJournalier": "250",
                "statut": "closed",
                "contractData": {"nombreDeJours": 9}
            }"#,
        )
        .normalize();

        assert_eq!(c.number.as_str(), "VR-2019-0042");
        assert_eq!(c.end_date.unwrap().to_iso(), "2019-06-10");
        assert_eq!(c.daily_rate, "250EUR".parse().unwrap());
        assert_eq!(c.lifecycle, Lifecycle::Closed);
        assert_eq!(c.duration_override, Some(9));
    }

    #[test]
    fn the_extension_date_wins_over_the_day_count() {
        let c = record(
            r#"{
                "endDate": "2025-01-14",
                "extensionUntil": "2025-01-18",
                "extendedDays": 7
            }"#,
        )
        .normalize();
        assert_eq!(
            c.extension,
            Some(Extension::Until("2025-01-18".parse().unwrap())),
        );
    }

    #[test]
    fn a_zero_day_count_is_no_extension() {
        let c = record(r#"{"extendedDays": 0}"#).normalize();
        assert_eq!(c.extension, None);
    }

    #[test]
    fn unparsable_dates_degrade_to_none() {
        let c = record(
            r#"{"startDate": "soon", "endDate": "2025-01-14"}"#,
        )
        .normalize();
        assert_eq!(c.start_date, None);
        assert_eq!(c.end_date.unwrap().to_iso(), "2025-01-14");
    }

    #[test]
    fn unknown_lifecycle_states_fall_back_to_open() {
        let c = record(r#"{"lifecycle": "ARCHIVED"}"#).normalize();
        assert_eq!(c.lifecycle, Lifecycle::Open);
    }

    #[test]
    fn a_partially_migrated_cache_is_kept_but_stale() {
        let c = record(
            r#"{
                "totalAmount": 1200,
                "contractData": {"originalDays": 4, "originalAmount": 1200}
            }"#,
        )
        .normalize();

        let cache = c.cache.unwrap();
        assert_eq!(cache.financials.original_days, 4);
        assert_eq!(cache.source_hash, None);
        assert_eq!(cache.financials.total, "1200EUR".parse().unwrap());
    }

    #[test]
    fn a_stored_as_of_date_survives_normalization() {
        let c = record(
            r#"{
                "contractData": {
                    "sourceHash": 7,
                    "originalDays": 4,
                    "asOf": "2025-01-20"
                }
            }"#,
        )
        .normalize();
        assert_eq!(c.cache.unwrap().as_of.unwrap().to_iso(), "2025-01-20");
    }

    #[test]
    fn currencies_other_than_the_default_are_honored() {
        let c = record(r#"{"dailyRate": 100, "currency": "USD"}"#).normalize();
        assert_eq!(c.daily_rate.currency, Currency::Usd);
    }

    #[test]
    fn round_trips_through_the_canonical_names() {
        let c = record(
            r#"{
                "numero": "VR-2019-0042",
                "dateDebut": "2019-06-01",
                "dateFin": "2019-06-10",
                "tarifJournalier": 250,
                "statut": "OPEN",
                "extendedDays": 3
            }"#,
        )
        .normalize();

        let rewritten = Record::from(&c).normalize();
        assert_eq!(rewritten, c);
    }
}
