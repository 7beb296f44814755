//! Read-only diagnostic auditing of a [`Contract`].

use common::{
    date::{days_between, Inclusion},
    define_kind, Date,
};
use rust_decimal::Decimal;

use super::{Contract, DerivedFinancials};

define_kind! {
    #[doc = "Severity of an audit finding."]
    enum Severity {
        #[doc = "No discrepancy found."]
        Info = 1,

        #[doc = "Stored figures disagree with re-derived ones."]
        Warning = 2,

        #[doc = "A field required for any computation is missing."]
        Critical = 3,
    }
}

/// Single finding of an [`Audit`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Issue {
    /// [`Severity`] of this [`Issue`].
    pub severity: Severity,

    /// Human-readable description of the discrepancy.
    pub message: String,
}

/// Result of diagnosing a single [`Contract`].
///
/// Discrepancies are reported, never repaired: fixing the stored
/// figures is recalculation's job, triggered deliberately.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Audit {
    /// Findings of the diagnosis, worst first.
    pub issues: Vec<Issue>,

    /// Figures re-derived from the raw dates and rate, for comparison
    /// against whatever is stored.
    pub current: DerivedFinancials,

    /// Overall [`Severity`]: the worst finding, or [`Severity::Info`]
    /// when the [`Contract`] is consistent.
    pub severity: Severity,
}

impl Audit {
    /// Diagnoses the provided [`Contract`] as of the provided calendar
    /// day.
    ///
    /// `tolerance` absorbs sub-cent floating-point noise in amount
    /// comparisons; duration mismatches are flagged at any magnitude.
    #[must_use]
    pub fn of(contract: &Contract, as_of: Date, tolerance: Decimal) -> Self {
        let mut issues = Vec::new();

        if contract.start_date.is_none() {
            issues.push(Issue {
                severity: Severity::Critical,
                message: "missing or unparsable `start_date`".into(),
            });
        }
        if contract.end_date.is_none() {
            issues.push(Issue {
                severity: Severity::Critical,
                message: "missing or unparsable `end_date`".into(),
            });
        }
        if !contract.daily_rate.is_positive() {
            issues.push(Issue {
                severity: Severity::Critical,
                message: format!(
                    "`daily_rate` of {} is not positive",
                    contract.daily_rate,
                ),
            });
        }

        let current = DerivedFinancials::derive(contract, as_of);

        let claimed_days = contract
            .cache
            .as_ref()
            .map(|c| c.financials.original_days)
            .filter(|days| *days > 0)
            .or(contract.duration_override.filter(|days| *days > 0));
        let derived_days = days_between(
            contract.start_date,
            contract.end_date,
            Inclusion::Exclusive,
        );
        if let Some(claimed) = claimed_days {
            if derived_days > 0 && claimed != derived_days {
                issues.push(Issue {
                    severity: Severity::Warning,
                    message: format!(
                        "stored duration of {claimed} day(s) disagrees with \
                         the date-derived {derived_days} day(s)",
                    ),
                });
            }
        }

        if contract.total_amount.differs_from(&current.total, tolerance) {
            issues.push(Issue {
                severity: Severity::Warning,
                message: format!(
                    "stored `total_amount` of {} disagrees with the \
                     re-derived {}",
                    contract.total_amount, current.total,
                ),
            });
        }

        let stored_remaining = contract
            .total_amount
            .saturating_sub(contract.advance_payment);
        let derived_remaining =
            current.total.saturating_sub(contract.advance_payment);
        if stored_remaining.differs_from(&derived_remaining, tolerance) {
            issues.push(Issue {
                severity: Severity::Warning,
                message: format!(
                    "remaining amount of {stored_remaining} disagrees with \
                     the re-derived {derived_remaining}",
                ),
            });
        }

        issues.sort_by_key(|issue| std::cmp::Reverse(issue.severity.u8()));
        let severity = issues
            .first()
            .map_or(Severity::Info, |issue| issue.severity);

        Self {
            issues,
            current,
            severity,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Date;
    use rust_decimal::Decimal;

    use crate::domain::contract::{Contract, Id, Lifecycle, Number};

    use super::{Audit, Severity};

    fn date(s: &str) -> Date {
        Date::from_iso(s).unwrap()
    }

    fn tolerance() -> Decimal {
        Decimal::new(1, 2)
    }

    fn contract() -> Contract {
        Contract {
            id: Id::new(),
            number: Number::new("VR-2025-0003").unwrap(),
            start_date: Some(date("2025-01-10")),
            end_date: Some(date("2025-01-14")),
            extension: None,
            duration_override: None,
            daily_rate: "300EUR".parse().unwrap(),
            advance_payment: "0EUR".parse().unwrap(),
            total_amount: "1200EUR".parse().unwrap(),
            lifecycle: Lifecycle::Open,
            cache: None,
            migration: None,
        }
    }

    #[test]
    fn a_consistent_contract_audits_clean() {
        let audit = Audit::of(&contract(), date("2025-01-12"), tolerance());
        assert_eq!(audit.severity, Severity::Info);
        assert!(audit.issues.is_empty());
        assert_eq!(audit.current.original_days, 4);
    }

    #[test]
    fn missing_dates_are_critical() {
        let mut c = contract();
        c.start_date = None;
        let audit = Audit::of(&c, date("2025-01-12"), tolerance());
        assert_eq!(audit.severity, Severity::Critical);
        assert!(audit
            .issues
            .iter()
            .any(|i| i.message.contains("`start_date`")));
    }

    #[test]
    fn a_non_positive_rate_is_critical() {
        let mut c = contract();
        c.daily_rate = "0EUR".parse().unwrap();
        let audit = Audit::of(&c, date("2025-01-12"), tolerance());
        assert_eq!(audit.severity, Severity::Critical);
    }

    #[test]
    fn a_diverged_total_is_a_warning() {
        let mut c = contract();
        c.total_amount = "1500EUR".parse().unwrap();
        let audit = Audit::of(&c, date("2025-01-12"), tolerance());
        assert_eq!(audit.severity, Severity::Warning);
        assert!(audit
            .issues
            .iter()
            .any(|i| i.message.contains("`total_amount`")));
    }

    #[test]
    fn sub_cent_noise_is_tolerated() {
        let mut c = contract();
        c.total_amount = "1200.004EUR".parse().unwrap();
        let audit = Audit::of(&c, date("2025-01-12"), tolerance());
        assert_eq!(audit.severity, Severity::Info);
    }

    #[test]
    fn any_duration_mismatch_is_flagged() {
        let mut c = contract();
        c.duration_override = Some(5);
        c.total_amount = "1500EUR".parse().unwrap();
        let audit = Audit::of(&c, date("2025-01-12"), tolerance());
        assert!(audit
            .issues
            .iter()
            .any(|i| i.message.contains("stored duration")));
    }

    #[test]
    fn criticals_outrank_warnings() {
        let mut c = contract();
        c.end_date = None;
        c.duration_override = Some(4);
        c.total_amount = "9999EUR".parse().unwrap();
        let audit = Audit::of(&c, date("2025-01-12"), tolerance());
        assert_eq!(audit.severity, Severity::Critical);
        assert_eq!(audit.issues.first().unwrap().severity, Severity::Critical);
    }
}
