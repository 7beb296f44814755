//! Financial status classification of a [`Contract`].

use common::{define_kind, Date};

use crate::domain::PaymentSummary;

use super::Contract;

define_kind! {
    #[doc = "Read-time financial status of a [`Contract`].\n\n\
             Never stored: `Overdue` and `InProgress` depend on the \
             evaluation day and must be reclassified on every read."]
    enum FinancialStatus {
        #[doc = "Nothing remains to be paid."]
        Paid = 1,

        #[doc = "The rental runs inside its agreed period."]
        Pending = 2,

        #[doc = "The rental ran past its effective end date."]
        Overdue = 3,

        #[doc = "The rental runs inside an agreed extension."]
        Extended = 4,

        #[doc = "A closed rental with an outstanding balance."]
        InProgress = 5,
    }
}

impl FinancialStatus {
    /// Returns a human-readable description of this [`FinancialStatus`].
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Paid => "fully paid",
            Self::Pending => "awaiting payment",
            Self::Overdue => "past its effective end date",
            Self::Extended => "running inside an agreed extension",
            Self::InProgress => "closed with an outstanding balance",
        }
    }
}

impl Contract {
    /// Classifies this [`Contract`] by its lifecycle state and dates
    /// alone, as of the provided calendar day.
    ///
    /// A closed [`Contract`] is `Paid` unconditionally here;
    /// [`status_with_payments()`] refines that with ledger data.
    /// Overdue takes priority over showing an active extension.
    ///
    /// [`status_with_payments()`]: Contract::status_with_payments
    #[must_use]
    pub fn status(&self, as_of: Date) -> FinancialStatus {
        use FinancialStatus as S;

        if self.is_closed() {
            return S::Paid;
        }

        let Some(effective_end) = self.effective_end() else {
            return S::Pending;
        };

        if effective_end < as_of {
            S::Overdue
        } else if self.extension.is_some() {
            S::Extended
        } else {
            S::Pending
        }
    }

    /// Classifies this [`Contract`], refining closed ones with the
    /// provided [`PaymentSummary`].
    ///
    /// Open contracts keep their purely date-driven [`status()`]: the
    /// domain treats payment completeness as meaningful only once the
    /// rental period is over.
    ///
    /// [`status()`]: Contract::status
    #[must_use]
    pub fn status_with_payments(
        &self,
        payments: &PaymentSummary,
        as_of: Date,
    ) -> FinancialStatus {
        use FinancialStatus as S;

        if self.is_closed() {
            if payments.remaining.is_positive() {
                S::InProgress
            } else {
                S::Paid
            }
        } else {
            self.status(as_of)
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::domain::{
        contract::{Contract, Extension, Id, Lifecycle, Number},
        payment, PaymentSummary,
    };

    use super::FinancialStatus as S;

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

    fn entry(amount: &str) -> payment::Entry {
        payment::Entry {
            id: payment::Id::new(),
            contract_id: Id::new(),
            amount: amount.parse().unwrap(),
            method: payment::Method::Cash,
            paid_at: date("2025-01-11"),
        }
    }

    #[test]
    fn open_inside_the_period_is_pending() {
        assert_eq!(contract().status(date("2025-01-12")), S::Pending);
        // The last agreed day itself is not overdue yet.
        assert_eq!(contract().status(date("2025-01-14")), S::Pending);
    }

    #[test]
    fn open_past_the_end_is_overdue() {
        assert_eq!(contract().status(date("2025-01-20")), S::Overdue);
    }

    #[test]
    fn running_inside_an_extension_is_extended() {
        let mut c = contract();
        c.extension = Some(Extension::Until(date("2025-01-18")));
        assert_eq!(c.status(date("2025-01-16")), S::Extended);

        c.extension = Some(Extension::Days(4));
        assert_eq!(c.status(date("2025-01-16")), S::Extended);
    }

    #[test]
    fn overdue_takes_priority_over_extended() {
        let mut c = contract();
        c.extension = Some(Extension::Until(date("2025-01-18")));
        assert_eq!(c.status(date("2025-01-20")), S::Overdue);
    }

    #[test]
    fn missing_dates_default_to_pending() {
        let mut c = contract();
        c.start_date = None;
        c.end_date = None;
        assert_eq!(c.status(date("2025-01-20")), S::Pending);
    }

    #[test]
    fn closed_is_paid_without_payment_data() {
        let mut c = contract();
        c.lifecycle = Lifecycle::Closed;
        c.total_amount = "3000EUR".parse().unwrap();
        assert_eq!(c.status(date("2025-01-20")), S::Paid);
    }

    #[test]
    fn closed_with_a_balance_is_in_progress() {
        let mut c = contract();
        c.lifecycle = Lifecycle::Closed;
        c.total_amount = "3000EUR".parse().unwrap();

        let partial = PaymentSummary::new(&c, vec![entry("2000EUR")]);
        assert_eq!(partial.remaining, "1000EUR".parse().unwrap());
        assert_eq!(
            c.status_with_payments(&partial, date("2025-01-20")),
            S::InProgress,
        );

        let settled = PaymentSummary::new(&c, vec![entry("3000EUR")]);
        assert_eq!(
            c.status_with_payments(&settled, date("2025-01-20")),
            S::Paid,
        );
    }

    #[test]
    fn closed_settled_by_the_advance_alone_is_paid() {
        let mut c = contract();
        c.lifecycle = Lifecycle::Closed;
        c.total_amount = "3000EUR".parse().unwrap();
        c.advance_payment = "3000EUR".parse().unwrap();

        let payments = PaymentSummary::new(&c, vec![]);
        assert_eq!(
            c.status_with_payments(&payments, date("2025-01-20")),
            S::Paid,
        );
    }

    #[test]
    fn open_contracts_ignore_payment_data() {
        let c = contract();
        let payments = PaymentSummary::new(&c, vec![entry("9000EUR")]);
        assert_eq!(
            c.status_with_payments(&payments, date("2025-01-20")),
            S::Overdue,
        );
    }
}
