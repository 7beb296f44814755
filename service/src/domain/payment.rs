//! Payment-ledger definitions consumed by the engine.
//!
//! The ledger itself is owned by an external collaborator; this engine
//! only folds its entries on top of a [`Contract`]'s advance payment.

use common::{define_kind, Date, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{contract, Contract};

/// Single ledgered payment towards a [`Contract`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Entry {
    /// ID of this [`Entry`].
    pub id: Id,

    /// ID of the [`Contract`] this [`Entry`] pays towards.
    pub contract_id: contract::Id,

    /// Paid amount.
    pub amount: Money,

    /// [`Method`] the payment was made with.
    pub method: Method,

    /// Calendar day the payment was made on.
    #[cfg_attr(feature = "serde", serde(with = "common::date::serde::iso"))]
    pub paid_at: Date,
}

/// ID of an [`Entry`].
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

define_kind! {
    #[doc = "Method an [`Entry`] was paid with."]
    enum Method {
        #[doc = "Cash payment."]
        Cash = 1,

        #[doc = "Check payment."]
        Check = 2,

        #[doc = "Bank transfer."]
        BankTransfer = 3,
    }
}

/// Combined payment picture of a single [`Contract`]: its advance
/// payment plus every ledgered [`Entry`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(rename_all = "camelCase")
)]
pub struct PaymentSummary {
    /// Total amount paid so far.
    pub total_paid: Money,

    /// Amount still owed, never negative.
    pub remaining: Money,

    /// Ledgered [`Entry`]s this summary folded in.
    pub entries: Vec<Entry>,
}

impl PaymentSummary {
    /// Builds a [`PaymentSummary`] of the provided [`Contract`] from
    /// its ledgered `entries`.
    ///
    /// An [`Entry`] in a foreign currency is skipped rather than
    /// folded: it is a data defect for auditing, not a reason to fail
    /// a read.
    #[must_use]
    pub fn new(contract: &Contract, entries: Vec<Entry>) -> Self {
        let total_paid = entries.iter().fold(
            contract.advance_payment,
            |total, entry| total.checked_add(entry.amount).unwrap_or(total),
        );
        let remaining = contract.total_amount.saturating_sub(total_paid);
        Self {
            total_paid,
            remaining,
            entries,
        }
    }

    /// Indicates whether nothing remains to be paid.
    #[must_use]
    pub fn is_fully_paid(&self) -> bool {
        self.remaining.is_zero()
    }
}
