//! [`Query`] collection auditing stored figures against re-derived
//! ones.

use common::{
    operations::{By, Select},
    Date,
};
use rust_decimal::Decimal;
#[cfg(feature = "serde")]
use serde::Serialize;
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, audit::Severity, Audit},
        Contract,
    },
    infra::{store, Database},
    read, Query, Service,
};

/// [`audit`](self) queries configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Largest stored-vs-derived amount difference that is still
    /// considered equal.
    pub tolerance: Decimal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // One cent.
            tolerance: Decimal::new(1, 2),
        }
    }
}

/// [`Query`] to audit a single [`Contract`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct One {
    /// ID of the [`Contract`] to audit.
    pub contract_id: contract::Id,

    /// Calendar day the audit is evaluated against.
    pub as_of: Date,
}

impl<Db> Query<One> for Service<Db>
where
    Db: Database<
        Select<By<Option<Contract>, contract::Id>>,
        Ok = Option<Contract>,
        Err = Traced<store::Error>,
    >,
{
    type Ok = Option<Audit>;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        One { contract_id, as_of }: One,
    ) -> Result<Self::Ok, Self::Err> {
        let tolerance = self.config().audit.tolerance;
        Ok(self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::wrap!())?
            .map(|contract| Audit::of(&contract, as_of, tolerance)))
    }
}

/// [`Query`] to audit the whole [`Contract`]s collection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct All {
    /// Calendar day the audit is evaluated against.
    pub as_of: Date,
}

/// Output of the [`All`] [`Query`].
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Report {
    /// Per-[`Contract`] audit entries, in collection order.
    pub entries: Vec<Entry>,

    /// Count of [`Contract`]s with [`Severity::Critical`] findings.
    pub criticals: usize,

    /// Count of [`Contract`]s with [`Severity::Warning`] findings.
    pub warnings: usize,
}

/// Per-[`Contract`] entry of a [`Report`].
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Entry {
    /// ID of the audited [`Contract`].
    pub contract_id: contract::Id,

    /// Human-readable number of the audited [`Contract`].
    pub number: String,

    /// [`Audit`] of the [`Contract`].
    pub audit: Audit,
}

impl<Db> Query<All> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Contract>, read::contract::All>>,
        Ok = Vec<Contract>,
        Err = Traced<store::Error>,
    >,
{
    type Ok = Report;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        All { as_of }: All,
    ) -> Result<Self::Ok, Self::Err> {
        let tolerance = self.config().audit.tolerance;
        let contracts = self
            .database()
            .execute(Select(By::<Vec<Contract>, _>::new(read::contract::All)))
            .await
            .map_err(tracerr::wrap!())?;

        let entries = contracts
            .iter()
            .map(|contract| Entry {
                contract_id: contract.id,
                number: contract.number.as_str().to_owned(),
                audit: Audit::of(contract, as_of, tolerance),
            })
            .collect::<Vec<_>>();
        let count = |severity: Severity| {
            entries.iter().filter(|e| e.audit.severity == severity).count()
        };

        Ok(Report {
            criticals: count(Severity::Critical),
            warnings: count(Severity::Warning),
            entries,
        })
    }
}
