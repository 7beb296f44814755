//! [`Command`] for bulk-migrating the whole [`Contract`]s collection.

use common::{
    operations::{By, Replace, Select, Snapshot},
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{contract::Migration, Contract},
    infra::{store, Database},
    read, Service,
};

use super::Command;

/// Version stamped onto every [`Contract`] processed by a
/// [`MigrateContracts`] run.
pub const VERSION: u16 = 2;

/// [`Command`] for recalculating the whole [`Contract`]s collection in
/// one pass.
///
/// Fail-closed: a backup snapshot of the stored collection is taken
/// before anything else, and a snapshot failure aborts the whole run.
/// The recalculated collection then replaces the stored one atomically,
/// so the migration is all-or-nothing.
#[derive(Clone, Copy, Debug)]
pub struct MigrateContracts {
    /// Calendar day the recalculation is evaluated against.
    pub as_of: Date,
}

/// Output of the [`MigrateContracts`] [`Command`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Report {
    /// Count of [`Contract`]s whose stored figures were rewritten.
    pub migrated: usize,

    /// Count of processed [`Contract`]s whose figures were already
    /// current.
    pub unchanged: usize,

    /// Count of [`Contract`]s left untouched for having no dates to
    /// derive anything from.
    pub skipped: usize,
}

impl<Db> Command<MigrateContracts> for Service<Db>
where
    Db: Database<Snapshot<store::backup::Key>, Err = Traced<store::Error>>
        + Database<
            Select<By<Vec<Contract>, read::contract::All>>,
            Ok = Vec<Contract>,
            Err = Traced<store::Error>,
        > + Database<Replace<Vec<Contract>>, Err = Traced<store::Error>>,
{
    type Ok = Report;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        MigrateContracts { as_of }: MigrateContracts,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let key = store::backup::Key::timestamped(DateTime::now());
        self.database()
            .execute(Snapshot(key.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        log::info!("stored a backup snapshot under `{key}`");

        let contracts = self
            .database()
            .execute(Select(By::<Vec<Contract>, _>::new(read::contract::All)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut report = Report::default();
        let migrated_at = DateTime::now().coerce();
        let contracts = contracts
            .into_iter()
            .map(|contract| {
                if contract.start_date.is_none()
                    && contract.end_date.is_none()
                {
                    log::warn!(
                        "`Contract(id: {})` has no dates at all, \
                         leaving it untouched",
                        contract.id,
                    );
                    report.skipped += 1;
                    return contract;
                }

                let mut migrated = contract.recalculated(as_of);
                if migrated == contract {
                    report.unchanged += 1;
                } else {
                    report.migrated += 1;
                }
                migrated.migration = Some(Migration {
                    at: migrated_at,
                    version: VERSION,
                });
                migrated
            })
            .collect::<Vec<_>>();

        self.database()
            .execute(Replace(contracts))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "migration v{VERSION} finished: \
             {} migrated, {} unchanged, {} skipped",
            report.migrated,
            report.unchanged,
            report.skipped,
        );
        Ok(report)
    }
}

/// Error of [`MigrateContracts`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(store::Error),
}
