//! [`Command`] for recalculating the financials of a [`Contract`].

use common::{
    operations::{By, Select, Update},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{contract, Contract},
    infra::{store, Database},
    Service,
};

use super::Command;

/// [`Command`] for recalculating the stored financial figures of a
/// single [`Contract`].
///
/// Writes the [`Contract`] back only if recalculation actually changed
/// it: a fresh [`Contract`] with no accruing figures produces no write
/// at all.
#[derive(Clone, Copy, Debug)]
pub struct RecalculateContract {
    /// ID of the [`Contract`] to recalculate.
    pub contract_id: contract::Id,

    /// Calendar day the recalculation is evaluated against.
    pub as_of: Date,
}

impl<Db> Command<RecalculateContract> for Service<Db>
where
    Db: Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<store::Error>,
        > + Database<Update<Contract>, Err = Traced<store::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        RecalculateContract { contract_id, as_of }: RecalculateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let contract = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;

        let recalculated = contract.recalculated(as_of);
        if recalculated != contract {
            self.database()
                .execute(Update(recalculated.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        Ok(recalculated)
    }
}

/// Error of [`RecalculateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(store::Error),
}
