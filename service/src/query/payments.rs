//! [`Query`] collection related to [`payment`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{contract, payment, Contract, PaymentSummary},
    infra::{store, Database},
    Query, Service,
};

/// [`Query`] to fold the payment ledger of a single [`Contract`] into
/// a [`PaymentSummary`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Summarize {
    /// ID of the [`Contract`] to summarize payments of.
    pub contract_id: contract::Id,
}

impl<Db> Query<Summarize> for Service<Db>
where
    Db: Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<store::Error>,
        > + Database<
            Select<By<Vec<payment::Entry>, contract::Id>>,
            Ok = Vec<payment::Entry>,
            Err = Traced<store::Error>,
        >,
{
    type Ok = Option<PaymentSummary>;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Summarize { contract_id }: Summarize,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(contract) = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let entries = self
            .database()
            .execute(Select(By::<Vec<payment::Entry>, _>::new(contract_id)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(PaymentSummary::new(&contract, entries)))
    }
}
