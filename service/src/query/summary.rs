//! [`Query`] calculating a [`Summary`] of a single [`Contract`].

use common::{
    operations::{By, Select},
    Date,
};
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, Summary},
        Contract,
    },
    infra::{store, Database},
    Query, Service,
};

/// [`Query`] to calculate the [`Summary`] of a single [`Contract`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Summarize {
    /// ID of the [`Contract`] to summarize.
    pub contract_id: contract::Id,

    /// Calendar day the [`Summary`] is evaluated against.
    pub as_of: Date,
}

impl<Db> Query<Summarize> for Service<Db>
where
    Db: Database<
        Select<By<Option<Contract>, contract::Id>>,
        Ok = Option<Contract>,
        Err = Traced<store::Error>,
    >,
{
    type Ok = Summary;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Summarize { contract_id, as_of }: Summarize,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::wrap!())?
            .map(|contract| contract.summarize(as_of))
            .unwrap_or_default())
    }
}
