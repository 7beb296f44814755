//! [`Query`] classifying the [`FinancialStatus`] of a [`Contract`].

use common::{
    operations::{By, Select},
    Date,
};
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, FinancialStatus},
        payment, Contract, PaymentSummary,
    },
    infra::{store, Database},
    Query, Service,
};

/// [`Query`] to classify the [`FinancialStatus`] of a single
/// [`Contract`].
///
/// Closed [`Contract`]s are classified against their payment ledger,
/// so the ledger is consulted only when it can influence the answer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Classify {
    /// ID of the [`Contract`] to classify.
    pub contract_id: contract::Id,

    /// Calendar day the classification is evaluated against.
    pub as_of: Date,
}

impl<Db> Query<Classify> for Service<Db>
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
    type Ok = Option<FinancialStatus>;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Classify { contract_id, as_of }: Classify,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(contract) = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        if !contract.is_closed() {
            return Ok(Some(contract.status(as_of)));
        }

        let entries = self
            .database()
            .execute(Select(By::<Vec<payment::Entry>, _>::new(contract_id)))
            .await
            .map_err(tracerr::wrap!())?;
        let payments = PaymentSummary::new(&contract, entries);

        Ok(Some(contract.status_with_payments(&payments, as_of)))
    }
}
