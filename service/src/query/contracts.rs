//! [`Query`] collection related to the multiple [`Contract`]s.

use common::operations::By;

use crate::{domain::Contract, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries the whole list of [`Contract`]s.
pub type List = DatabaseQuery<By<Vec<Contract>, read::contract::All>>;
