//! [`Command`] definition.

pub mod migrate_contracts;
pub mod recalculate_contract;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    migrate_contracts::MigrateContracts,
    recalculate_contract::RecalculateContract,
};
