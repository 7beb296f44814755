//! [`Contract`] read model definition.

#[cfg(doc)]
use crate::domain::Contract;

/// Selector of the whole [`Contract`]s collection.
#[derive(Clone, Copy, Debug, Default)]
pub struct All;
