//! Infrastructure layer.

pub mod store;

pub use self::store::Database;
#[cfg(feature = "json")]
pub use self::store::{json, Json};
