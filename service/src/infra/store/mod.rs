//! [`Database`]-related implementations.

#[cfg(feature = "json")]
pub mod json;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "json")]
pub use self::json::Json;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "json")]
    /// [`Json`] error.
    Json(json::Error),
}

pub mod backup {
    //! Backup snapshot definitions.

    use common::DateTime;
    use derive_more::{Display, Into};

    /// Key a backup snapshot of the whole collection is stored under.
    #[derive(
        Clone, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
    )]
    pub struct Key(String);

    impl Key {
        /// Creates a new [`Key`] for a snapshot taken at the provided
        /// moment.
        #[must_use]
        pub fn timestamped(at: DateTime) -> Self {
            Self(format!("backup-{}", at.unix_timestamp()))
        }

        /// Returns a string slice of this [`Key`].
        #[must_use]
        pub fn as_str(&self) -> &str {
            &self.0
        }
    }
}
