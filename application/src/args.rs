//! [`Args`] definitions.

use clap::{Parser, Subcommand};
use common::Date;
use service::domain::contract;

/// Financial engine of the vehicle rental back office.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Calendar day to evaluate date-dependent figures against.
    ///
    /// Defaults to today.
    #[arg(long)]
    pub as_of: Option<Date>,

    /// Operation to perform.
    #[command(subcommand)]
    pub command: Cmd,
}

/// Operation to perform on the stored contracts collection.
#[derive(Clone, Copy, Debug, Subcommand)]
pub enum Cmd {
    /// Lists the whole contracts collection in its canonical form.
    List,

    /// Calculates the financial summary of a single contract.
    Summary {
        /// ID of the contract.
        id: contract::Id,
    },

    /// Classifies the financial status of a single contract.
    Status {
        /// ID of the contract.
        id: contract::Id,
    },

    /// Folds the payment ledger of a single contract.
    Payments {
        /// ID of the contract.
        id: contract::Id,
    },

    /// Recalculates and persists the financial figures of a single
    /// contract.
    Recalculate {
        /// ID of the contract.
        id: contract::Id,
    },

    /// Audits stored figures against freshly re-derived ones.
    Audit {
        /// ID of a single contract to audit.
        ///
        /// The whole collection is audited when omitted.
        id: Option<contract::Id>,
    },

    /// Recalculates the whole collection in one pass, after taking a
    /// backup snapshot of it.
    Migrate,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}
