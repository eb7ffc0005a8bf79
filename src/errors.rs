//! Unified error types for `GharKhata`.
//!
//! Every fallible operation in the crate returns [`Result`]. Ledger validation
//! failures get their own variants so the bot layer can turn them into friendly
//! replies instead of generic "something went wrong" messages.

use thiserror::Error;

/// All errors produced by the ledger, the store, and the bot layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A record failed input validation at the point of entry
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// Payment amounts must be finite and strictly positive
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Month keys must look like `YYYY-MM`
    #[error("Invalid month '{month}', expected YYYY-MM")]
    InvalidMonth {
        /// The rejected month key
        month: String,
    },

    /// Date keys must look like `YYYY-MM-DD`
    #[error("Invalid date '{date}', expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected date key
        date: String,
    },

    /// No helper with this id or name exists in the registry
    #[error("Helper not found: {id}")]
    HelperNotFound {
        /// Id or name used for the lookup
        id: String,
    },

    /// No milk entry or payment with this id exists
    #[error("Entry not found: {id}")]
    EntryNotFound {
        /// Id used for the lookup
        id: String,
    },

    /// Underlying `SeaORM` failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON encoding or decoding failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Writing a reply into a `String` failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Discord framework failure
    #[error("Discord error: {0}")]
    Discord(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Discord(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
