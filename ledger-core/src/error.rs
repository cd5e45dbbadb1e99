//! Error types for the ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown transaction type string
    #[error("Invalid transaction type: {0}")]
    InvalidType(String),

    /// A party required by the transaction type is missing (or forbidden but present)
    #[error("Missing party: {0}")]
    MissingParty(String),

    /// Account exists but is not active/approved
    #[error("Account not eligible: {0}")]
    AccountNotEligible(String),

    /// PIN verification failed
    ///
    /// Also returned when the source account does not exist, so the entry
    /// endpoint cannot be used to probe for account ids.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// All package counts are zero
    #[error("Entry has zero total quantity")]
    EmptyEntry,

    /// Unrecognized package level key
    #[error("Invalid package level: {0}")]
    InvalidLevel(String),

    /// Negative or overflowing package count
    #[error("Invalid quantity for level {level}: {count}")]
    InvalidQuantity {
        /// Offending package level key
        level: String,
        /// Rejected count
        count: i64,
    },

    /// Malformed request body (unparseable JSON, bad id syntax)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Entry was already reversed
    #[error("Entry already reversed: {0}")]
    AlreadyReversed(String),

    /// Illegal account lifecycle transition (KYC)
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Entry not found
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// Storage deadline exceeded before commit
    #[error("Storage operation timed out")]
    StorageTimeout,

    /// Storage-level write conflict
    #[error("Storage conflict: {0}")]
    StorageConflict(String),

    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl Error {
    /// Stable machine-readable code, for callers that render `{message}`
    /// responses alongside an error code.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidType(_) => "invalid_type",
            Error::MissingParty(_) => "missing_party",
            Error::AccountNotEligible(_) => "account_not_eligible",
            Error::AuthenticationFailed => "authentication_failed",
            Error::EmptyEntry => "empty_entry",
            Error::InvalidLevel(_) => "invalid_level",
            Error::InvalidQuantity { .. } => "invalid_quantity",
            Error::InvalidRequest(_) => "invalid_request",
            Error::AlreadyReversed(_) => "already_reversed",
            Error::InvalidTransition(_) => "invalid_transition",
            Error::AccountNotFound(_) => "account_not_found",
            Error::EntryNotFound(_) => "entry_not_found",
            Error::StorageTimeout => "storage_timeout",
            Error::StorageConflict(_) => "storage_conflict",
            Error::Storage(_) => "storage",
            Error::Serialization(_) => "serialization",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
        }
    }
}
