//! Error types for the ledger

use crate::types::EntityKind;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Every failure maps to a stable (kind, message) pair; raw storage error
/// text is wrapped in `StorageUnavailable` and never forwarded verbatim as
/// a caller-visible message.
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced entity does not exist
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Entity kind
        kind: EntityKind,
        /// Primary key that was looked up
        key: String,
    },

    /// Primary or composite key collision on insert
    #[error("{kind} already exists: {key}")]
    Conflict {
        /// Entity kind
        kind: EntityKind,
        /// Colliding primary key
        key: String,
    },

    /// Delete blocked by dependent rows
    #[error("{kind} {key} is still referenced by dependent rows")]
    ReferentialConflict {
        /// Entity kind
        kind: EntityKind,
        /// Primary key of the row that cannot be deleted
        key: String,
    },

    /// Non-positive or otherwise invalid monetary input
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Withdrawal would take the balance below the account floor
    #[error("insufficient funds in account {account}: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Account number
        account: u64,
        /// Requested withdrawal amount
        requested: Decimal,
        /// Amount available above the floor
        available: Decimal,
    },

    /// Storage connection/transport failure; never retried by the ledger
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Lock or commit-time conflict; consumed by the transaction retry
    /// loop and surfaced only when the attempt budget is exhausted
    #[error("write conflict: transaction retry budget exhausted")]
    WriteConflict,

    /// Row encode/decode failure
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Unrecoverable condition (identifier exhaustion, schema mismatch)
    #[error("fatal: {0}")]
    Fatal(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a `NotFound` for any displayable key
    pub fn not_found(kind: EntityKind, key: impl ToString) -> Self {
        Error::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Build a `Conflict` for any displayable key
    pub fn conflict(kind: EntityKind, key: impl ToString) -> Self {
        Error::Conflict {
            kind,
            key: key.to_string(),
        }
    }

    /// Build a `ReferentialConflict` for any displayable key
    pub fn referential(kind: EntityKind, key: impl ToString) -> Self {
        Error::ReferentialConflict {
            kind,
            key: key.to_string(),
        }
    }
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        use rocksdb::ErrorKind;

        // Lock contention and commit conflicts are retryable by re-running
        // the enclosing transaction; everything else is an infrastructure
        // failure the caller must see.
        match err.kind() {
            ErrorKind::Busy | ErrorKind::TimedOut | ErrorKind::TryAgain => Error::WriteConflict,
            _ => Error::StorageUnavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = Error::not_found(EntityKind::Customer, 42u64);
        assert_eq!(err.to_string(), "customer not found: 42");
    }

    #[test]
    fn test_insufficient_funds_message() {
        let err = Error::InsufficientFunds {
            account: 1001,
            requested: Decimal::new(600_01, 2),
            available: Decimal::new(600_00, 2),
        };
        let msg = err.to_string();
        assert!(msg.contains("1001"));
        assert!(msg.contains("600.01"));
        assert!(msg.contains("600.00"));
    }

    #[test]
    fn test_conflict_message() {
        let err = Error::conflict(EntityKind::Borrower, "(1, 5001)");
        assert_eq!(err.to_string(), "borrower already exists: (1, 5001)");
    }
}
