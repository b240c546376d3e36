//! Unit-of-work transaction management
//!
//! Every multi-statement ledger operation runs inside `TxnManager::run`:
//! all writes become visible together at commit or not at all. Operations
//! receive the transaction handle, so nested logic reuses the enclosing
//! transaction instead of opening a second one.
//!
//! Lock conflicts (two transactions touching the same row) and commit
//! conflicts are not caller errors: the whole closure is re-run against a
//! fresh transaction, up to a configured attempt budget. Infrastructure
//! failures (`StorageUnavailable`) and business errors are never retried;
//! retrying a non-idempotent write could double-apply it.

use crate::{
    config::TxnConfig,
    error::{Error, Result},
    metrics::Metrics,
    storage::{Storage, StorageTxn},
};

/// Runs closures as atomic units of work with conflict retry
#[derive(Clone)]
pub(crate) struct TxnManager {
    config: TxnConfig,
    metrics: Metrics,
}

impl TxnManager {
    pub(crate) fn new(config: TxnConfig, metrics: Metrics) -> Self {
        Self { config, metrics }
    }

    /// Run `f` inside a transaction; commit on `Ok`, roll back on `Err`
    ///
    /// The closure may be invoked more than once, so it must not have side
    /// effects outside the transaction handle.
    pub(crate) fn run<T>(
        &self,
        storage: &Storage,
        op: &'static str,
        mut f: impl FnMut(&StorageTxn<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let txn = storage.begin(self.config.lock_timeout_ms);

            match f(&txn) {
                Ok(value) => match txn.commit() {
                    Ok(()) => {
                        self.metrics.record_commit();
                        return Ok(value);
                    }
                    Err(Error::WriteConflict) if attempt < self.config.max_attempts => {
                        self.metrics.record_retry();
                        tracing::debug!(op, attempt, "commit conflict, retrying");
                    }
                    Err(e) => {
                        self.metrics.record_abort();
                        tracing::warn!(op, error = %e, "commit failed");
                        return Err(attach_op(op, e));
                    }
                },
                Err(Error::WriteConflict) if attempt < self.config.max_attempts => {
                    let _ = txn.rollback();
                    self.metrics.record_retry();
                    tracing::debug!(op, attempt, "lock conflict, retrying");
                }
                Err(e) => {
                    let _ = txn.rollback();
                    self.metrics.record_abort();
                    tracing::debug!(op, error = %e, "operation aborted");
                    return Err(attach_op(op, e));
                }
            }
        }
    }
}

/// Storage failures carry the operation that hit them; business errors
/// pass through untouched so callers can match on them
fn attach_op(op: &'static str, err: Error) -> Error {
    match err {
        Error::StorageUnavailable(msg) => {
            Error::StorageUnavailable(format!("{}: {}", op, msg))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{id_key, CF_ACCOUNTS};
    use crate::types::Account;
    use crate::Config;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn setup() -> (Storage, TxnManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        let storage = Storage::open(&config).unwrap();
        let manager = TxnManager::new(config.txn, Metrics::new().unwrap());
        (storage, manager, temp_dir)
    }

    fn account(n: u64, cents: i64) -> Account {
        Account {
            account_number: n,
            balance: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn test_run_commits_on_ok() {
        let (storage, manager, _temp) = setup();

        manager
            .run(&storage, "test_op", |txn| {
                txn.put(CF_ACCOUNTS, &id_key(1001), &account(1001, 100_00))?;
                txn.put(CF_ACCOUNTS, &id_key(1002), &account(1002, 200_00))?;
                Ok(())
            })
            .unwrap();

        let a: Option<Account> = storage.read(CF_ACCOUNTS, &id_key(1001)).unwrap();
        let b: Option<Account> = storage.read(CF_ACCOUNTS, &id_key(1002)).unwrap();
        assert!(a.is_some());
        assert!(b.is_some());
    }

    #[test]
    fn test_run_rolls_back_on_err() {
        let (storage, manager, _temp) = setup();

        let result: Result<()> = manager.run(&storage, "test_op", |txn| {
            txn.put(CF_ACCOUNTS, &id_key(1001), &account(1001, 100_00))?;
            Err(Error::Fatal("boom".to_string()))
        });

        assert!(matches!(result, Err(Error::Fatal(_))));

        // First write must not have leaked out of the aborted transaction
        let a: Option<Account> = storage.read(CF_ACCOUNTS, &id_key(1001)).unwrap();
        assert!(a.is_none());
    }

    #[test]
    fn test_run_propagates_error_unchanged() {
        let (storage, manager, _temp) = setup();

        let result: Result<()> = manager.run(&storage, "test_op", |_txn| {
            Err(Error::InvalidAmount(Decimal::ZERO))
        });

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn test_storage_error_names_operation() {
        let (storage, manager, _temp) = setup();

        let result: Result<()> = manager.run(&storage, "deposit", |_txn| {
            Err(Error::StorageUnavailable("connection reset".to_string()))
        });

        match result.unwrap_err() {
            Error::StorageUnavailable(msg) => {
                assert_eq!(msg, "deposit: connection reset");
            }
            other => panic!("expected StorageUnavailable, got {}", other),
        }
    }

    #[test]
    fn test_run_retries_write_conflict_until_budget() {
        let (storage, manager, _temp) = setup();

        let mut calls = 0u32;
        let result: Result<()> = manager.run(&storage, "test_op", |_txn| {
            calls += 1;
            Err(Error::WriteConflict)
        });

        assert!(matches!(result, Err(Error::WriteConflict)));
        assert_eq!(calls, TxnConfig::default().max_attempts);
    }

    #[test]
    fn test_run_retry_succeeds_after_transient_conflict() {
        let (storage, manager, _temp) = setup();

        let mut calls = 0u32;
        let result = manager.run(&storage, "test_op", |txn| {
            calls += 1;
            if calls < 3 {
                return Err(Error::WriteConflict);
            }
            txn.put(CF_ACCOUNTS, &id_key(1001), &account(1001, 100_00))?;
            Ok(calls)
        });

        assert_eq!(result.unwrap(), 3);
        let a: Option<Account> = storage.read(CF_ACCOUNTS, &id_key(1001)).unwrap();
        assert!(a.is_some());
    }
}
