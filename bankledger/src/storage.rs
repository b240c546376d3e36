//! Storage layer using RocksDB pessimistic transactions
//!
//! # Column Families
//!
//! One column family per table, mirroring the relational schema:
//!
//! - `branches` (key: branch name)
//! - `customers`, `employees`, `accounts`, `loans`, `payments` (key: u64 BE)
//! - `savings`, `checking` - kind rows sharing the account key space
//! - `depositors`, `borrowers` - composite keys (two u64 BE concatenated)
//! - `loan_branches`, `loan_payments` - link rows (key: owning loan/payment)
//! - `sequences` - identifier allocator counters (key: kind name)
//! - `indices` - secondary indices for referential-integrity scans
//!
//! The database is opened in pessimistic-transaction mode so every unit of
//! work gets begin/commit/rollback plus per-key locking via
//! `get_for_update`, which is what serializes concurrent mutations of the
//! same row without blocking unrelated keys.

use crate::{
    config::Config,
    error::{Error, Result},
};
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, Transaction,
    TransactionDB, TransactionDBOptions, TransactionOptions, WriteOptions,
};
use serde::{de::DeserializeOwned, Serialize};

/// Column family names
pub(crate) const CF_BRANCHES: &str = "branches";
pub(crate) const CF_CUSTOMERS: &str = "customers";
pub(crate) const CF_EMPLOYEES: &str = "employees";
pub(crate) const CF_ACCOUNTS: &str = "accounts";
pub(crate) const CF_SAVINGS: &str = "savings";
pub(crate) const CF_CHECKING: &str = "checking";
pub(crate) const CF_DEPOSITORS: &str = "depositors";
pub(crate) const CF_LOANS: &str = "loans";
pub(crate) const CF_LOAN_BRANCHES: &str = "loan_branches";
pub(crate) const CF_BORROWERS: &str = "borrowers";
pub(crate) const CF_PAYMENTS: &str = "payments";
pub(crate) const CF_LOAN_PAYMENTS: &str = "loan_payments";
pub(crate) const CF_SEQUENCES: &str = "sequences";
pub(crate) const CF_INDICES: &str = "indices";

const ALL_CFS: [&str; 14] = [
    CF_BRANCHES,
    CF_CUSTOMERS,
    CF_EMPLOYEES,
    CF_ACCOUNTS,
    CF_SAVINGS,
    CF_CHECKING,
    CF_DEPOSITORS,
    CF_LOANS,
    CF_LOAN_BRANCHES,
    CF_BORROWERS,
    CF_PAYMENTS,
    CF_LOAN_PAYMENTS,
    CF_SEQUENCES,
    CF_INDICES,
];

/// Storage wrapper around the transactional database
pub struct Storage {
    db: TransactionDB,
}

impl Storage {
    /// Open or create the database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;
        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_target_file_size_base(config.rocksdb.target_file_size_mb * 1024 * 1024);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        let txn_db_opts = TransactionDBOptions::default();

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Self::cf_options(name)))
            .collect();

        let db = TransactionDB::open_cf_descriptors(&db_opts, &txn_db_opts, path, cf_descriptors)?;

        tracing::info!(path = ?path, column_families = ALL_CFS.len(), "opened ledger store");

        Ok(Self { db })
    }

    fn cf_options(name: &str) -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        // Indices are point-checked during referential scans; bloom
        // filters keep the negative lookups cheap.
        if name == CF_INDICES {
            let mut block_opts = rocksdb::BlockBasedOptions::default();
            block_opts.set_bloom_filter(10.0, false);
            opts.set_block_based_table_factory(&block_opts);
        }

        opts
    }

    pub(crate) fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Fatal(format!("column family {} not found", name)))
    }

    /// Begin a pessimistic transaction with per-key lock timeout
    pub(crate) fn begin(&self, lock_timeout_ms: i64) -> StorageTxn<'_> {
        let mut txn_opts = TransactionOptions::default();
        txn_opts.set_deadlock_detect(true);
        txn_opts.set_lock_timeout(lock_timeout_ms);

        StorageTxn {
            inner: self.db.transaction_opt(&WriteOptions::default(), &txn_opts),
            storage: self,
        }
    }

    // Snapshot reads - single-statement lookups need no unit of work.

    /// Read and decode one row outside any transaction
    pub(crate) fn read<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Decode every row in a column family, in key order
    pub(crate) fn scan_all<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            rows.push(bincode::deserialize(&value)?);
        }
        Ok(rows)
    }

    /// Decode every (key, row) pair in a column family, in key order
    pub(crate) fn scan_all_keyed<T: DeserializeOwned>(
        &self,
        cf_name: &str,
    ) -> Result<Vec<(Vec<u8>, T)>> {
        let cf = self.cf(cf_name)?;
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            rows.push((key.to_vec(), bincode::deserialize(&value)?));
        }
        Ok(rows)
    }
}

/// One pessimistic transaction against the store
///
/// Dropping the transaction without committing rolls it back, so a caller
/// cancellation mid-operation leaves no partial effect.
pub struct StorageTxn<'db> {
    inner: Transaction<'db, TransactionDB>,
    storage: &'db Storage,
}

impl StorageTxn<'_> {
    /// Read and decode one row without taking a lock
    pub(crate) fn get<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.storage.cf(cf_name)?;
        match self.inner.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Read and decode one row, holding an exclusive lock on its key until
    /// commit or rollback
    pub(crate) fn get_for_update<T: DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> Result<Option<T>> {
        match self.get_for_update_raw(cf_name, key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Raw locked read (used for sequence counters)
    pub(crate) fn get_for_update_raw(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self.storage.cf(cf_name)?;
        Ok(self.inner.get_for_update_cf(cf, key, true)?)
    }

    /// True if the key exists, locking it so a concurrent insert or
    /// delete of the same key cannot slip past the check
    pub(crate) fn contains_for_update(&self, cf_name: &str, key: &[u8]) -> Result<bool> {
        Ok(self.get_for_update_raw(cf_name, key)?.is_some())
    }

    /// Encode and write one row
    pub(crate) fn put<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let bytes = bincode::serialize(value)?;
        self.put_raw(cf_name, key, &bytes)
    }

    /// Write raw bytes
    pub(crate) fn put_raw(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self.storage.cf(cf_name)?;
        Ok(self.inner.put_cf(cf, key, value)?)
    }

    /// Delete one row
    pub(crate) fn delete(&self, cf_name: &str, key: &[u8]) -> Result<()> {
        let cf = self.storage.cf(cf_name)?;
        Ok(self.inner.delete_cf(cf, key)?)
    }

    /// True if no key in the column family starts with `prefix`
    pub(crate) fn prefix_is_empty(&self, cf_name: &str, prefix: &[u8]) -> Result<bool> {
        let cf = self.storage.cf(cf_name)?;
        let mut iter = self
            .inner
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));
        match iter.next() {
            Some(item) => {
                let (key, _) = item?;
                Ok(!key.starts_with(prefix))
            }
            None => Ok(true),
        }
    }

    /// Commit all writes atomically
    pub(crate) fn commit(self) -> Result<()> {
        Ok(self.inner.commit()?)
    }

    /// Abort, releasing all locks
    pub(crate) fn rollback(&self) -> Result<()> {
        Ok(self.inner.rollback()?)
    }
}

// Key encoding - big-endian so iteration order matches numeric order.

/// Encode a single u64 primary key
pub(crate) fn id_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

/// Encode a composite (u64, u64) primary key
pub(crate) fn pair_key(a: u64, b: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&a.to_be_bytes());
    key[8..].copy_from_slice(&b.to_be_bytes());
    key
}

// Secondary index keys - one edge per dependent row, scanned by prefix
// when a delete must prove nothing references the target.

/// Index: account -> depositor link
pub(crate) fn index_account_depositor(account_number: u64, customer_id: u64) -> Vec<u8> {
    let mut key = index_prefix_account_depositor(account_number);
    key.extend_from_slice(&customer_id.to_be_bytes());
    key
}

/// Prefix for all depositor links of one account
pub(crate) fn index_prefix_account_depositor(account_number: u64) -> Vec<u8> {
    let mut key = b"dep/acct/".to_vec();
    key.extend_from_slice(&account_number.to_be_bytes());
    key
}

/// Index: loan -> borrower link
pub(crate) fn index_loan_borrower(loan_number: u64, customer_id: u64) -> Vec<u8> {
    let mut key = index_prefix_loan_borrower(loan_number);
    key.extend_from_slice(&customer_id.to_be_bytes());
    key
}

/// Prefix for all borrower links of one loan
pub(crate) fn index_prefix_loan_borrower(loan_number: u64) -> Vec<u8> {
    let mut key = b"bor/loan/".to_vec();
    key.extend_from_slice(&loan_number.to_be_bytes());
    key
}

/// Index: branch -> loan link
pub(crate) fn index_branch_loan(branch_name: &str, loan_number: u64) -> Vec<u8> {
    let mut key = index_prefix_branch_loan(branch_name);
    key.extend_from_slice(&loan_number.to_be_bytes());
    key
}

/// Prefix for all loans originated by one branch
pub(crate) fn index_prefix_branch_loan(branch_name: &str) -> Vec<u8> {
    let mut key = b"loan/branch/".to_vec();
    key.extend_from_slice(branch_name.as_bytes());
    key.push(b'|');
    key
}

/// Index: loan -> payment link
pub(crate) fn index_loan_payment(loan_number: u64, payment_number: u64) -> Vec<u8> {
    let mut key = index_prefix_loan_payment(loan_number);
    key.extend_from_slice(&payment_number.to_be_bytes());
    key
}

/// Prefix for all payments against one loan
pub(crate) fn index_prefix_loan_payment(loan_number: u64) -> Vec<u8> {
    let mut key = b"pay/loan/".to_vec();
    key.extend_from_slice(&loan_number.to_be_bytes());
    key
}

/// Index: account -> payment link
pub(crate) fn index_account_payment(account_number: u64, payment_number: u64) -> Vec<u8> {
    let mut key = index_prefix_account_payment(account_number);
    key.extend_from_slice(&payment_number.to_be_bytes());
    key
}

/// Prefix for all payments drawn against one account
pub(crate) fn index_prefix_account_payment(account_number: u64) -> Vec<u8> {
    let mut key = b"pay/acct/".to_vec();
    key.extend_from_slice(&account_number.to_be_bytes());
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Account;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn test_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        (Storage::open(&config).unwrap(), temp_dir)
    }

    #[test]
    fn test_storage_open() {
        let (storage, _temp) = test_storage();
        for name in ALL_CFS {
            assert!(storage.cf(name).is_ok(), "missing column family {}", name);
        }
    }

    #[test]
    fn test_txn_put_get_commit() {
        let (storage, _temp) = test_storage();

        let account = Account {
            account_number: 1001,
            balance: Decimal::new(100_00, 2),
        };

        let txn = storage.begin(100);
        txn.put(CF_ACCOUNTS, &id_key(1001), &account).unwrap();
        txn.commit().unwrap();

        let read: Option<Account> = storage.read(CF_ACCOUNTS, &id_key(1001)).unwrap();
        assert_eq!(read.unwrap(), account);
    }

    #[test]
    fn test_txn_drop_rolls_back() {
        let (storage, _temp) = test_storage();

        let account = Account {
            account_number: 1001,
            balance: Decimal::new(100_00, 2),
        };

        {
            let txn = storage.begin(100);
            txn.put(CF_ACCOUNTS, &id_key(1001), &account).unwrap();
            // Dropped without commit
        }

        let read: Option<Account> = storage.read(CF_ACCOUNTS, &id_key(1001)).unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn test_prefix_is_empty() {
        let (storage, _temp) = test_storage();

        let txn = storage.begin(100);
        txn.put_raw(CF_INDICES, &index_account_depositor(1001, 1), &[])
            .unwrap();
        txn.commit().unwrap();

        let txn = storage.begin(100);
        assert!(!txn
            .prefix_is_empty(CF_INDICES, &index_prefix_account_depositor(1001))
            .unwrap());
        assert!(txn
            .prefix_is_empty(CF_INDICES, &index_prefix_account_depositor(1002))
            .unwrap());
    }

    #[test]
    fn test_key_encoding_orders_numerically() {
        assert!(id_key(2) < id_key(10));
        assert!(pair_key(1, 2) < pair_key(1, 10));
        assert!(pair_key(1, u64::MAX) < pair_key(2, 0));
    }

    #[test]
    fn test_scan_all_in_key_order() {
        let (storage, _temp) = test_storage();

        let txn = storage.begin(100);
        for n in [1003u64, 1001, 1002] {
            let account = Account {
                account_number: n,
                balance: Decimal::ZERO,
            };
            txn.put(CF_ACCOUNTS, &id_key(n), &account).unwrap();
        }
        txn.commit().unwrap();

        let accounts: Vec<Account> = storage.scan_all(CF_ACCOUNTS).unwrap();
        let numbers: Vec<u64> = accounts.iter().map(|a| a.account_number).collect();
        assert_eq!(numbers, vec![1001, 1002, 1003]);
    }
}
