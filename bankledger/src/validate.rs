//! Referential integrity validation
//!
//! Existence checks run inside the same transaction as the dependent
//! insert and take an exclusive lock on the parent key. A concurrent
//! delete of the parent locks the same key, so the two transactions
//! serialize: either the delete sees the committed dependent row and
//! fails with `ReferentialConflict`, or the insert sees the parent gone
//! and fails with `NotFound`. There is no window where the check passes,
//! the parent is deleted, and the dependent row still commits.

use crate::{
    error::{Error, Result},
    storage::{id_key, StorageTxn, CF_ACCOUNTS, CF_BRANCHES, CF_CUSTOMERS, CF_LOANS},
    types::EntityKind,
};

/// Reference to an entity that must exist before a dependent row is created
#[derive(Debug, Clone, Copy)]
pub(crate) enum EntityRef<'a> {
    Branch(&'a str),
    Customer(u64),
    Account(u64),
    Loan(u64),
}

/// Succeeds iff the referenced entity exists, holding a lock on its key
/// until commit or rollback; `NotFound` otherwise
pub(crate) fn require_exists(txn: &StorageTxn<'_>, entity: EntityRef<'_>) -> Result<()> {
    let (cf, key, kind, display): (_, Vec<u8>, _, String) = match entity {
        EntityRef::Branch(name) => (
            CF_BRANCHES,
            name.as_bytes().to_vec(),
            EntityKind::Branch,
            name.to_string(),
        ),
        EntityRef::Customer(id) => (
            CF_CUSTOMERS,
            id_key(id).to_vec(),
            EntityKind::Customer,
            id.to_string(),
        ),
        EntityRef::Account(id) => (
            CF_ACCOUNTS,
            id_key(id).to_vec(),
            EntityKind::Account,
            id.to_string(),
        ),
        EntityRef::Loan(id) => (
            CF_LOANS,
            id_key(id).to_vec(),
            EntityKind::Loan,
            id.to_string(),
        ),
    };

    if txn.contains_for_update(cf, &key)? {
        Ok(())
    } else {
        Err(Error::not_found(kind, display))
    }
}
