//! Race-free identifier allocation
//!
//! Each entity kind has a sequence counter in the `sequences` column
//! family. The counter is read with `get_for_update` inside the same
//! transaction that persists the new row, so two concurrent creations of
//! the same kind serialize on the counter key and an aborted creation
//! rolls the counter back with it. This replaces SELECT-max-then-insert,
//! which hands the same identifier to concurrent callers.

use crate::{
    error::{Error, Result},
    storage::{StorageTxn, CF_SEQUENCES},
};

/// Identifier kinds with their allocation floors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdKind {
    /// Customers start at 1
    Customer,
    /// Employees start at 101
    Employee,
    /// Accounts start at 1001 (shared by savings and checking)
    Account,
    /// Loans start at 5001
    Loan,
    /// Payments start at 7001
    Payment,
}

impl IdKind {
    /// First identifier issued for this kind
    pub(crate) fn floor(self) -> u64 {
        match self {
            IdKind::Customer => 1,
            IdKind::Employee => 101,
            IdKind::Account => 1001,
            IdKind::Loan => 5001,
            IdKind::Payment => 7001,
        }
    }

    fn seq_key(self) -> &'static [u8] {
        match self {
            IdKind::Customer => b"customer",
            IdKind::Employee => b"employee",
            IdKind::Account => b"account",
            IdKind::Loan => b"loan",
            IdKind::Payment => b"payment",
        }
    }
}

/// Issue the next identifier of `kind`, strictly greater than any
/// previously issued identifier of that kind
pub(crate) fn next(txn: &StorageTxn<'_>, kind: IdKind) -> Result<u64> {
    let next = match txn.get_for_update_raw(CF_SEQUENCES, kind.seq_key())? {
        Some(bytes) => {
            let last = u64::from_be_bytes(
                bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| Error::Fatal(format!("corrupt sequence counter for {:?}", kind)))?,
            );
            last.checked_add(1)
                .ok_or_else(|| Error::Fatal(format!("identifier space exhausted for {:?}", kind)))?
        }
        None => kind.floor(),
    };

    txn.put_raw(CF_SEQUENCES, kind.seq_key(), &next.to_be_bytes())?;
    Ok(next)
}
