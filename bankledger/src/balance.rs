//! Account balance engine
//!
//! Deposits and withdrawals read the account row with `get_for_update`,
//! so the sufficiency check and the balance write are one serialized step
//! per account: two concurrent withdrawals cannot both pass the check
//! against a balance one of them is about to invalidate. Distinct
//! accounts lock distinct keys and proceed in parallel.
//!
//! The floor is the minimum permitted balance: 0 for savings,
//! -overdraft_amount for checking.

use crate::{
    error::{Error, Result},
    storage::{id_key, StorageTxn, CF_ACCOUNTS, CF_CHECKING},
    types::{Account, CheckingTerms, EntityKind},
};
use rust_decimal::Decimal;

/// Add `amount` to the account balance; returns the updated row
pub(crate) fn deposit(txn: &StorageTxn<'_>, account_number: u64, amount: Decimal) -> Result<Account> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount(amount));
    }

    let key = id_key(account_number);
    let mut account: Account = txn
        .get_for_update(CF_ACCOUNTS, &key)?
        .ok_or_else(|| Error::not_found(EntityKind::Account, account_number))?;

    account.balance += amount;
    txn.put(CF_ACCOUNTS, &key, &account)?;

    Ok(account)
}

/// Subtract `amount` from the account balance, respecting the floor;
/// returns the updated row
pub(crate) fn withdraw(
    txn: &StorageTxn<'_>,
    account_number: u64,
    amount: Decimal,
) -> Result<Account> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount(amount));
    }

    let key = id_key(account_number);
    let mut account: Account = txn
        .get_for_update(CF_ACCOUNTS, &key)?
        .ok_or_else(|| Error::not_found(EntityKind::Account, account_number))?;

    let available = account.balance - floor_for(txn, account_number)?;
    if amount > available {
        return Err(Error::InsufficientFunds {
            account: account_number,
            requested: amount,
            available,
        });
    }

    account.balance -= amount;
    txn.put(CF_ACCOUNTS, &key, &account)?;

    Ok(account)
}

/// Minimum permitted balance for the account
fn floor_for(txn: &StorageTxn<'_>, account_number: u64) -> Result<Decimal> {
    match txn.get::<CheckingTerms>(CF_CHECKING, &id_key(account_number))? {
        Some(terms) => Ok(-terms.overdraft_amount),
        None => Ok(Decimal::ZERO),
    }
}
