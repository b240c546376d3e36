//! Ledger repository: typed persistence operations
//!
//! Inserts read the target key under an exclusive lock before writing, so
//! a primary or composite key collision surfaces as a typed `Conflict`
//! instead of a storage error message. Deletes of rows that other rows
//! reference fail with `ReferentialConflict`; the dependency edges live in
//! the `indices` column family and are checked with a prefix scan inside
//! the deleting transaction.

use crate::{
    error::{Error, Result},
    storage::{
        id_key, index_account_depositor, index_account_payment, index_branch_loan,
        index_loan_borrower, index_loan_payment, index_prefix_account_depositor,
        index_prefix_account_payment, index_prefix_branch_loan, index_prefix_loan_borrower,
        index_prefix_loan_payment, pair_key, Storage, StorageTxn, CF_ACCOUNTS, CF_BORROWERS,
        CF_BRANCHES, CF_CHECKING, CF_CUSTOMERS, CF_DEPOSITORS, CF_EMPLOYEES, CF_INDICES,
        CF_LOANS, CF_LOAN_BRANCHES, CF_LOAN_PAYMENTS, CF_PAYMENTS, CF_SAVINGS,
    },
    types::{
        Account, Borrower, Branch, CheckingAccount, CheckingTerms, Customer, Depositor,
        Employee, EntityKind, Loan, LoanBranch, LoanPayment, Payment, SavingsAccount,
        SavingsTerms,
    },
};
use serde::Serialize;

fn insert_unique<T: Serialize>(
    txn: &StorageTxn<'_>,
    cf: &str,
    key: &[u8],
    kind: EntityKind,
    display: impl ToString,
    value: &T,
) -> Result<()> {
    if txn.contains_for_update(cf, key)? {
        return Err(Error::conflict(kind, display));
    }
    txn.put(cf, key, value)
}

// Inserts

pub(crate) fn insert_branch(txn: &StorageTxn<'_>, branch: &Branch) -> Result<()> {
    insert_unique(
        txn,
        CF_BRANCHES,
        branch.branch_name.as_bytes(),
        EntityKind::Branch,
        &branch.branch_name,
        branch,
    )
}

pub(crate) fn insert_customer(txn: &StorageTxn<'_>, customer: &Customer) -> Result<()> {
    insert_unique(
        txn,
        CF_CUSTOMERS,
        &id_key(customer.customer_id),
        EntityKind::Customer,
        customer.customer_id,
        customer,
    )
}

pub(crate) fn insert_employee(txn: &StorageTxn<'_>, employee: &Employee) -> Result<()> {
    insert_unique(
        txn,
        CF_EMPLOYEES,
        &id_key(employee.employee_id),
        EntityKind::Employee,
        employee.employee_id,
        employee,
    )
}

pub(crate) fn insert_account(txn: &StorageTxn<'_>, account: &Account) -> Result<()> {
    insert_unique(
        txn,
        CF_ACCOUNTS,
        &id_key(account.account_number),
        EntityKind::Account,
        account.account_number,
        account,
    )
}

pub(crate) fn insert_savings_terms(
    txn: &StorageTxn<'_>,
    account_number: u64,
    terms: &SavingsTerms,
) -> Result<()> {
    insert_unique(
        txn,
        CF_SAVINGS,
        &id_key(account_number),
        EntityKind::SavingsAccount,
        account_number,
        terms,
    )
}

pub(crate) fn insert_checking_terms(
    txn: &StorageTxn<'_>,
    account_number: u64,
    terms: &CheckingTerms,
) -> Result<()> {
    insert_unique(
        txn,
        CF_CHECKING,
        &id_key(account_number),
        EntityKind::CheckingAccount,
        account_number,
        terms,
    )
}

pub(crate) fn insert_depositor(txn: &StorageTxn<'_>, depositor: &Depositor) -> Result<()> {
    let key = pair_key(depositor.customer_id, depositor.account_number);
    insert_unique(
        txn,
        CF_DEPOSITORS,
        &key,
        EntityKind::Depositor,
        format!("({}, {})", depositor.customer_id, depositor.account_number),
        depositor,
    )?;
    txn.put_raw(
        CF_INDICES,
        &index_account_depositor(depositor.account_number, depositor.customer_id),
        &[],
    )
}

pub(crate) fn insert_loan(txn: &StorageTxn<'_>, loan: &Loan) -> Result<()> {
    insert_unique(
        txn,
        CF_LOANS,
        &id_key(loan.loan_number),
        EntityKind::Loan,
        loan.loan_number,
        loan,
    )
}

pub(crate) fn insert_loan_branch(txn: &StorageTxn<'_>, link: &LoanBranch) -> Result<()> {
    txn.put(CF_LOAN_BRANCHES, &id_key(link.loan_number), link)?;
    txn.put_raw(
        CF_INDICES,
        &index_branch_loan(&link.branch_name, link.loan_number),
        &[],
    )
}

pub(crate) fn insert_borrower(txn: &StorageTxn<'_>, borrower: &Borrower) -> Result<()> {
    let key = pair_key(borrower.customer_id, borrower.loan_number);
    insert_unique(
        txn,
        CF_BORROWERS,
        &key,
        EntityKind::Borrower,
        format!("({}, {})", borrower.customer_id, borrower.loan_number),
        borrower,
    )?;
    txn.put_raw(
        CF_INDICES,
        &index_loan_borrower(borrower.loan_number, borrower.customer_id),
        &[],
    )
}

pub(crate) fn insert_payment(txn: &StorageTxn<'_>, payment: &Payment) -> Result<()> {
    insert_unique(
        txn,
        CF_PAYMENTS,
        &id_key(payment.payment_number),
        EntityKind::Payment,
        payment.payment_number,
        payment,
    )
}

pub(crate) fn insert_loan_payment(txn: &StorageTxn<'_>, link: &LoanPayment) -> Result<()> {
    txn.put(CF_LOAN_PAYMENTS, &id_key(link.payment_number), link)?;
    txn.put_raw(
        CF_INDICES,
        &index_loan_payment(link.loan_number, link.payment_number),
        &[],
    )?;
    txn.put_raw(
        CF_INDICES,
        &index_account_payment(link.account_number, link.payment_number),
        &[],
    )
}

// Point reads (snapshot; single-statement lookups need no unit of work)

pub(crate) fn get_branch(storage: &Storage, name: &str) -> Result<Branch> {
    storage
        .read(CF_BRANCHES, name.as_bytes())?
        .ok_or_else(|| Error::not_found(EntityKind::Branch, name))
}

pub(crate) fn get_customer(storage: &Storage, customer_id: u64) -> Result<Customer> {
    storage
        .read(CF_CUSTOMERS, &id_key(customer_id))?
        .ok_or_else(|| Error::not_found(EntityKind::Customer, customer_id))
}

pub(crate) fn get_employee(storage: &Storage, employee_id: u64) -> Result<Employee> {
    storage
        .read(CF_EMPLOYEES, &id_key(employee_id))?
        .ok_or_else(|| Error::not_found(EntityKind::Employee, employee_id))
}

pub(crate) fn get_account(storage: &Storage, account_number: u64) -> Result<Account> {
    storage
        .read(CF_ACCOUNTS, &id_key(account_number))?
        .ok_or_else(|| Error::not_found(EntityKind::Account, account_number))
}

pub(crate) fn get_loan(storage: &Storage, loan_number: u64) -> Result<Loan> {
    storage
        .read(CF_LOANS, &id_key(loan_number))?
        .ok_or_else(|| Error::not_found(EntityKind::Loan, loan_number))
}

pub(crate) fn get_payment(storage: &Storage, payment_number: u64) -> Result<Payment> {
    storage
        .read(CF_PAYMENTS, &id_key(payment_number))?
        .ok_or_else(|| Error::not_found(EntityKind::Payment, payment_number))
}

pub(crate) fn get_loan_payment(storage: &Storage, payment_number: u64) -> Result<LoanPayment> {
    storage
        .read(CF_LOAN_PAYMENTS, &id_key(payment_number))?
        .ok_or_else(|| Error::not_found(EntityKind::Payment, payment_number))
}

// Lists

pub(crate) fn list_branches(storage: &Storage) -> Result<Vec<Branch>> {
    storage.scan_all(CF_BRANCHES)
}

pub(crate) fn list_customers(storage: &Storage) -> Result<Vec<Customer>> {
    storage.scan_all(CF_CUSTOMERS)
}

pub(crate) fn list_employees(storage: &Storage) -> Result<Vec<Employee>> {
    storage.scan_all(CF_EMPLOYEES)
}

pub(crate) fn list_accounts(storage: &Storage) -> Result<Vec<Account>> {
    storage.scan_all(CF_ACCOUNTS)
}

pub(crate) fn list_loans(storage: &Storage) -> Result<Vec<Loan>> {
    storage.scan_all(CF_LOANS)
}

pub(crate) fn list_payments(storage: &Storage) -> Result<Vec<Payment>> {
    storage.scan_all(CF_PAYMENTS)
}

/// Savings kind rows joined with their base account rows
pub(crate) fn list_savings_accounts(storage: &Storage) -> Result<Vec<SavingsAccount>> {
    let terms: Vec<(Vec<u8>, SavingsTerms)> = storage.scan_all_keyed(CF_SAVINGS)?;
    let mut accounts = Vec::with_capacity(terms.len());
    for (key, t) in terms {
        let account_number = decode_id(&key)?;
        let base = get_account(storage, account_number)
            .map_err(|_| Error::Fatal(format!("savings terms without account row: {}", account_number)))?;
        accounts.push(SavingsAccount {
            account_number,
            balance: base.balance,
            interest_rate: t.interest_rate,
        });
    }
    Ok(accounts)
}

/// Checking kind rows joined with their base account rows
pub(crate) fn list_checking_accounts(storage: &Storage) -> Result<Vec<CheckingAccount>> {
    let terms: Vec<(Vec<u8>, CheckingTerms)> = storage.scan_all_keyed(CF_CHECKING)?;
    let mut accounts = Vec::with_capacity(terms.len());
    for (key, t) in terms {
        let account_number = decode_id(&key)?;
        let base = get_account(storage, account_number)
            .map_err(|_| Error::Fatal(format!("checking terms without account row: {}", account_number)))?;
        accounts.push(CheckingAccount {
            account_number,
            balance: base.balance,
            overdraft_amount: t.overdraft_amount,
        });
    }
    Ok(accounts)
}

pub(crate) fn list_depositors(storage: &Storage) -> Result<Vec<Depositor>> {
    storage.scan_all(CF_DEPOSITORS)
}

pub(crate) fn list_borrowers(storage: &Storage) -> Result<Vec<Borrower>> {
    storage.scan_all(CF_BORROWERS)
}

fn decode_id(key: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| Error::Fatal("malformed primary key".to_string()))?;
    Ok(u64::from_be_bytes(bytes))
}

// Updates (full replace, keyed by primary key)

pub(crate) fn update_branch(txn: &StorageTxn<'_>, branch: &Branch) -> Result<()> {
    let key = branch.branch_name.as_bytes();
    if !txn.contains_for_update(CF_BRANCHES, key)? {
        return Err(Error::not_found(EntityKind::Branch, &branch.branch_name));
    }
    txn.put(CF_BRANCHES, key, branch)
}

pub(crate) fn update_customer(txn: &StorageTxn<'_>, customer: &Customer) -> Result<()> {
    let key = id_key(customer.customer_id);
    if !txn.contains_for_update(CF_CUSTOMERS, &key)? {
        return Err(Error::not_found(EntityKind::Customer, customer.customer_id));
    }
    txn.put(CF_CUSTOMERS, &key, customer)
}

pub(crate) fn update_employee(txn: &StorageTxn<'_>, employee: &Employee) -> Result<()> {
    let key = id_key(employee.employee_id);
    if !txn.contains_for_update(CF_EMPLOYEES, &key)? {
        return Err(Error::not_found(EntityKind::Employee, employee.employee_id));
    }
    txn.put(CF_EMPLOYEES, &key, employee)
}

// Deletes (referential guards per the dependency edges in §indices)

pub(crate) fn delete_customer(txn: &StorageTxn<'_>, customer_id: u64) -> Result<()> {
    let key = id_key(customer_id);
    if !txn.contains_for_update(CF_CUSTOMERS, &key)? {
        return Err(Error::not_found(EntityKind::Customer, customer_id));
    }

    // Depositor and borrower composite keys start with the customer id
    if !txn.prefix_is_empty(CF_DEPOSITORS, &key)?
        || !txn.prefix_is_empty(CF_BORROWERS, &key)?
    {
        return Err(Error::referential(EntityKind::Customer, customer_id));
    }

    txn.delete(CF_CUSTOMERS, &key)
}

pub(crate) fn delete_employee(txn: &StorageTxn<'_>, employee_id: u64) -> Result<()> {
    let key = id_key(employee_id);
    if !txn.contains_for_update(CF_EMPLOYEES, &key)? {
        return Err(Error::not_found(EntityKind::Employee, employee_id));
    }
    txn.delete(CF_EMPLOYEES, &key)
}

pub(crate) fn delete_branch(txn: &StorageTxn<'_>, name: &str) -> Result<()> {
    let key = name.as_bytes();
    if !txn.contains_for_update(CF_BRANCHES, key)? {
        return Err(Error::not_found(EntityKind::Branch, name));
    }

    if !txn.prefix_is_empty(CF_INDICES, &index_prefix_branch_loan(name))? {
        return Err(Error::referential(EntityKind::Branch, name));
    }

    txn.delete(CF_BRANCHES, key)
}

pub(crate) fn delete_account(txn: &StorageTxn<'_>, account_number: u64) -> Result<()> {
    let key = id_key(account_number);
    if !txn.contains_for_update(CF_ACCOUNTS, &key)? {
        return Err(Error::not_found(EntityKind::Account, account_number));
    }

    if !txn.prefix_is_empty(CF_INDICES, &index_prefix_account_depositor(account_number))?
        || !txn.prefix_is_empty(CF_INDICES, &index_prefix_account_payment(account_number))?
    {
        return Err(Error::referential(EntityKind::Account, account_number));
    }

    // Kind rows are subordinate to the base account row
    txn.delete(CF_SAVINGS, &key)?;
    txn.delete(CF_CHECKING, &key)?;
    txn.delete(CF_ACCOUNTS, &key)
}

pub(crate) fn delete_loan(txn: &StorageTxn<'_>, loan_number: u64) -> Result<()> {
    let key = id_key(loan_number);
    if !txn.contains_for_update(CF_LOANS, &key)? {
        return Err(Error::not_found(EntityKind::Loan, loan_number));
    }

    if !txn.prefix_is_empty(CF_INDICES, &index_prefix_loan_borrower(loan_number))?
        || !txn.prefix_is_empty(CF_INDICES, &index_prefix_loan_payment(loan_number))?
    {
        return Err(Error::referential(EntityKind::Loan, loan_number));
    }

    // The branch link is subordinate to the loan and goes with it
    if let Some(link) = txn.get::<LoanBranch>(CF_LOAN_BRANCHES, &key)? {
        txn.delete(CF_INDICES, &index_branch_loan(&link.branch_name, loan_number))?;
        txn.delete(CF_LOAN_BRANCHES, &key)?;
    }

    txn.delete(CF_LOANS, &key)
}

pub(crate) fn delete_depositor(
    txn: &StorageTxn<'_>,
    customer_id: u64,
    account_number: u64,
) -> Result<()> {
    let key = pair_key(customer_id, account_number);
    if !txn.contains_for_update(CF_DEPOSITORS, &key)? {
        return Err(Error::not_found(
            EntityKind::Depositor,
            format!("({}, {})", customer_id, account_number),
        ));
    }
    txn.delete(CF_INDICES, &index_account_depositor(account_number, customer_id))?;
    txn.delete(CF_DEPOSITORS, &key)
}

pub(crate) fn delete_borrower(
    txn: &StorageTxn<'_>,
    customer_id: u64,
    loan_number: u64,
) -> Result<()> {
    let key = pair_key(customer_id, loan_number);
    if !txn.contains_for_update(CF_BORROWERS, &key)? {
        return Err(Error::not_found(
            EntityKind::Borrower,
            format!("({}, {})", customer_id, loan_number),
        ));
    }
    txn.delete(CF_INDICES, &index_loan_borrower(loan_number, customer_id))?;
    txn.delete(CF_BORROWERS, &key)
}

pub(crate) fn delete_payment(txn: &StorageTxn<'_>, payment_number: u64) -> Result<()> {
    let key = id_key(payment_number);
    if !txn.contains_for_update(CF_PAYMENTS, &key)? {
        return Err(Error::not_found(EntityKind::Payment, payment_number));
    }

    // The link row and its index entries go with the payment
    if let Some(link) = txn.get::<LoanPayment>(CF_LOAN_PAYMENTS, &key)? {
        txn.delete(CF_INDICES, &index_loan_payment(link.loan_number, payment_number))?;
        txn.delete(
            CF_INDICES,
            &index_account_payment(link.account_number, payment_number),
        )?;
        txn.delete(CF_LOAN_PAYMENTS, &key)?;
    }

    txn.delete(CF_PAYMENTS, &key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn test_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        (Storage::open(&config).unwrap(), temp_dir)
    }

    fn customer(id: u64) -> Customer {
        Customer {
            customer_id: id,
            customer_name: "John Doe".to_string(),
            customer_street: Some("123 Main St".to_string()),
            customer_city: Some("New York".to_string()),
        }
    }

    #[test]
    fn test_insert_and_get_customer() {
        let (storage, _temp) = test_storage();

        let txn = storage.begin(100);
        insert_customer(&txn, &customer(1)).unwrap();
        txn.commit().unwrap();

        let read = get_customer(&storage, 1).unwrap();
        assert_eq!(read.customer_name, "John Doe");
        assert!(matches!(
            get_customer(&storage, 2),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_insert_duplicate_is_conflict() {
        let (storage, _temp) = test_storage();

        let txn = storage.begin(100);
        insert_customer(&txn, &customer(1)).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin(100);
        let err = insert_customer(&txn, &customer(1)).unwrap_err();
        assert!(matches!(err, Error::Conflict { kind: EntityKind::Customer, .. }));
    }

    #[test]
    fn test_duplicate_borrower_is_conflict() {
        let (storage, _temp) = test_storage();

        let borrower = Borrower {
            customer_id: 1,
            loan_number: 5001,
        };

        let txn = storage.begin(100);
        insert_borrower(&txn, &borrower).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin(100);
        let err = insert_borrower(&txn, &borrower).unwrap_err();
        match err {
            Error::Conflict { kind, key } => {
                assert_eq!(kind, EntityKind::Borrower);
                assert_eq!(key, "(1, 5001)");
            }
            other => panic!("expected Conflict, got {}", other),
        }
    }

    #[test]
    fn test_update_customer() {
        let (storage, _temp) = test_storage();

        let txn = storage.begin(100);
        insert_customer(&txn, &customer(1)).unwrap();
        txn.commit().unwrap();

        let mut updated = customer(1);
        updated.customer_city = Some("Chicago".to_string());

        let txn = storage.begin(100);
        update_customer(&txn, &updated).unwrap();
        txn.commit().unwrap();

        assert_eq!(
            get_customer(&storage, 1).unwrap().customer_city.as_deref(),
            Some("Chicago")
        );

        // Updating a missing row is NotFound
        let txn = storage.begin(100);
        let missing = customer(2);
        assert!(matches!(
            update_customer(&txn, &missing),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_customer_with_depositor_blocked() {
        let (storage, _temp) = test_storage();

        let txn = storage.begin(100);
        insert_customer(&txn, &customer(1)).unwrap();
        insert_depositor(
            &txn,
            &Depositor {
                customer_id: 1,
                account_number: 1001,
                access_date: NaiveDate::from_ymd_opt(2023, 4, 15).unwrap(),
            },
        )
        .unwrap();
        txn.commit().unwrap();

        let txn = storage.begin(100);
        let err = delete_customer(&txn, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::ReferentialConflict { kind: EntityKind::Customer, .. }
        ));
        drop(txn);

        // Customer row remains
        assert!(get_customer(&storage, 1).is_ok());
    }

    #[test]
    fn test_delete_unreferenced_customer() {
        let (storage, _temp) = test_storage();

        let txn = storage.begin(100);
        insert_customer(&txn, &customer(1)).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin(100);
        delete_customer(&txn, 1).unwrap();
        txn.commit().unwrap();

        assert!(matches!(
            get_customer(&storage, 1),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_branch_with_loan_blocked() {
        let (storage, _temp) = test_storage();

        let branch = Branch {
            branch_name: "Main Branch".to_string(),
            branch_city: Some("Chicago".to_string()),
            assets: Some(Decimal::new(1_000_000_00, 2)),
        };

        let txn = storage.begin(100);
        insert_branch(&txn, &branch).unwrap();
        insert_loan(
            &txn,
            &Loan {
                loan_number: 5001,
                amount: Decimal::new(10_000_00, 2),
            },
        )
        .unwrap();
        insert_loan_branch(
            &txn,
            &LoanBranch {
                branch_name: "Main Branch".to_string(),
                loan_number: 5001,
            },
        )
        .unwrap();
        txn.commit().unwrap();

        let txn = storage.begin(100);
        assert!(matches!(
            delete_branch(&txn, "Main Branch"),
            Err(Error::ReferentialConflict { .. })
        ));
        drop(txn);

        // Deleting the loan first releases the branch
        let txn = storage.begin(100);
        delete_loan(&txn, 5001).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin(100);
        delete_branch(&txn, "Main Branch").unwrap();
        txn.commit().unwrap();
    }

    #[test]
    fn test_delete_loan_with_borrower_blocked() {
        let (storage, _temp) = test_storage();

        let txn = storage.begin(100);
        insert_loan(
            &txn,
            &Loan {
                loan_number: 5001,
                amount: Decimal::new(10_000_00, 2),
            },
        )
        .unwrap();
        insert_borrower(
            &txn,
            &Borrower {
                customer_id: 1,
                loan_number: 5001,
            },
        )
        .unwrap();
        txn.commit().unwrap();

        let txn = storage.begin(100);
        assert!(matches!(
            delete_loan(&txn, 5001),
            Err(Error::ReferentialConflict { kind: EntityKind::Loan, .. })
        ));
    }

    #[test]
    fn test_delete_account_removes_kind_row() {
        let (storage, _temp) = test_storage();

        let txn = storage.begin(100);
        insert_account(
            &txn,
            &Account {
                account_number: 1001,
                balance: Decimal::ZERO,
            },
        )
        .unwrap();
        insert_savings_terms(
            &txn,
            1001,
            &SavingsTerms {
                interest_rate: Decimal::new(2_50, 2),
            },
        )
        .unwrap();
        txn.commit().unwrap();

        let txn = storage.begin(100);
        delete_account(&txn, 1001).unwrap();
        txn.commit().unwrap();

        assert!(list_savings_accounts(&storage).unwrap().is_empty());
        assert!(list_accounts(&storage).unwrap().is_empty());
    }

    #[test]
    fn test_list_savings_accounts_joins_balance() {
        let (storage, _temp) = test_storage();

        let txn = storage.begin(100);
        insert_account(
            &txn,
            &Account {
                account_number: 1001,
                balance: Decimal::new(1_000_00, 2),
            },
        )
        .unwrap();
        insert_savings_terms(
            &txn,
            1001,
            &SavingsTerms {
                interest_rate: Decimal::new(2_50, 2),
            },
        )
        .unwrap();
        insert_account(
            &txn,
            &Account {
                account_number: 1002,
                balance: Decimal::new(500_00, 2),
            },
        )
        .unwrap();
        insert_checking_terms(
            &txn,
            1002,
            &CheckingTerms {
                overdraft_amount: Decimal::new(500_00, 2),
            },
        )
        .unwrap();
        txn.commit().unwrap();

        let savings = list_savings_accounts(&storage).unwrap();
        assert_eq!(savings.len(), 1);
        assert_eq!(savings[0].account_number, 1001);
        assert_eq!(savings[0].balance, Decimal::new(1_000_00, 2));
        assert_eq!(savings[0].interest_rate, Decimal::new(2_50, 2));

        let checking = list_checking_accounts(&storage).unwrap();
        assert_eq!(checking.len(), 1);
        assert_eq!(checking[0].overdraft_amount, Decimal::new(500_00, 2));
    }

    #[test]
    fn test_payment_link_roundtrip() {
        let (storage, _temp) = test_storage();

        let payment = Payment {
            payment_number: 7001,
            payment_date: NaiveDate::from_ymd_opt(2023, 4, 15).unwrap(),
            payment_amount: Decimal::new(250_00, 2),
        };
        let link = LoanPayment {
            loan_number: 5001,
            account_number: 1001,
            payment_number: 7001,
        };

        let txn = storage.begin(100);
        insert_payment(&txn, &payment).unwrap();
        insert_loan_payment(&txn, &link).unwrap();
        txn.commit().unwrap();

        assert_eq!(get_payment(&storage, 7001).unwrap(), payment);
        assert_eq!(get_loan_payment(&storage, 7001).unwrap(), link);
    }
}
