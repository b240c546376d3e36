//! Ledger facade: the public operation surface
//!
//! Every mutating operation runs as one unit of work: identifier
//! allocation, existence checks, and all row writes commit together or
//! roll back together. A failure partway through a multi-row creation
//! (say, a savings account whose customer vanished) leaves nothing
//! behind, including the allocated identifier.
//!
//! Reads run against a storage snapshot and never block writers.

use crate::{
    alloc::{self, IdKind},
    balance,
    config::Config,
    error::{Error, Result},
    metrics::Metrics,
    repo,
    storage::Storage,
    txn::TxnManager,
    types::{
        Account, Borrower, Branch, CheckingAccount, CheckingTerms, Customer, Depositor,
        Employee, Loan, LoanBranch, LoanPayment, NewCheckingAccount, NewCustomer, NewEmployee,
        NewLoan, NewPayment, NewSavingsAccount, Payment, SavingsAccount, SavingsTerms,
    },
    validate::{require_exists, EntityRef},
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// Transactional banking ledger
///
/// Cheap to clone; clones share the same storage and metrics.
#[derive(Clone)]
pub struct Ledger {
    storage: Arc<Storage>,
    txn: TxnManager,
    metrics: Metrics,
}

impl Ledger {
    /// Open (or create) the ledger at `config.data_dir`
    pub async fn open(config: Config) -> Result<Self> {
        let metrics = Metrics::new().map_err(|e| Error::Fatal(e.to_string()))?;
        let storage = Arc::new(Storage::open(&config)?);
        let txn = TxnManager::new(config.txn, metrics.clone());

        info!(
            data_dir = %config.data_dir.display(),
            service = %config.service_name,
            version = %config.service_version,
            "ledger opened"
        );

        Ok(Self {
            storage,
            txn,
            metrics,
        })
    }

    /// Metrics for this ledger instance
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn write_op<T>(
        &self,
        op: &'static str,
        f: impl FnMut(&crate::storage::StorageTxn<'_>) -> Result<T>,
    ) -> Result<T> {
        let start = Instant::now();
        let result = self.txn.run(&self.storage, op, f);
        self.metrics.observe_op_duration(start.elapsed().as_secs_f64());
        result
    }

    // Branches (caller-keyed by name; no allocator involved)

    /// Create a branch; `Conflict` if the name is taken
    #[instrument(skip(self, branch), fields(branch = %branch.branch_name))]
    pub async fn create_branch(&self, branch: Branch) -> Result<Branch> {
        self.write_op("create_branch", |txn| {
            repo::insert_branch(txn, &branch)?;
            Ok(())
        })?;
        Ok(branch)
    }

    /// Fetch a branch by name
    pub async fn get_branch(&self, name: &str) -> Result<Branch> {
        repo::get_branch(&self.storage, name)
    }

    /// All branches, ordered by name
    pub async fn list_branches(&self) -> Result<Vec<Branch>> {
        repo::list_branches(&self.storage)
    }

    /// Replace a branch row; `NotFound` if it does not exist
    pub async fn update_branch(&self, branch: Branch) -> Result<Branch> {
        self.write_op("update_branch", |txn| repo::update_branch(txn, &branch))?;
        Ok(branch)
    }

    /// Delete a branch; `ReferentialConflict` while loans reference it
    #[instrument(skip(self))]
    pub async fn delete_branch(&self, name: &str) -> Result<()> {
        self.write_op("delete_branch", |txn| repo::delete_branch(txn, name))
    }

    // Customers

    /// Create a customer with an allocator-assigned identifier
    #[instrument(skip(self, new), fields(name = %new.customer_name))]
    pub async fn create_customer(&self, new: NewCustomer) -> Result<Customer> {
        self.write_op("create_customer", |txn| {
            let customer_id = alloc::next(txn, IdKind::Customer)?;
            let customer = Customer {
                customer_id,
                customer_name: new.customer_name.clone(),
                customer_street: new.customer_street.clone(),
                customer_city: new.customer_city.clone(),
            };
            repo::insert_customer(txn, &customer)?;
            Ok(customer)
        })
    }

    /// Fetch a customer by identifier
    pub async fn get_customer(&self, customer_id: u64) -> Result<Customer> {
        repo::get_customer(&self.storage, customer_id)
    }

    /// All customers, ordered by identifier
    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        repo::list_customers(&self.storage)
    }

    /// Replace a customer row; `NotFound` if it does not exist
    pub async fn update_customer(&self, customer: Customer) -> Result<Customer> {
        self.write_op("update_customer", |txn| repo::update_customer(txn, &customer))?;
        Ok(customer)
    }

    /// Delete a customer; `ReferentialConflict` while depositor or
    /// borrower links reference them
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, customer_id: u64) -> Result<()> {
        self.write_op("delete_customer", |txn| repo::delete_customer(txn, customer_id))
    }

    // Employees

    /// Create an employee with an allocator-assigned identifier
    #[instrument(skip(self, new), fields(name = %new.employee_name))]
    pub async fn create_employee(&self, new: NewEmployee) -> Result<Employee> {
        self.write_op("create_employee", |txn| {
            let employee_id = alloc::next(txn, IdKind::Employee)?;
            let employee = Employee {
                employee_id,
                employee_name: new.employee_name.clone(),
                telephone_number: new.telephone_number.clone(),
                dependent_name: new.dependent_name.clone(),
                start_date: new.start_date,
                employment_length: new.employment_length,
            };
            repo::insert_employee(txn, &employee)?;
            Ok(employee)
        })
    }

    /// Fetch an employee by identifier
    pub async fn get_employee(&self, employee_id: u64) -> Result<Employee> {
        repo::get_employee(&self.storage, employee_id)
    }

    /// All employees, ordered by identifier
    pub async fn list_employees(&self) -> Result<Vec<Employee>> {
        repo::list_employees(&self.storage)
    }

    /// Replace an employee row; `NotFound` if it does not exist
    pub async fn update_employee(&self, employee: Employee) -> Result<Employee> {
        self.write_op("update_employee", |txn| repo::update_employee(txn, &employee))?;
        Ok(employee)
    }

    /// Delete an employee; nothing references employees, so this always
    /// succeeds once the row exists
    #[instrument(skip(self))]
    pub async fn delete_employee(&self, employee_id: u64) -> Result<()> {
        self.write_op("delete_employee", |txn| repo::delete_employee(txn, employee_id))
    }

    // Accounts

    /// Open a savings account for `customer_id`
    ///
    /// Writes the base account row, the savings terms, and the depositor
    /// link in one unit of work. `NotFound` if the customer does not
    /// exist; `InvalidAmount` for a negative opening balance or interest
    /// rate. Nothing is persisted on failure.
    #[instrument(skip(self, new))]
    pub async fn create_savings_account(
        &self,
        customer_id: u64,
        new: NewSavingsAccount,
    ) -> Result<SavingsAccount> {
        if new.balance < Decimal::ZERO {
            return Err(Error::InvalidAmount(new.balance));
        }
        if new.interest_rate < Decimal::ZERO {
            return Err(Error::InvalidAmount(new.interest_rate));
        }

        self.write_op("create_savings_account", |txn| {
            require_exists(txn, EntityRef::Customer(customer_id))?;

            let account_number = alloc::next(txn, IdKind::Account)?;
            repo::insert_account(
                txn,
                &Account {
                    account_number,
                    balance: new.balance,
                },
            )?;
            repo::insert_savings_terms(
                txn,
                account_number,
                &SavingsTerms {
                    interest_rate: new.interest_rate,
                },
            )?;
            repo::insert_depositor(
                txn,
                &Depositor {
                    customer_id,
                    account_number,
                    access_date: Utc::now().date_naive(),
                },
            )?;

            Ok(SavingsAccount {
                account_number,
                balance: new.balance,
                interest_rate: new.interest_rate,
            })
        })
    }

    /// Open a checking account for `customer_id`
    ///
    /// The opening balance may be negative down to the overdraft limit.
    #[instrument(skip(self, new))]
    pub async fn create_checking_account(
        &self,
        customer_id: u64,
        new: NewCheckingAccount,
    ) -> Result<CheckingAccount> {
        if new.overdraft_amount < Decimal::ZERO {
            return Err(Error::InvalidAmount(new.overdraft_amount));
        }
        if new.balance < -new.overdraft_amount {
            return Err(Error::InvalidAmount(new.balance));
        }

        self.write_op("create_checking_account", |txn| {
            require_exists(txn, EntityRef::Customer(customer_id))?;

            let account_number = alloc::next(txn, IdKind::Account)?;
            repo::insert_account(
                txn,
                &Account {
                    account_number,
                    balance: new.balance,
                },
            )?;
            repo::insert_checking_terms(
                txn,
                account_number,
                &CheckingTerms {
                    overdraft_amount: new.overdraft_amount,
                },
            )?;
            repo::insert_depositor(
                txn,
                &Depositor {
                    customer_id,
                    account_number,
                    access_date: Utc::now().date_naive(),
                },
            )?;

            Ok(CheckingAccount {
                account_number,
                balance: new.balance,
                overdraft_amount: new.overdraft_amount,
            })
        })
    }

    /// Fetch the base account row
    pub async fn get_account(&self, account_number: u64) -> Result<Account> {
        repo::get_account(&self.storage, account_number)
    }

    /// All base account rows, ordered by number
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        repo::list_accounts(&self.storage)
    }

    /// All savings accounts with their balances
    pub async fn list_savings_accounts(&self) -> Result<Vec<SavingsAccount>> {
        repo::list_savings_accounts(&self.storage)
    }

    /// All checking accounts with their balances
    pub async fn list_checking_accounts(&self) -> Result<Vec<CheckingAccount>> {
        repo::list_checking_accounts(&self.storage)
    }

    /// Delete an account and its kind row; `ReferentialConflict` while
    /// depositor links or payments reference it
    #[instrument(skip(self))]
    pub async fn delete_account(&self, account_number: u64) -> Result<()> {
        self.write_op("delete_account", |txn| repo::delete_account(txn, account_number))
    }

    // Depositor links

    /// All depositor links
    pub async fn list_depositors(&self) -> Result<Vec<Depositor>> {
        repo::list_depositors(&self.storage)
    }

    /// Remove a depositor link, releasing its hold on customer and
    /// account deletion
    #[instrument(skip(self))]
    pub async fn remove_depositor(&self, customer_id: u64, account_number: u64) -> Result<()> {
        self.write_op("remove_depositor", |txn| {
            repo::delete_depositor(txn, customer_id, account_number)
        })
    }

    // Balance movements

    /// Deposit `amount` into an account; returns the updated row
    #[instrument(skip(self))]
    pub async fn deposit(&self, account_number: u64, amount: Decimal) -> Result<Account> {
        let account =
            self.write_op("deposit", |txn| balance::deposit(txn, account_number, amount))?;
        self.metrics.record_deposit();
        info!(account = account_number, %amount, balance = %account.balance, "deposit");
        Ok(account)
    }

    /// Withdraw `amount` from an account, respecting its balance floor;
    /// returns the updated row
    #[instrument(skip(self))]
    pub async fn withdraw(&self, account_number: u64, amount: Decimal) -> Result<Account> {
        let account =
            self.write_op("withdraw", |txn| balance::withdraw(txn, account_number, amount))?;
        self.metrics.record_withdrawal();
        info!(account = account_number, %amount, balance = %account.balance, "withdrawal");
        Ok(account)
    }

    // Loans

    /// Originate a loan at a branch
    ///
    /// `InvalidAmount` unless the principal is positive; `NotFound` if
    /// the branch does not exist.
    #[instrument(skip(self, new), fields(branch = %new.branch_name))]
    pub async fn create_loan(&self, new: NewLoan) -> Result<Loan> {
        if new.amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(new.amount));
        }

        self.write_op("create_loan", |txn| {
            require_exists(txn, EntityRef::Branch(&new.branch_name))?;

            let loan_number = alloc::next(txn, IdKind::Loan)?;
            let loan = Loan {
                loan_number,
                amount: new.amount,
            };
            repo::insert_loan(txn, &loan)?;
            repo::insert_loan_branch(
                txn,
                &LoanBranch {
                    branch_name: new.branch_name.clone(),
                    loan_number,
                },
            )?;
            Ok(loan)
        })
    }

    /// Fetch a loan by number
    pub async fn get_loan(&self, loan_number: u64) -> Result<Loan> {
        repo::get_loan(&self.storage, loan_number)
    }

    /// All loans, ordered by number
    pub async fn list_loans(&self) -> Result<Vec<Loan>> {
        repo::list_loans(&self.storage)
    }

    /// Delete a loan and its branch link; `ReferentialConflict` while
    /// borrowers or payments reference it
    #[instrument(skip(self))]
    pub async fn delete_loan(&self, loan_number: u64) -> Result<()> {
        self.write_op("delete_loan", |txn| repo::delete_loan(txn, loan_number))
    }

    // Borrower links

    /// Link a customer to a loan
    ///
    /// Both sides must exist; linking the same pair twice is `Conflict`.
    #[instrument(skip(self))]
    pub async fn add_borrower(&self, customer_id: u64, loan_number: u64) -> Result<Borrower> {
        self.write_op("add_borrower", |txn| {
            require_exists(txn, EntityRef::Customer(customer_id))?;
            require_exists(txn, EntityRef::Loan(loan_number))?;

            let borrower = Borrower {
                customer_id,
                loan_number,
            };
            repo::insert_borrower(txn, &borrower)?;
            Ok(borrower)
        })
    }

    /// All borrower links
    pub async fn list_borrowers(&self) -> Result<Vec<Borrower>> {
        repo::list_borrowers(&self.storage)
    }

    /// Remove a borrower link, releasing its hold on customer and loan
    /// deletion
    #[instrument(skip(self))]
    pub async fn remove_borrower(&self, customer_id: u64, loan_number: u64) -> Result<()> {
        self.write_op("remove_borrower", |txn| {
            repo::delete_borrower(txn, customer_id, loan_number)
        })
    }

    // Payments

    /// Record a payment against a loan, drawn from an account
    ///
    /// `InvalidAmount` unless the amount is positive; both the loan and
    /// the account must exist. The payment row and its link row commit
    /// together.
    #[instrument(skip(self, new), fields(loan = new.loan_number, account = new.account_number))]
    pub async fn create_payment(&self, new: NewPayment) -> Result<Payment> {
        if new.payment_amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(new.payment_amount));
        }

        self.write_op("create_payment", |txn| {
            require_exists(txn, EntityRef::Loan(new.loan_number))?;
            require_exists(txn, EntityRef::Account(new.account_number))?;

            let payment_number = alloc::next(txn, IdKind::Payment)?;
            let payment = Payment {
                payment_number,
                payment_date: new.payment_date,
                payment_amount: new.payment_amount,
            };
            repo::insert_payment(txn, &payment)?;
            repo::insert_loan_payment(
                txn,
                &LoanPayment {
                    loan_number: new.loan_number,
                    account_number: new.account_number,
                    payment_number,
                },
            )?;
            Ok(payment)
        })
    }

    /// Fetch a payment by number
    pub async fn get_payment(&self, payment_number: u64) -> Result<Payment> {
        repo::get_payment(&self.storage, payment_number)
    }

    /// Fetch the loan and account a payment was applied to
    pub async fn get_payment_link(&self, payment_number: u64) -> Result<LoanPayment> {
        repo::get_loan_payment(&self.storage, payment_number)
    }

    /// All payments, ordered by number
    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        repo::list_payments(&self.storage)
    }

    /// Delete a payment and its link row, releasing its hold on loan and
    /// account deletion
    #[instrument(skip(self))]
    pub async fn delete_payment(&self, payment_number: u64) -> Result<()> {
        self.write_op("delete_payment", |txn| repo::delete_payment(txn, payment_number))
    }
}
