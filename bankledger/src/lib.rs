//! # BankLedger
//!
//! Embedded transactional banking ledger over RocksDB.
//!
//! The ledger tracks branches, customers, employees, accounts, loans and
//! payments, with every mutating operation running as one atomic unit of
//! work. The core guarantees:
//!
//! - **Race-free identifiers**: entity numbers come from transactional
//!   sequence counters, never from scanning existing rows, so concurrent
//!   creations always receive distinct identifiers.
//! - **Balance floors**: withdrawals are serialized per account and can
//!   never take a balance below its floor (zero for savings, the negated
//!   overdraft limit for checking).
//! - **Referential integrity**: dependent rows are created only against
//!   existing parents, and parents cannot be deleted while dependents
//!   reference them.
//!
//! # Example
//!
//! ```no_run
//! use bankledger::{Config, Ledger, NewCustomer, NewSavingsAccount};
//! use rust_decimal::Decimal;
//!
//! # async fn demo() -> bankledger::Result<()> {
//! let ledger = Ledger::open(Config::default()).await?;
//!
//! let customer = ledger
//!     .create_customer(NewCustomer {
//!         customer_name: "Alice".to_string(),
//!         customer_street: None,
//!         customer_city: None,
//!     })
//!     .await?;
//!
//! let account = ledger
//!     .create_savings_account(
//!         customer.customer_id,
//!         NewSavingsAccount {
//!             balance: Decimal::new(100_00, 2),
//!             interest_rate: Decimal::new(2_50, 2),
//!         },
//!     )
//!     .await?;
//!
//! ledger.deposit(account.account_number, Decimal::new(50_00, 2)).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod types;

mod alloc;
mod balance;
mod repo;
mod storage;
mod txn;
mod validate;

pub use config::{Config, RocksDbConfig, TxnConfig};
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use metrics::Metrics;
pub use types::{
    Account, Borrower, Branch, CheckingAccount, Customer, Depositor, Employee, EntityKind,
    Loan, LoanPayment, NewCheckingAccount, NewCustomer, NewEmployee, NewLoan, NewPayment,
    NewSavingsAccount, Payment, SavingsAccount,
};
