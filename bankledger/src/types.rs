//! Core types for the banking ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Exact arithmetic (Decimal for money)
//! - Caller-opaque integer identifiers

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bank branch, keyed by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name (primary key)
    pub branch_name: String,

    /// City the branch operates in
    pub branch_city: Option<String>,

    /// Total branch assets
    pub assets: Option<Decimal>,
}

/// Customer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer identifier (allocator-assigned)
    pub customer_id: u64,

    /// Full name
    pub customer_name: String,

    /// Street address
    pub customer_street: Option<String>,

    /// City
    pub customer_city: Option<String>,
}

/// Fields for creating or replacing a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    /// Full name
    pub customer_name: String,
    /// Street address
    pub customer_street: Option<String>,
    /// City
    pub customer_city: Option<String>,
}

/// Employee record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Employee identifier (allocator-assigned)
    pub employee_id: u64,

    /// Full name
    pub employee_name: String,

    /// Telephone number
    pub telephone_number: Option<String>,

    /// Dependent name
    pub dependent_name: Option<String>,

    /// Employment start date
    pub start_date: Option<NaiveDate>,

    /// Employment length in years
    pub employment_length: Option<u32>,
}

/// Fields for creating or replacing an employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    /// Full name
    pub employee_name: String,
    /// Telephone number
    pub telephone_number: Option<String>,
    /// Dependent name
    pub dependent_name: Option<String>,
    /// Employment start date
    pub start_date: Option<NaiveDate>,
    /// Employment length in years
    pub employment_length: Option<u32>,
}

/// Base account row shared by both concrete account kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account number (allocator-assigned, shared key space for both kinds)
    pub account_number: u64,

    /// Current balance (scale 2)
    pub balance: Decimal,
}

/// Savings-specific terms, keyed by account number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsTerms {
    /// Annual interest rate
    pub interest_rate: Decimal,
}

/// Checking-specific terms, keyed by account number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckingTerms {
    /// Maximum amount the balance may go negative
    pub overdraft_amount: Decimal,
}

/// Savings account view (base row joined with its terms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsAccount {
    /// Account number
    pub account_number: u64,
    /// Current balance
    pub balance: Decimal,
    /// Annual interest rate
    pub interest_rate: Decimal,
}

/// Checking account view (base row joined with its terms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckingAccount {
    /// Account number
    pub account_number: u64,
    /// Current balance
    pub balance: Decimal,
    /// Overdraft limit
    pub overdraft_amount: Decimal,
}

/// Parameters for opening a savings account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSavingsAccount {
    /// Opening balance
    pub balance: Decimal,
    /// Annual interest rate
    pub interest_rate: Decimal,
}

/// Parameters for opening a checking account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCheckingAccount {
    /// Opening balance
    pub balance: Decimal,
    /// Overdraft limit
    pub overdraft_amount: Decimal,
}

/// Customer-to-account link (composite key)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depositor {
    /// Customer holding the account
    pub customer_id: u64,
    /// Linked account
    pub account_number: u64,
    /// Date the link was established
    pub access_date: NaiveDate,
}

/// Loan record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Loan number (allocator-assigned)
    pub loan_number: u64,

    /// Principal amount
    pub amount: Decimal,
}

/// Parameters for originating a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    /// Originating branch (must exist)
    pub branch_name: String,
    /// Principal amount
    pub amount: Decimal,
}

/// Loan-to-branch link; every loan has exactly one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanBranch {
    /// Originating branch
    pub branch_name: String,
    /// Loan number
    pub loan_number: u64,
}

/// Customer-to-loan link (composite key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
    /// Borrowing customer
    pub customer_id: u64,
    /// Loan borrowed against
    pub loan_number: u64,
}

/// Loan payment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment number (allocator-assigned)
    pub payment_number: u64,

    /// Date of payment
    pub payment_date: NaiveDate,

    /// Amount paid
    pub payment_amount: Decimal,
}

/// Parameters for recording a loan payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    /// Loan being paid (must exist)
    pub loan_number: u64,
    /// Account the payment is drawn against (must exist)
    pub account_number: u64,
    /// Date of payment
    pub payment_date: NaiveDate,
    /// Amount paid
    pub payment_amount: Decimal,
}

/// Payment-to-(loan, account) link; every payment has exactly one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPayment {
    /// Loan being paid
    pub loan_number: u64,
    /// Account the payment is drawn against
    pub account_number: u64,
    /// Payment number
    pub payment_number: u64,
}

/// Entity kinds, used in error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Branch
    Branch,
    /// Customer
    Customer,
    /// Employee
    Employee,
    /// Base account
    Account,
    /// Savings account kind row
    SavingsAccount,
    /// Checking account kind row
    CheckingAccount,
    /// Depositor link
    Depositor,
    /// Loan
    Loan,
    /// Borrower link
    Borrower,
    /// Payment
    Payment,
}

impl EntityKind {
    /// Stable lowercase name for messages and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Branch => "branch",
            EntityKind::Customer => "customer",
            EntityKind::Employee => "employee",
            EntityKind::Account => "account",
            EntityKind::SavingsAccount => "savings account",
            EntityKind::CheckingAccount => "checking account",
            EntityKind::Depositor => "depositor",
            EntityKind::Loan => "loan",
            EntityKind::Borrower => "borrower",
            EntityKind::Payment => "payment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
