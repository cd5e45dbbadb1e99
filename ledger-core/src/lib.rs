//! Waste-Recovery Supply-Chain Ledger Core
//!
//! Authoritative ledger for packaged goods moving between manufacturers,
//! distributors and households. Accounts carry an administrative status and
//! a KYC lifecycle that gate who may transact; typed entries (supply,
//! transfer, return) convert multi-granularity package counts into base
//! units and mutate balances atomically; reports are derived by replaying
//! the entry log.
//!
//! # Architecture
//!
//! - **Append-only entries**: reversal annotates a record, never deletes it
//! - **Per-account locking**: submissions on unrelated accounts run in
//!   parallel; same-account submissions serialize
//! - **Atomic commits**: an entry and the balances it touches land in one
//!   storage write batch, or not at all
//! - **Derived reports**: every aggregate is reproducible from the log
//!
//! # Invariants
//!
//! - Transfer conservation: source loses exactly what the target gains
//! - Reversal inverse law: reversing an entry restores every touched
//!   balance; a second reversal fails
//! - Eligibility gating: only active, KYC-approved accounts transact
//! - Frozen conversion: an entry's base-unit quantity never changes after
//!   creation

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod accounts;
pub mod config;
pub mod error;
mod locks;
pub mod ledger;
pub mod metrics;
pub mod reports;
pub mod request;
pub mod storage;
pub mod types;
pub mod units;

// Re-exports
pub use accounts::{AccountStore, CreateAccount};
pub use config::{Config, ReturnPolicy};
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use request::EntryRequest;
pub use types::{
    Account, AccountFilter, AccountStats, AccountStatus, AccountType, CategoryTotal,
    DistributorVolume, Entry, KycStatus, ReportFilter, ReportSnapshot, TransactionType,
};
pub use units::{PackageLevel, PackageQuantity};
