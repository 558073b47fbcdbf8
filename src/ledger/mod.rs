//! Client ledger
//!
//! Validated transaction types, the error taxonomy and the PostgreSQL
//! store that applies transactions and serves statements.

pub mod error;
pub mod models;
pub mod service;

pub use error::{ErrorKind, LedgerError};
pub use models::{
    BalanceSnapshot, ClientId, ClientRegistry, MAX_DESCRIPTION_CHARS, NewTransaction,
    STATEMENT_SIZE, Statement, TransactionKind, TransactionRecord,
};
pub use service::{LedgerStore, PgLedger};
