//! Rinha Ledger - client accounts with storage-enforced credit limits
//!
//! # Modules
//!
//! - [`config`] - YAML + environment configuration
//! - [`logging`] - tracing subscriber setup
//! - [`db`] - PostgreSQL pool and ledger schema
//! - [`ledger`] - Transaction validation, apply-transaction and statements
//! - [`gateway`] - axum HTTP routes

pub mod config;
pub mod db;
pub mod gateway;
pub mod ledger;
pub mod logging;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use db::Database;
pub use ledger::{ClientId, ClientRegistry, LedgerError, LedgerStore, NewTransaction, PgLedger};
