pub mod health;
pub mod ledger;

pub use health::{HealthResponse, health_check};
pub use ledger::{create_transaction, get_statement, reset};
