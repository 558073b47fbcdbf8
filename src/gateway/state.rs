use std::sync::Arc;

use crate::ledger::{ClientRegistry, LedgerStore};

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    /// Ledger storage (the only place balances live)
    pub store: Arc<dyn LedgerStore>,
    /// Provisioned client ids
    pub clients: ClientRegistry,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>, clients: ClientRegistry) -> Self {
        Self { store, clients }
    }
}
