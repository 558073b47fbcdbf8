//! Rinha Ledger - HTTP entry point
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │ Gateway  │───▶│ PgLedger │───▶│ Postgres │
//! │ (axum)   │    │ (sqlx)   │    │ (CHECK)  │
//! └──────────┘    └──────────┘    └──────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;

use rinha_ledger::config::AppConfig;
use rinha_ledger::db::Database;
use rinha_ledger::gateway::{self, state::AppState};
use rinha_ledger::ledger::{ClientRegistry, PgLedger};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env).context("Failed to load configuration")?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }

    let _log_guard = rinha_ledger::logging::init_logging(&app_config);
    tracing::info!("Starting Rinha Ledger in {} mode", env);

    let db = Arc::new(
        Database::connect(&app_config.database)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );

    if app_config.database.init_schema {
        db.init_schema(&app_config.clients)
            .await
            .context("Failed to initialise ledger schema")?;
    }

    let clients = ClientRegistry::from_seeds(&app_config.clients);
    let store = Arc::new(PgLedger::new(db.clone()));
    let state = Arc::new(AppState::new(store, clients));

    let result = gateway::run_server(&app_config.gateway, state).await;

    db.close().await;
    result
}
