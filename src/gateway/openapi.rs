//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:9999/docs`
//! - OpenAPI JSON: `http://localhost:9999/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::gateway::error::ErrorResponse;
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{
    BalanceResponse, StatementBalance, StatementEntry, StatementResponse, TransactionRequest,
};

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rinha Ledger API",
        version = "1.0.0",
        description = "Client ledger with storage-enforced credit limits.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:9999", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::ledger::create_transaction,
        crate::gateway::handlers::ledger::get_statement,
        crate::gateway::handlers::ledger::reset,
        crate::gateway::handlers::health::health_check,
    ),
    components(
        schemas(
            TransactionRequest,
            BalanceResponse,
            StatementResponse,
            StatementBalance,
            StatementEntry,
            ErrorResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "Ledger", description = "Transactions and statements"),
        (name = "Admin", description = "Benchmark harness operations (unauthenticated)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
