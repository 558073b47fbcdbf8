//! Ledger handlers (transactions, statements, reset)

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::{error, info};

use super::super::error::{ApiError, ApiResult};
use super::super::state::AppState;
use super::super::types::{
    BalanceResponse, KnownClient, StatementResponse, ValidatedTransaction,
};
use crate::ledger::ErrorKind;

/// Apply a credit or debit to a client account
///
/// POST /clientes/{id}/transacoes
#[utoipa::path(
    post,
    path = "/clientes/{id}/transacoes",
    params(
        ("id" = i32, Path, description = "Client ID")
    ),
    request_body = crate::gateway::types::TransactionRequest,
    responses(
        (status = 200, description = "Transaction committed", body = BalanceResponse, content_type = "application/json"),
        (status = 404, description = "Unknown client", body = crate::gateway::error::ErrorResponse),
        (status = 422, description = "Invalid request or limit exceeded", body = crate::gateway::error::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::gateway::error::ErrorResponse)
    ),
    tag = "Ledger"
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    KnownClient(client): KnownClient,
    ValidatedTransaction(transaction): ValidatedTransaction,
) -> ApiResult<BalanceResponse> {
    match state.store.apply_transaction(client, &transaction).await {
        Ok(snapshot) => Ok(Json(snapshot.into())),
        Err(err) => {
            match err.kind() {
                ErrorKind::DomainRejection => info!(
                    client_id = client.value(),
                    amount = transaction.signed_amount(),
                    reason = err.code(),
                    "Transaction rejected"
                ),
                ErrorKind::Infrastructure => error!(
                    client_id = client.value(),
                    amount = transaction.amount(),
                    kind = transaction.kind().code(),
                    description = transaction.description(),
                    error = %err,
                    "Failed to apply transaction"
                ),
                _ => {}
            }
            Err(err.into())
        }
    }
}

/// Get client balance and latest transactions
///
/// GET /clientes/{id}/extrato
#[utoipa::path(
    get,
    path = "/clientes/{id}/extrato",
    params(
        ("id" = i32, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Statement", body = StatementResponse, content_type = "application/json"),
        (status = 404, description = "Unknown client", body = crate::gateway::error::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::gateway::error::ErrorResponse)
    ),
    tag = "Ledger"
)]
pub async fn get_statement(
    State(state): State<Arc<AppState>>,
    KnownClient(client): KnownClient,
) -> ApiResult<StatementResponse> {
    match state.store.statement(client).await {
        Ok(statement) => Ok(Json(statement.into())),
        Err(err) => {
            if err.kind() == ErrorKind::Infrastructure {
                error!(client_id = client.value(), error = %err, "Failed to read statement");
            }
            Err(err.into())
        }
    }
}

/// Wipe all balances and transaction history
///
/// GET /reset
///
/// Side effect behind GET, kept for compatibility with existing load-test
/// harnesses. Unauthenticated.
#[utoipa::path(
    get,
    path = "/reset",
    responses(
        (status = 200, description = "Ledger reset", body = String, content_type = "text/plain"),
        (status = 400, description = "Reset failed", body = crate::gateway::error::ErrorResponse)
    ),
    tag = "Admin"
)]
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<&'static str, ApiError> {
    state.store.reset().await.map_err(|err| {
        error!(error = %err, "Failed to reset ledger");
        ApiError::bad_request("RESET_FAILED", "Failed to reset ledger")
    })?;
    Ok("Resetado")
}
