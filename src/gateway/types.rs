//! Request/response types and extractors
//!
//! - [`KnownClient`]: resolves `{id}` against the provisioned set (404 otherwise)
//! - [`ValidatedTransaction`]: JSON body validated into a [`NewTransaction`] (422 otherwise)
//! - Response DTOs keep the public field names (`saldo`, `limite`, ...)

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::ApiError;
use super::state::AppState;
use crate::ledger::{
    BalanceSnapshot, ClientId, LedgerError, NewTransaction, Statement, TransactionRecord,
};

// ============================================================================
// Input Types
// ============================================================================

/// Transaction request body
///
/// Fields are optional so that a missing field is reported as a
/// validation failure of that field rather than a parse error.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TransactionRequest {
    /// Positive integer amount
    #[schema(value_type = Option<i64>, example = 1000)]
    pub valor: Option<serde_json::Number>,
    /// `c` (credit) or `d` (debit)
    #[schema(example = "c")]
    pub tipo: Option<String>,
    /// 1 to 10 characters
    #[schema(example = "descricao")]
    pub descricao: Option<String>,
}

impl TransactionRequest {
    /// Validate amount, description and type, in that order.
    pub fn validate(&self) -> Result<NewTransaction, LedgerError> {
        let amount = self
            .valor
            .as_ref()
            .and_then(serde_json::Number::as_i64)
            .ok_or(LedgerError::InvalidAmount)?;
        NewTransaction::new(
            amount,
            self.tipo.as_deref().unwrap_or_default(),
            self.descricao.as_deref().unwrap_or_default(),
        )
    }
}

/// Client id from the path, known to be provisioned.
#[derive(Debug, Clone, Copy)]
pub struct KnownClient(pub ClientId);

impl FromRequestParts<Arc<AppState>> for KnownClient {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::client_not_found())?;

        state
            .clients
            .resolve(&raw)
            .map(KnownClient)
            .ok_or_else(ApiError::client_not_found)
    }
}

/// Transaction body that passed validation.
#[derive(Debug)]
pub struct ValidatedTransaction(pub NewTransaction);

impl<S> FromRequest<S> for ValidatedTransaction
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<TransactionRequest>::from_request(req, state)
            .await
            .map_err(|e| ApiError::unprocessable("INVALID_BODY", e.body_text()))?;

        let transaction = body.validate()?;
        Ok(ValidatedTransaction(transaction))
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Balance after a committed transaction
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = 100000)]
    pub limite: i64,
    pub saldo: i64,
}

impl From<BalanceSnapshot> for BalanceResponse {
    fn from(snapshot: BalanceSnapshot) -> Self {
        Self {
            limite: snapshot.limit,
            saldo: snapshot.balance,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatementResponse {
    pub saldo: StatementBalance,
    pub ultimas_transacoes: Vec<StatementEntry>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatementBalance {
    pub total: i64,
    /// Time the statement was served
    pub data_extrato: DateTime<Utc>,
    pub limite: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatementEntry {
    pub valor: i64,
    #[schema(example = "d")]
    pub tipo: String,
    pub descricao: String,
    pub data: DateTime<Utc>,
}

impl From<TransactionRecord> for StatementEntry {
    fn from(record: TransactionRecord) -> Self {
        Self {
            valor: record.amount,
            tipo: record.kind.code().to_string(),
            descricao: record.description,
            data: record.created_at,
        }
    }
}

impl From<Statement> for StatementResponse {
    fn from(statement: Statement) -> Self {
        Self {
            saldo: StatementBalance {
                total: statement.balance,
                data_extrato: statement.served_at,
                limite: statement.limit,
            },
            ultimas_transacoes: statement
                .transactions
                .into_iter()
                .map(StatementEntry::from)
                .collect(),
        }
    }
}
