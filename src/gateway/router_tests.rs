//! Router tests
//!
//! Drive the full axum router with an in-memory store that applies the same
//! limit rule as the PostgreSQL constraint.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::build_router;
use super::state::AppState;
use crate::ledger::{
    BalanceSnapshot, ClientId, ClientRegistry, LedgerError, LedgerStore, NewTransaction,
    STATEMENT_SIZE, Statement, TransactionRecord,
};

struct Account {
    limit: i64,
    balance: i64,
    /// Oldest first
    history: Vec<TransactionRecord>,
}

struct MemoryLedger {
    accounts: Mutex<HashMap<i32, Account>>,
}

impl MemoryLedger {
    fn new(clients: &[(i32, i64)]) -> Self {
        let accounts = clients
            .iter()
            .map(|&(id, limit)| {
                (
                    id,
                    Account {
                        limit,
                        balance: 0,
                        history: Vec::new(),
                    },
                )
            })
            .collect();
        Self {
            accounts: Mutex::new(accounts),
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn apply_transaction(
        &self,
        client: ClientId,
        transaction: &NewTransaction,
    ) -> Result<BalanceSnapshot, LedgerError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(&client.value())
            .ok_or(LedgerError::ClientNotFound(client.value()))?;

        let balance = account
            .balance
            .checked_add(transaction.signed_amount())
            .ok_or(LedgerError::BalanceOverflow)?;
        if balance < -account.limit {
            return Err(LedgerError::LimitExceeded);
        }

        account.balance = balance;
        account.history.push(TransactionRecord {
            amount: transaction.amount(),
            kind: transaction.kind(),
            description: transaction.description().to_string(),
            created_at: Utc::now(),
        });
        Ok(BalanceSnapshot {
            balance,
            limit: account.limit,
        })
    }

    async fn statement(&self, client: ClientId) -> Result<Statement, LedgerError> {
        let accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get(&client.value())
            .ok_or(LedgerError::ClientNotFound(client.value()))?;
        Ok(Statement {
            balance: account.balance,
            limit: account.limit,
            served_at: Utc::now(),
            transactions: account
                .history
                .iter()
                .rev()
                .take(STATEMENT_SIZE as usize)
                .cloned()
                .collect(),
        })
    }

    async fn reset(&self) -> Result<(), LedgerError> {
        let mut accounts = self.accounts.lock().unwrap();
        for account in accounts.values_mut() {
            account.balance = 0;
            account.history.clear();
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        Ok(())
    }
}

/// Store whose every call fails like an unreachable database.
struct UnavailableLedger;

#[async_trait]
impl LedgerStore for UnavailableLedger {
    async fn apply_transaction(
        &self,
        _client: ClientId,
        _transaction: &NewTransaction,
    ) -> Result<BalanceSnapshot, LedgerError> {
        Err(LedgerError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn statement(&self, _client: ClientId) -> Result<Statement, LedgerError> {
        Err(LedgerError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn reset(&self) -> Result<(), LedgerError> {
        Err(LedgerError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        Err(LedgerError::Database(sqlx::Error::PoolTimedOut))
    }
}

// ========================================================================
// Helpers
// ========================================================================

fn app_with(store: Arc<dyn LedgerStore>) -> Router {
    let state = AppState::new(store, ClientRegistry::new(1..=5));
    build_router(Arc::new(state))
}

fn app() -> Router {
    app_with(Arc::new(MemoryLedger::new(&[
        (1, 1000),
        (2, 80_000),
        (3, 1_000_000),
        (4, 10_000_000),
        (5, 500_000),
    ])))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn post_transaction(app: &Router, id: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(format!("/clientes/{}/transacoes", id))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn tx(valor: i64, tipo: &str, descricao: &str) -> String {
    json!({"valor": valor, "tipo": tipo, "descricao": descricao}).to_string()
}

// ========================================================================
// Transactions
// ========================================================================

#[tokio::test]
async fn test_debit_credit_walkthrough() {
    let app = app();

    let (status, body) = post_transaction(&app, "1", &tx(500, "d", "compra")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"saldo": -500, "limite": 1000}));

    let (status, body) = post_transaction(&app, "1", &tx(600, "d", "compra")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "LIMIT_EXCEEDED");

    let (_, statement) = get_json(&app, "/clientes/1/extrato").await;
    assert_eq!(statement["saldo"]["total"], -500);
    assert_eq!(statement["ultimas_transacoes"].as_array().unwrap().len(), 1);

    let (status, body) = post_transaction(&app, "1", &tx(2000, "c", "deposito")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"saldo": 1500, "limite": 1000}));
}

#[tokio::test]
async fn test_debit_down_to_exact_limit_is_accepted() {
    let app = app();
    let (status, body) = post_transaction(&app, "1", &tx(1000, "d", "tudo")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saldo"], -1000);

    let (status, _) = post_transaction(&app, "1", &tx(1, "d", "mais")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_invalid_descriptions_rejected() {
    let app = app();
    for descricao in ["", "12345678901"] {
        for tipo in ["c", "d", "x"] {
            let (status, _) = post_transaction(&app, "2", &tx(10, tipo, descricao)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{:?}", descricao);
        }
    }

    let body = json!({"valor": 10, "tipo": "c", "descricao": null}).to_string();
    let (status, _) = post_transaction(&app, "2", &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_multibyte_description_of_ten_characters_accepted() {
    let app = app();
    let (status, _) = post_transaction(&app, "2", &tx(10, "c", "çãoçãoçãoçã")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post_transaction(&app, "2", &tx(10, "c", "pão de açú")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_nul_in_description_is_validation_error() {
    let app = app();
    // JSON escape, so the body itself is well-formed
    let body = r#"{"valor": 10, "tipo": "c", "descricao": "a\u0000b"}"#;
    let (status, body) = post_transaction(&app, "2", body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "INVALID_DESCRIPTION");

    let (_, statement) = get_json(&app, "/clientes/2/extrato").await;
    assert_eq!(statement["saldo"]["total"], 0);
    assert_eq!(statement["ultimas_transacoes"], json!([]));
}

#[tokio::test]
async fn test_invalid_type_rejected() {
    let app = app();
    for tipo in ["x", "C", "credito", ""] {
        let (status, body) = post_transaction(&app, "3", &tx(10, tipo, "ok")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "INVALID_TYPE");
    }
}

#[tokio::test]
async fn test_invalid_amounts_rejected() {
    let app = app();
    let bodies = [
        r#"{"valor": 0, "tipo": "c", "descricao": "ok"}"#,
        r#"{"valor": -5, "tipo": "c", "descricao": "ok"}"#,
        r#"{"valor": 1.5, "tipo": "d", "descricao": "ok"}"#,
        r#"{"valor": "10", "tipo": "c", "descricao": "ok"}"#,
        r#"{"valor": null, "tipo": "c", "descricao": "ok"}"#,
        r#"{"tipo": "c", "descricao": "ok"}"#,
        r#"{"valor": 99999999999999999999, "tipo": "c", "descricao": "ok"}"#,
    ];
    for body in bodies {
        let (status, _) = post_transaction(&app, "3", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
    }

    let (_, statement) = get_json(&app, "/clientes/3/extrato").await;
    assert_eq!(statement["saldo"]["total"], 0);
    assert_eq!(statement["ultimas_transacoes"], json!([]));
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let app = app();
    let (status, body) = post_transaction(&app, "1", "{not json").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "INVALID_BODY");
}

#[tokio::test]
async fn test_unknown_client_is_not_found_regardless_of_body() {
    let app = app();
    for id in ["0", "6", "-1", "abc", "1.5", "99999999999"] {
        let (status, body) = post_transaction(&app, id, &tx(10, "c", "ok")).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "id {}", id);
        assert_eq!(body["error"], "CLIENT_NOT_FOUND");

        let (status, _) = post_transaction(&app, id, "{not json").await;
        assert_eq!(status, StatusCode::NOT_FOUND, "id {}", id);

        let (status, _) = post_transaction(&app, id, &tx(10, "x", "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "id {}", id);

        let (status, _) = get_json(&app, &format!("/clientes/{}/extrato", id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "id {}", id);
    }
}

#[tokio::test]
async fn test_client_in_registry_but_missing_from_store_is_not_found() {
    let app = app_with(Arc::new(MemoryLedger::new(&[(1, 1000)])));
    let (status, _) = post_transaction(&app, "2", &tx(10, "c", "ok")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get_json(&app, "/clientes/2/extrato").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ========================================================================
// Statements
// ========================================================================

#[tokio::test]
async fn test_statement_empty_history() {
    let app = app();
    let (status, body) = get_json(&app, "/clientes/4/extrato").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saldo"]["total"], 0);
    assert_eq!(body["saldo"]["limite"], 10_000_000);
    assert!(body["saldo"]["data_extrato"].is_string());
    assert_eq!(body["ultimas_transacoes"], json!([]));
}

#[tokio::test]
async fn test_statement_newest_first_and_capped() {
    let app = app();
    for i in 1..=12 {
        let (status, _) = post_transaction(&app, "5", &tx(i, "c", &format!("t{}", i))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get_json(&app, "/clientes/5/extrato").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saldo"]["total"], (1..=12).sum::<i64>());

    let entries = body["ultimas_transacoes"].as_array().unwrap();
    assert_eq!(entries.len(), STATEMENT_SIZE as usize);
    assert_eq!(entries[0]["descricao"], "t12");
    assert_eq!(entries[0]["valor"], 12);
    assert_eq!(entries[0]["tipo"], "c");
    assert_eq!(entries[9]["descricao"], "t3");
}

// ========================================================================
// Reset / Health / Failures
// ========================================================================

#[tokio::test]
async fn test_reset_clears_balances_and_history() {
    let app = app();
    post_transaction(&app, "1", &tx(100, "d", "a")).await;
    post_transaction(&app, "2", &tx(100, "c", "b")).await;

    let request = Request::builder().uri("/reset").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Resetado");

    for id in 1..=5 {
        let (_, statement) = get_json(&app, &format!("/clientes/{}/extrato", id)).await;
        assert_eq!(statement["saldo"]["total"], 0);
        assert_eq!(statement["ultimas_transacoes"], json!([]));
    }
}

#[tokio::test]
async fn test_infrastructure_failures_are_generic() {
    let app = app_with(Arc::new(UnavailableLedger));

    let (status, body) = post_transaction(&app, "1", &tx(10, "c", "ok")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");

    let (status, body) = get_json(&app, "/clientes/1/extrato").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "INTERNAL_ERROR");

    let request = Request::builder().uri("/reset").body(Body::empty()).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validation_still_runs_when_store_is_down() {
    let app = app_with(Arc::new(UnavailableLedger));
    let (status, _) = post_transaction(&app, "1", &tx(10, "c", "")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = post_transaction(&app, "9", &tx(10, "c", "ok")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json(&app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get_json(&app_with(Arc::new(UnavailableLedger)), "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
}

#[tokio::test]
async fn test_openapi_served() {
    let (status, body) = get_json(&app(), "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/clientes/{id}/transacoes"].is_object());
}
