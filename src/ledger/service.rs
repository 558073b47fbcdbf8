//! PostgreSQL ledger
//!
//! Balance updates are a single `UPDATE ... SET balance = balance + $delta`
//! inside a transaction. The row lock taken by the UPDATE serialises writers
//! on the same client, and the `clients_balance_check` constraint is checked
//! against the new row, so the limit can't be bypassed by a stale read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::sync::Arc;
use tracing::{debug, info};

use super::error::LedgerError;
use super::models::{
    BalanceSnapshot, ClientId, NewTransaction, STATEMENT_SIZE, Statement, TransactionKind,
    TransactionRecord,
};
use crate::db::Database;
use crate::db::schema::BALANCE_CHECK_CONSTRAINT;

/// SQLSTATE check_violation
const CHECK_VIOLATION: &str = "23514";
/// SQLSTATE numeric_value_out_of_range
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Storage operations the HTTP layer depends on.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Append a transaction and adjust the balance, all or nothing.
    async fn apply_transaction(
        &self,
        client: ClientId,
        transaction: &NewTransaction,
    ) -> Result<BalanceSnapshot, LedgerError>;

    /// Balance, limit and latest transactions from one consistent snapshot.
    async fn statement(&self, client: ClientId) -> Result<Statement, LedgerError>;

    /// Zero every balance and delete all transactions.
    async fn reset(&self) -> Result<(), LedgerError>;

    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), LedgerError>;
}

pub struct PgLedger {
    db: Arc<Database>,
}

impl PgLedger {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerStore for PgLedger {
    async fn apply_transaction(
        &self,
        client: ClientId,
        transaction: &NewTransaction,
    ) -> Result<BalanceSnapshot, LedgerError> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query(
            r#"UPDATE clients SET balance = balance + $2
               WHERE id = $1
               RETURNING balance, "limit""#,
        )
        .bind(client.value())
        .bind(transaction.signed_amount())
        .fetch_optional(&mut *tx)
        .await
        .map_err(classify)?;

        let Some(row) = row else {
            return Err(LedgerError::ClientNotFound(client.value()));
        };
        let snapshot = BalanceSnapshot {
            balance: row.try_get("balance")?,
            limit: row.try_get("limit")?,
        };

        sqlx::query(
            "INSERT INTO transactions (client_id, amount, kind, description)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(client.value())
        .bind(transaction.amount())
        .bind(transaction.kind().code())
        .bind(transaction.description())
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await?;

        debug!(
            client_id = client.value(),
            amount = transaction.signed_amount(),
            balance = snapshot.balance,
            "Transaction committed"
        );
        Ok(snapshot)
    }

    async fn statement(&self, client: ClientId) -> Result<Statement, LedgerError> {
        let mut tx = self.db.pool().begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query(r#"SELECT balance, "limit" FROM clients WHERE id = $1"#)
            .bind(client.value())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(LedgerError::ClientNotFound(client.value()));
        };
        let balance: i64 = row.try_get("balance")?;
        let limit: i64 = row.try_get("limit")?;

        let rows = sqlx::query(
            r#"SELECT amount, kind::TEXT AS kind, description, created_at
               FROM transactions
               WHERE client_id = $1
               ORDER BY created_at DESC, id DESC
               LIMIT $2"#,
        )
        .bind(client.value())
        .bind(STATEMENT_SIZE)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let transactions = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Statement {
            balance,
            limit,
            served_at: Utc::now(),
            transactions,
        })
    }

    async fn reset(&self) -> Result<(), LedgerError> {
        let mut tx = self.db.pool().begin().await?;
        // Client rows first: waits out in-flight applies and holds off new
        // ones, so the DELETE below sees every transaction row that counted
        // toward a balance.
        sqlx::query("UPDATE clients SET balance = 0")
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM transactions")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        info!(deleted_transactions = deleted, "Ledger reset");
        Ok(())
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        self.db.health_check().await?;
        Ok(())
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<TransactionRecord, LedgerError> {
    let code: String = row.try_get("kind")?;
    let kind = TransactionKind::from_code(code.trim()).ok_or_else(|| {
        LedgerError::Database(sqlx::Error::Decode(
            format!("unknown transaction kind '{}'", code).into(),
        ))
    })?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(TransactionRecord {
        amount: row.try_get("amount")?,
        kind,
        description: row.try_get("description")?,
        created_at,
    })
}

/// Separate storage-level domain rejections from infrastructure failures.
fn classify(err: sqlx::Error) -> LedgerError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(CHECK_VIOLATION) if db_err.constraint() == Some(BALANCE_CHECK_CONSTRAINT) => {
                return LedgerError::LimitExceeded;
            }
            Some(NUMERIC_OUT_OF_RANGE) => return LedgerError::BalanceOverflow,
            _ => {}
        }
    }
    LedgerError::Database(err)
}
