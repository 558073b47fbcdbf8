//! Ledger table definitions
//!
//! The balance invariant lives here, as a CHECK constraint evaluated by
//! PostgreSQL against every written `clients` row. Application code never
//! compares balance and limit itself.

use sqlx::PgPool;

use crate::config::ClientSeed;

/// Name of the constraint that rejects `balance < -limit`.
pub const BALANCE_CHECK_CONSTRAINT: &str = "clients_balance_check";

pub const CREATE_CLIENTS: &str = r#"
CREATE TABLE IF NOT EXISTS clients (
    id      INTEGER PRIMARY KEY,
    "limit" BIGINT  NOT NULL CHECK ("limit" >= 0),
    balance BIGINT  NOT NULL DEFAULT 0,
    CONSTRAINT clients_balance_check CHECK (balance >= -"limit")
)
"#;

pub const CREATE_TRANSACTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id          BIGSERIAL   PRIMARY KEY,
    client_id   INTEGER     NOT NULL REFERENCES clients(id),
    amount      BIGINT      NOT NULL CHECK (amount > 0),
    kind        CHAR(1)     NOT NULL CHECK (kind IN ('c', 'd')),
    description VARCHAR(10) NOT NULL CHECK (char_length(description) >= 1),
    created_at  TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
)
"#;

pub const CREATE_TRANSACTIONS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_transactions_client_created
    ON transactions (client_id, created_at DESC, id DESC)
"#;

/// Create both tables and the statement index. Idempotent.
pub async fn create_tables(pool: &PgPool) -> Result<(), sqlx::Error> {
    for ddl in [CREATE_CLIENTS, CREATE_TRANSACTIONS, CREATE_TRANSACTIONS_INDEX] {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

/// Insert configured clients with a zero balance. Existing rows (and their
/// balances) are left untouched.
pub async fn seed_clients(pool: &PgPool, clients: &[ClientSeed]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for seed in clients {
        sqlx::query(
            r#"INSERT INTO clients (id, "limit", balance) VALUES ($1, $2, 0)
               ON CONFLICT (id) DO NOTHING"#,
        )
        .bind(seed.id)
        .bind(seed.limit)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}
