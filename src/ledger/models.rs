//! Ledger domain types

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;

use super::error::LedgerError;
use crate::config::ClientSeed;

/// Maximum description length, counted in characters (not bytes).
pub const MAX_DESCRIPTION_CHARS: usize = 10;

/// Number of transactions returned in a statement.
pub const STATEMENT_SIZE: i64 = 10;

/// A client id known to belong to the provisioned set.
///
/// Only obtainable through [`ClientRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(i32);

impl ClientId {
    pub fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of client ids fixed at deploy time.
#[derive(Debug, Clone)]
pub struct ClientRegistry {
    ids: BTreeSet<i32>,
}

impl ClientRegistry {
    pub fn new(ids: impl IntoIterator<Item = i32>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn from_seeds(seeds: &[ClientSeed]) -> Self {
        Self::new(seeds.iter().map(|s| s.id))
    }

    pub fn lookup(&self, id: i32) -> Option<ClientId> {
        self.ids.contains(&id).then_some(ClientId(id))
    }

    /// Resolve a raw path segment. Non-numeric input is simply unknown.
    pub fn resolve(&self, raw: &str) -> Option<ClientId> {
        raw.parse::<i32>().ok().and_then(|id| self.lookup(id))
    }

    pub fn ids(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.ids.iter().map(|&id| ClientId(id))
    }
}

/// Transaction direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    /// Wire and storage code: `c` or `d`
    pub fn code(self) -> &'static str {
        match self {
            TransactionKind::Credit => "c",
            TransactionKind::Debit => "d",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "c" => Some(TransactionKind::Credit),
            "d" => Some(TransactionKind::Debit),
            _ => None,
        }
    }
}

/// A validated transaction ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    amount: i64,
    kind: TransactionKind,
    description: String,
}

impl NewTransaction {
    /// Validate magnitude, then description, then direction.
    pub fn new(amount: i64, kind: &str, description: &str) -> Result<Self, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let len = description.chars().count();
        if len == 0 || len > MAX_DESCRIPTION_CHARS {
            return Err(LedgerError::InvalidDescription);
        }
        // PostgreSQL text can't hold NUL; other control chars are refused too
        if description.chars().any(char::is_control) {
            return Err(LedgerError::InvalidDescription);
        }
        let kind = TransactionKind::from_code(kind)
            .ok_or_else(|| LedgerError::InvalidKind(kind.to_string()))?;

        Ok(Self {
            amount,
            kind,
            description: description.to_string(),
        })
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Balance delta: positive for credits, negative for debits.
    pub fn signed_amount(&self) -> i64 {
        match self.kind {
            TransactionKind::Credit => self.amount,
            TransactionKind::Debit => -self.amount,
        }
    }
}

/// Balance and limit after a committed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub balance: i64,
    pub limit: i64,
}

/// A persisted transaction as shown in a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub amount: i64,
    pub kind: TransactionKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Balance, limit and most recent transactions read from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub balance: i64,
    pub limit: i64,
    /// When the statement was served, not a transaction time
    pub served_at: DateTime<Utc>,
    /// Newest first
    pub transactions: Vec<TransactionRecord>,
}
