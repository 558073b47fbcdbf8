use thiserror::Error;

/// Ledger error types
#[derive(Error, Debug)]
pub enum LedgerError {
    // === Validation Errors ===
    #[error("Amount must be a positive integer")]
    InvalidAmount,

    #[error("Description must have between 1 and 10 printable characters")]
    InvalidDescription,

    #[error("Invalid transaction type: {0}")]
    InvalidKind(String),

    // === Identity Errors ===
    #[error("Client not found: {0}")]
    ClientNotFound(i32),

    // === Domain Rejections ===
    #[error("Insufficient limit for this transaction")]
    LimitExceeded,

    #[error("Balance would overflow")]
    BalanceOverflow,

    // === System Errors ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Coarse classification used by the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    DomainRejection,
    Infrastructure,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount
            | LedgerError::InvalidDescription
            | LedgerError::InvalidKind(_) => ErrorKind::Validation,
            LedgerError::ClientNotFound(_) => ErrorKind::NotFound,
            LedgerError::LimitExceeded | LedgerError::BalanceOverflow => {
                ErrorKind::DomainRejection
            }
            LedgerError::Database(_) => ErrorKind::Infrastructure,
        }
    }

    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount => "INVALID_AMOUNT",
            LedgerError::InvalidDescription => "INVALID_DESCRIPTION",
            LedgerError::InvalidKind(_) => "INVALID_TYPE",
            LedgerError::ClientNotFound(_) => "CLIENT_NOT_FOUND",
            LedgerError::LimitExceeded => "LIMIT_EXCEEDED",
            LedgerError::BalanceOverflow => "BALANCE_OVERFLOW",
            LedgerError::Database(_) => "INTERNAL_ERROR",
        }
    }
}
