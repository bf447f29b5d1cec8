//! Ledger Error Types
//!
//! One closed set of failures shared by the session store, the transfer
//! engine and the HTTP boundary. Every variant carries a status class so the
//! boundary can render it without inspecting messages.

use thiserror::Error;

use crate::money::MoneyError;

/// Generic message shown to clients for every internal failure
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Status classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    BadRequest,
    Conflict,
    Unauthorized,
    Internal,
}

impl ErrorClass {
    /// HTTP status code for this class
    pub fn http_status(self) -> u16 {
        match self {
            ErrorClass::NotFound => 404,
            ErrorClass::BadRequest => 400,
            ErrorClass::Conflict => 409,
            ErrorClass::Unauthorized => 401,
            ErrorClass::Internal => 500,
        }
    }
}

/// Ledger error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // === Account Errors ===
    #[error("Origin account not found")]
    NoOriginAccount,

    #[error("Destination account not found")]
    NoDestinationAccount,

    #[error("No account with this cpf")]
    UnknownAccount,

    // === Transfer Errors ===
    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Amount too large, resulting balance would overflow")]
    AmountTooLarge,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Invalid destination account id")]
    BadDestinationId,

    #[error("Origin and destination accounts are the same")]
    SameAccount,

    // === Request Errors ===
    #[error("Invalid cpf, expected format XXX.XXX-XX")]
    InvalidCpf,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // === Session Errors ===
    #[error("Missing, invalid or expired token")]
    Unauthorized,

    #[error("Wrong secret")]
    WrongSecret,

    #[error("Token collision, try again")]
    TryAgain,

    // === System Errors ===
    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Status classification
    pub fn class(&self) -> ErrorClass {
        match self {
            LedgerError::NoOriginAccount
            | LedgerError::NoDestinationAccount
            | LedgerError::UnknownAccount => ErrorClass::NotFound,
            LedgerError::InsufficientFunds
            | LedgerError::AmountTooLarge
            | LedgerError::InvalidAmount(_)
            | LedgerError::ZeroAmount
            | LedgerError::BadDestinationId
            | LedgerError::SameAccount
            | LedgerError::InvalidCpf
            | LedgerError::InvalidRequest(_) => ErrorClass::BadRequest,
            LedgerError::TryAgain => ErrorClass::Conflict,
            LedgerError::Unauthorized | LedgerError::WrongSecret => ErrorClass::Unauthorized,
            LedgerError::TokenGeneration(_)
            | LedgerError::Database(_)
            | LedgerError::Internal(_) => ErrorClass::Internal,
        }
    }

    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NoOriginAccount => "NO_ORIGIN_ACCOUNT",
            LedgerError::NoDestinationAccount => "NO_DESTINATION_ACCOUNT",
            LedgerError::UnknownAccount => "UNKNOWN_ACCOUNT",
            LedgerError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            LedgerError::AmountTooLarge => "AMOUNT_TOO_LARGE",
            LedgerError::InvalidAmount(_) => "INVALID_AMOUNT",
            LedgerError::ZeroAmount => "ZERO_AMOUNT",
            LedgerError::BadDestinationId => "BAD_DESTINATION_ID",
            LedgerError::SameAccount => "SAME_ACCOUNT",
            LedgerError::InvalidCpf => "INVALID_CPF",
            LedgerError::InvalidRequest(_) => "INVALID_REQUEST",
            LedgerError::Unauthorized => "UNAUTHORIZED",
            LedgerError::WrongSecret => "WRONG_SECRET",
            LedgerError::TryAgain => "TRY_AGAIN",
            LedgerError::TokenGeneration(_)
            | LedgerError::Database(_)
            | LedgerError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        self.class().http_status()
    }

    /// Message safe to show to a client. Internal causes are never exposed.
    pub fn public_message(&self) -> String {
        match self.class() {
            ErrorClass::Internal => INTERNAL_ERROR_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }

    /// The caller may repeat the same request and expect a different outcome
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::TryAgain)
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::Database(e.to_string())
    }
}

impl From<MoneyError> for LedgerError {
    fn from(e: MoneyError) -> Self {
        match e {
            MoneyError::Overflow => LedgerError::AmountTooLarge,
            other => LedgerError::InvalidAmount(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::InsufficientFunds.code(), "INSUFFICIENT_FUNDS");
        assert_eq!(LedgerError::TryAgain.code(), "TRY_AGAIN");
        assert_eq!(LedgerError::Database("x".into()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(LedgerError::NoOriginAccount.http_status(), 404);
        assert_eq!(LedgerError::NoDestinationAccount.http_status(), 404);
        assert_eq!(LedgerError::InsufficientFunds.http_status(), 400);
        assert_eq!(LedgerError::ZeroAmount.http_status(), 400);
        assert_eq!(LedgerError::AmountTooLarge.http_status(), 400);
        assert_eq!(LedgerError::TryAgain.http_status(), 409);
        assert_eq!(LedgerError::Unauthorized.http_status(), 401);
        assert_eq!(LedgerError::Internal("boom".into()).http_status(), 500);
    }

    #[test]
    fn test_internal_message_is_generic() {
        let db = LedgerError::Database("connection refused on 10.0.0.3".into());
        let tok = LedgerError::TokenGeneration("rng".into());
        assert_eq!(db.public_message(), INTERNAL_ERROR_MESSAGE);
        assert_eq!(tok.public_message(), INTERNAL_ERROR_MESSAGE);
        assert_eq!(
            LedgerError::InsufficientFunds.public_message(),
            "Insufficient funds"
        );
    }

    #[test]
    fn test_money_error_mapping() {
        assert_eq!(
            LedgerError::from(MoneyError::Overflow),
            LedgerError::AmountTooLarge
        );
        assert_eq!(
            LedgerError::from(MoneyError::PrecisionOverflow { provided: 3 }).class(),
            ErrorClass::BadRequest
        );
    }

    #[test]
    fn test_only_collision_is_retryable() {
        assert!(LedgerError::TryAgain.is_retryable());
        assert!(!LedgerError::InsufficientFunds.is_retryable());
    }
}
