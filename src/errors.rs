//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. Each variant maps
//! to a stable machine-readable code and an HTTP status, so handlers never
//! match on message strings.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

use crate::entities::{CycleStatus, GroupStatus};
use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Invalid group composition: {reason}")]
    InvalidComposition { reason: String },

    #[error("Group not found: {id}")]
    GroupNotFound { id: String },

    #[error("A group with code {code} is already registered")]
    GroupExists { code: String },

    #[error("Group is not validated (current status: {status:?})")]
    GroupNotValidated { status: GroupStatus },

    #[error("President identity fields cannot be modified after registration")]
    PresidentImmutable,

    #[error("No membership record for group {group_id}")]
    MembershipNotFound { group_id: i64 },

    #[error("Group {group_id} already has an investment cycle")]
    CycleExists { group_id: i64 },

    #[error("No investment cycle for group {group_id}")]
    CycleNotFound { group_id: i64 },

    #[error("Investment cycle is not active (current status: {status:?})")]
    CycleNotActive { status: CycleStatus },

    #[error("No scheduled investment day matches {date}")]
    InvalidInvestmentDate { date: NaiveDate },

    #[error("A contribution for {date} was already recorded")]
    DuplicateContribution { date: NaiveDate },

    #[error("Wrong contribution amount: expected {expected}, got {got}")]
    WrongAmount { expected: i64, got: i64 },

    #[error("No schedule day with index {day_index}")]
    DayNotFound { day_index: i32 },

    #[error("Wallet balance {balance} cannot cover a debit of {debit}")]
    WalletUnderflow { balance: i64, debit: i64 },

    #[error("Payment transaction not found: {reference}")]
    TransactionNotFound { reference: String },

    #[error("Checkout creation failed for {reference}: {message}")]
    CheckoutFailed { reference: String, message: String },

    #[error("Verification code does not match")]
    VerificationCodeInvalid,

    #[error("Verification code has expired")]
    VerificationCodeExpired,
}

impl Error {
    /// Stable machine-readable code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::EnvVar(_) => "ENV_ERROR",
            Self::Gateway(_) => "GATEWAY_ERROR",
            Self::InvalidComposition { .. } => "INVALID_COMPOSITION",
            Self::GroupNotFound { .. } => "GROUP_NOT_FOUND",
            Self::GroupExists { .. } => "GROUP_EXISTS",
            Self::GroupNotValidated { .. } => "GROUP_NOT_VALIDATED",
            Self::PresidentImmutable => "PRESIDENT_IMMUTABLE",
            Self::MembershipNotFound { .. } => "MEMBERSHIP_NOT_FOUND",
            Self::CycleExists { .. } => "CYCLE_EXISTS",
            Self::CycleNotFound { .. } => "CYCLE_NOT_FOUND",
            Self::CycleNotActive { .. } => "CYCLE_NOT_ACTIVE",
            Self::InvalidInvestmentDate { .. } => "INVALID_INVESTMENT_DATE",
            Self::DuplicateContribution { .. } => "DUPLICATE_CONTRIBUTION",
            Self::WrongAmount { .. } => "WRONG_AMOUNT",
            Self::DayNotFound { .. } => "DAY_NOT_FOUND",
            Self::WalletUnderflow { .. } => "WALLET_UNDERFLOW",
            Self::TransactionNotFound { .. } => "TRANSACTION_NOT_FOUND",
            Self::CheckoutFailed { .. } => "CHECKOUT_FAILED",
            Self::VerificationCodeInvalid => "CODE_INVALID",
            Self::VerificationCodeExpired => "CODE_EXPIRED",
        }
    }

    /// HTTP status this error maps to at the request boundary.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::EnvVar(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Gateway(_) | Self::CheckoutFailed { .. } => StatusCode::BAD_GATEWAY,
            Self::GroupNotFound { .. }
            | Self::MembershipNotFound { .. }
            | Self::CycleNotFound { .. }
            | Self::DayNotFound { .. }
            | Self::TransactionNotFound { .. } => StatusCode::NOT_FOUND,
            Self::GroupNotValidated { .. } => StatusCode::FORBIDDEN,
            Self::GroupExists { .. } => StatusCode::CONFLICT,
            Self::InvalidComposition { .. }
            | Self::PresidentImmutable
            | Self::CycleExists { .. }
            | Self::CycleNotActive { .. }
            | Self::InvalidInvestmentDate { .. }
            | Self::DuplicateContribution { .. }
            | Self::WrongAmount { .. }
            | Self::WalletUnderflow { .. }
            | Self::VerificationCodeInvalid
            | Self::VerificationCodeExpired => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal detail stays in the logs, never in the response body.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal error while handling request");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "success": false,
            "message": message,
            "code": self.code(),
        });

        (status, Json(body)).into_response()
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let err = Error::WrongAmount {
            expected: 6000,
            got: 500,
        };
        assert_eq!(err.code(), "WRONG_AMOUNT");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = Error::GroupNotValidated {
            status: GroupStatus::Pending,
        };
        assert_eq!(err.code(), "GROUP_NOT_VALIDATED");
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err = Error::TransactionNotFound {
            reference: "PAY-x".to_string(),
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_detail_is_suppressed() {
        let err = Error::Config {
            message: "secret path /etc/creds".to_string(),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
