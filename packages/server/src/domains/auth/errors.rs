//! Error types for the verification session flow.
//!
//! Each collaborator has its own error enum; actions wrap them into
//! [`AuthError`] before anything reaches the HTTP layer.

use std::time::Duration;

use thiserror::Error;

use crate::domains::auth::jwt::TokenError;

/// Session store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record already exists")]
    RecordExists,

    #[error("record not found")]
    RecordNotFound,

    #[error("database query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),

    #[error("database transaction failed: {0}")]
    TransactionFailed(#[source] sqlx::Error),

    #[error("session store did not respond within {0:?}")]
    Timeout(Duration),
}

/// Code dispatcher failures
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("sms provider error: {0}")]
    Twilio(#[from] twilio::TwilioError),

    #[error("sms provider unavailable: {0}")]
    Unavailable(String),

    #[error("sms dispatch did not complete within {0:?}")]
    Timeout(Duration),
}

/// Errors returned by the auth actions
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("session not found")]
    SessionNotFound,

    #[error("invalid verification code")]
    InvalidCode,

    #[error("session creation failed: {0}")]
    SessionCreationFailed(#[source] StoreError),

    /// Dispatch failed after the session was persisted. `compensation`
    /// holds the error from the compensating delete, if that failed too.
    #[error("sending verification code failed: {source}{}", compensation_suffix(.compensation))]
    SendCodeFailed {
        #[source]
        source: DispatchError,
        compensation: Option<StoreError>,
    },

    #[error("session lookup failed: {0}")]
    StorageFailed(#[source] StoreError),

    #[error("token creation failed: {0}")]
    TokenCreationFailed(#[source] TokenError),

    #[error("session id generation failed: {0}")]
    RandomSource(#[source] rand::Error),

    #[error("{operation} cancelled after {timeout:?}")]
    Cancelled {
        operation: &'static str,
        timeout: Duration,
    },
}

fn compensation_suffix(compensation: &Option<StoreError>) -> String {
    match compensation {
        Some(e) => format!("; deleting session also failed: {e}"),
        None => String::new(),
    }
}

impl AuthError {
    /// Errors caused by the request itself. Everything else is a server fault.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::SessionNotFound | Self::InvalidCode
        )
    }

    /// Map a store failure seen while reading or consuming a session.
    pub(crate) fn from_lookup(operation: &'static str, error: StoreError) -> Self {
        match error {
            StoreError::RecordNotFound => Self::SessionNotFound,
            StoreError::Timeout(timeout) => Self::Cancelled { operation, timeout },
            other => Self::StorageFailed(other),
        }
    }
}
