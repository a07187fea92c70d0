//! JSON response envelope and HTTP error mapping.
//!
//! Success: `{"success":true,"data":{..}}`
//! Failure: `{"success":false,"error":{"code":"..","details":".."}}`

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domains::auth::{AuthError, TokenError};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

/// Error returned by handlers. Only `code` and `details` reach the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    details: Option<String>,
}

impl ApiError {
    pub const fn new(status: StatusCode, code: &'static str, details: Option<String>) -> Self {
        Self {
            status,
            code,
            details,
        }
    }

    pub fn bad_request(code: &'static str, details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, Some(details.into()))
    }

    pub const fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            None,
        )
    }

    /// The request outlived `REQUEST_TIMEOUT_SECS`
    pub fn request_timeout() -> Self {
        Self::new(
            StatusCode::REQUEST_TIMEOUT,
            "request_timeout",
            Some("request took too long to complete".to_string()),
        )
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: self.code.to_string(),
                details: self.details,
            }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("invalid_request", rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match &error {
            AuthError::InvalidInput(details) => Self::bad_request("invalid_input", details.clone()),
            AuthError::InvalidCode => Self::bad_request("invalid_code", error.to_string()),
            AuthError::SessionNotFound => Self::new(
                StatusCode::NOT_FOUND,
                "session_not_found",
                Some(error.to_string()),
            ),
            AuthError::SendCodeFailed { .. } => {
                tracing::error!(error = %error, "request failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "send_code_failed",
                    Some("could not send verification code".to_string()),
                )
            }
            _ => {
                tracing::error!(error = %error, "request failed");
                Self::internal()
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(error: TokenError) -> Self {
        let code = match error {
            TokenError::MissingToken => "missing_token",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::InvalidAlgorithm => "invalid_algorithm",
            TokenError::MissingClaims => "missing_claims",
            TokenError::Expired => "token_expired",
            _ => "invalid_token",
        };
        Self::new(StatusCode::UNAUTHORIZED, code, Some(error.to_string()))
    }
}
