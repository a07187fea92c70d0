use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::common::ApiError;

/// Wrap the bare 408 produced by the request timeout layer in the error envelope
///
/// Handlers never answer 408 themselves, so any 408 seen here came from the layer.
pub async fn timeout_envelope(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }

    warn!("Request exceeded timeout");
    ApiError::request_timeout().into_response()
}
