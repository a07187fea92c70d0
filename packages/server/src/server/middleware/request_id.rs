//! Request correlation ids.
//!
//! An incoming `x-request-id` is stripped of line breaks, trimmed and capped at
//! 64 characters. A missing, blank or non-ASCII id is replaced with a generated
//! `req_<16 hex>` id. The id is echoed on the response and recorded on the
//! request span, so every log line of a request carries it.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use rand::Rng;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 64;

/// Generates `req_` followed by 8 random bytes in hex
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestHexId;

impl MakeRequestId for MakeRequestHexId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let bytes: [u8; 8] = rand::thread_rng().gen();
        HeaderValue::from_str(&format!("req_{}", hex::encode(bytes)))
            .ok()
            .map(RequestId::new)
    }
}

fn sanitize(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    let capped: String = cleaned.trim().chars().take(MAX_REQUEST_ID_LEN).collect();
    let capped = capped.trim_end();

    if capped.is_empty() {
        None
    } else {
        Some(capped.to_string())
    }
}

/// Normalize a client-supplied request id before it is accepted
///
/// Runs ahead of `SetRequestIdLayer`, which keeps any id already present and
/// only generates one when the header is missing.
pub async fn sanitize_request_id(mut request: Request<Body>, next: Next) -> Response {
    let sanitized = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(sanitize)
        .and_then(|id| HeaderValue::from_str(&id).ok());

    match sanitized {
        Some(value) => {
            request.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        None => {
            request.headers_mut().remove(REQUEST_ID_HEADER);
        }
    }

    next.run(request).await
}

/// Span for `TraceLayer`, tagged with the request id
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
