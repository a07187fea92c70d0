use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::common::ApiError;
use crate::domains::auth::TokenError;
use crate::kernel::BaseTokenIssuer;

/// Authenticated user information from JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub phone: String,
}

/// Why a request carries no `AuthUser`
#[derive(Clone, Debug)]
pub struct AuthFailure(pub TokenError);

/// JWT authentication middleware
///
/// Extracts JWT token from Authorization header, verifies it, and adds AuthUser to request extensions.
/// If no token or invalid token, request continues without AuthUser (public access); routes that
/// need a user take the `AuthUser` extractor, which rejects with 401.
pub async fn jwt_auth_middleware(
    token_issuer: Arc<dyn BaseTokenIssuer>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    match extract_auth_user(request.headers(), token_issuer.as_ref()) {
        Ok(user) => {
            debug!(phone = %user.phone, "Authenticated user");
            request.extensions_mut().insert(user);
        }
        Err(e) => {
            debug!(reason = %e, "No valid authentication token");
            request.extensions_mut().insert(AuthFailure(e));
        }
    }

    next.run(request).await
}

/// Extract and verify JWT token from request headers
fn extract_auth_user(
    headers: &HeaderMap,
    token_issuer: &dyn BaseTokenIssuer,
) -> Result<AuthUser, TokenError> {
    let auth_str = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .ok_or(TokenError::MissingToken)?;

    // Extract token (handle both "Bearer <token>" and raw token)
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str).trim();

    let phone = token_issuer.parse_and_validate(token)?;
    Ok(AuthUser { phone })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let reason = parts
            .extensions
            .get::<AuthFailure>()
            .map(|failure| failure.0.clone())
            .unwrap_or(TokenError::MissingToken);
        Err(reason.into())
    }
}
