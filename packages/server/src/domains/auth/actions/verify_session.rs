//! Verify session action

use tracing::{error, info, warn};

use super::store_call;
use crate::domains::auth::errors::{AuthError, StoreError};
use crate::domains::auth::validation::{validate_code, validate_session_id};
use crate::kernel::ServerDeps;

/// Check `code` against the session and, on a match, consume the session
/// and issue a token for its phone number.
///
/// A wrong code leaves the session in place. Consumption is a single
/// conditional delete, so concurrent callers with the right code get at
/// most one token between them.
pub async fn verify_session(
    session_id: &str,
    code: i32,
    deps: &ServerDeps,
) -> Result<String, AuthError> {
    validate_session_id(session_id)?;
    validate_code(code)?;

    let session = store_call(deps.call_timeout, deps.session_store.get(session_id))
        .await
        .map_err(|e| AuthError::from_lookup("get session", e))?;

    if session.code != code {
        info!(session_id = %session_id, "verification code mismatch");
        return Err(AuthError::InvalidCode);
    }

    let phone = match store_call(
        deps.call_timeout,
        deps.session_store.consume(session_id, code),
    )
    .await
    {
        Ok(consumed) => consumed.phone,
        // Consumed by a concurrent request or expired since the get
        Err(StoreError::RecordNotFound) => return Err(AuthError::SessionNotFound),
        Err(StoreError::Timeout(timeout)) => {
            return Err(AuthError::Cancelled {
                operation: "consume session",
                timeout,
            })
        }
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "failed to delete verified session");
            session.phone
        }
    };

    let token = deps.token_issuer.create_token(&phone).map_err(|e| {
        error!(session_id = %session_id, error = %e, "failed to issue token");
        AuthError::TokenCreationFailed(e)
    })?;

    info!(session_id = %session_id, phone = %phone, "session verified");
    Ok(token)
}
