//! Purge expired sessions action

use super::store_call;
use crate::domains::auth::errors::AuthError;
use crate::kernel::ServerDeps;

/// Remove every session past its TTL, returning how many were removed
pub async fn purge_expired_sessions(deps: &ServerDeps) -> Result<u64, AuthError> {
    store_call(deps.call_timeout, deps.session_store.purge_expired())
        .await
        .map_err(|e| AuthError::from_lookup("purge expired sessions", e))
}
