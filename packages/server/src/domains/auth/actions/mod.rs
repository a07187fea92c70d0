//! Auth domain actions - business logic functions
//!
//! Actions are async functions called directly from HTTP handlers and the
//! scheduler. They only talk to infrastructure through `ServerDeps`.

mod create_session;
mod purge_expired;
mod verify_session;

pub use create_session::create_session;
pub use purge_expired::purge_expired_sessions;
pub use verify_session::verify_session;

use std::future::Future;
use std::time::Duration;

use crate::domains::auth::errors::{DispatchError, StoreError};

/// Bound a store call by the configured call timeout
pub(crate) async fn store_call<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(StoreError::Timeout(timeout)))
}

/// Bound a dispatcher call by the configured call timeout
pub(crate) async fn dispatch_call(
    timeout: Duration,
    call: impl Future<Output = Result<(), DispatchError>>,
) -> Result<(), DispatchError> {
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(DispatchError::Timeout(timeout)))
}
