//! Create session action

use tracing::{error, info, warn};

use super::{dispatch_call, store_call};
use crate::domains::auth::code::generate_session_id;
use crate::domains::auth::errors::{AuthError, StoreError};
use crate::domains::auth::models::Session;
use crate::domains::auth::validation::validate_phone;
use crate::kernel::ServerDeps;

/// Start a verification session for `phone` and send it a one-time code.
///
/// Returns only the session id; the code travels out of band. If the code
/// cannot be dispatched the session is deleted again before returning
/// `SendCodeFailed`, so no session outlives a failed send.
pub async fn create_session(phone: &str, deps: &ServerDeps) -> Result<String, AuthError> {
    validate_phone(phone)?;

    let session_id = generate_session_id()?;
    let code = deps.code_generator.generate_code();
    let session = Session::new(session_id.clone(), phone.to_string(), code);

    match store_call(deps.call_timeout, deps.session_store.create(&session)).await {
        Ok(()) => {}
        Err(StoreError::Timeout(timeout)) => {
            // The insert may still land after we stop waiting
            if let Err(e) = compensate(&session_id, deps).await {
                warn!(session_id = %session_id, error = %e, "cleanup after cancelled create failed");
            }
            return Err(AuthError::Cancelled {
                operation: "create session",
                timeout,
            });
        }
        Err(e) => {
            error!(phone = %phone, error = %e, "failed to persist session");
            return Err(AuthError::SessionCreationFailed(e));
        }
    }

    if let Err(source) = dispatch_call(
        deps.call_timeout,
        deps.code_dispatcher.send_code(phone, code),
    )
    .await
    {
        error!(session_id = %session_id, phone = %phone, error = %source, "failed to send verification code");

        let compensation = match compensate(&session_id, deps).await {
            Ok(()) => None,
            Err(e) => {
                error!(session_id = %session_id, error = %e, "compensating delete failed");
                Some(e)
            }
        };

        return Err(AuthError::SendCodeFailed {
            source,
            compensation,
        });
    }

    info!(session_id = %session_id, phone = %phone, "verification code sent");
    Ok(session_id)
}

async fn compensate(session_id: &str, deps: &ServerDeps) -> Result<(), StoreError> {
    match store_call(deps.call_timeout, deps.session_store.delete(session_id)).await {
        // Nothing was persisted, which is the state we want
        Err(StoreError::RecordNotFound) => Ok(()),
        other => other,
    }
}
