//! Server dependencies for actions (using traits for testability)
//!
//! This module provides the central dependency container used by the auth actions.
//! All external services use trait abstractions to enable testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use twilio::TwilioService;

use crate::domains::auth::code::CodeGenerator;
use crate::domains::auth::errors::DispatchError;
use crate::kernel::{BaseCodeDispatcher, BaseSessionStore, BaseTokenIssuer};

// =============================================================================
// TwilioService Adapter (implements BaseCodeDispatcher trait)
// =============================================================================

/// Wrapper around TwilioService that implements BaseCodeDispatcher trait
pub struct TwilioAdapter(pub Arc<TwilioService>);

impl TwilioAdapter {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

pub(crate) fn sms_body(code: i32) -> String {
    format!("Your verification code is {code}")
}

#[async_trait]
impl BaseCodeDispatcher for TwilioAdapter {
    async fn send_code(&self, phone: &str, code: i32) -> Result<(), DispatchError> {
        let message = self.0.send_sms(phone, &sms_body(code)).await?;
        tracing::debug!(sid = %message.sid, status = %message.status, "sms accepted");
        Ok(())
    }
}

// =============================================================================
// Log-only dispatcher (dev deployments without Twilio credentials)
// =============================================================================

/// Writes the code to the log instead of sending it
#[derive(Debug, Default, Clone)]
pub struct LogOnlyDispatcher;

#[async_trait]
impl BaseCodeDispatcher for LogOnlyDispatcher {
    async fn send_code(&self, phone: &str, code: i32) -> Result<(), DispatchError> {
        tracing::info!(phone = %phone, code, "sms dispatch disabled, logging code instead");
        Ok(())
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub session_store: Arc<dyn BaseSessionStore>,
    pub code_dispatcher: Arc<dyn BaseCodeDispatcher>,
    pub token_issuer: Arc<dyn BaseTokenIssuer>,
    pub code_generator: CodeGenerator,
    /// Upper bound for every store and dispatcher call
    pub call_timeout: Duration,
}

impl ServerDeps {
    pub fn new(
        session_store: Arc<dyn BaseSessionStore>,
        code_dispatcher: Arc<dyn BaseCodeDispatcher>,
        token_issuer: Arc<dyn BaseTokenIssuer>,
        code_generator: CodeGenerator,
        call_timeout: Duration,
    ) -> Self {
        Self {
            session_store,
            code_dispatcher,
            token_issuer,
            code_generator,
            call_timeout,
        }
    }
}
