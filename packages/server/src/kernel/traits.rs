// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The create/verify flow lives in domains/auth/actions and only talks to these traits.
//
// Naming convention: Base* for trait names (e.g., BaseSessionStore, BaseCodeDispatcher)

use async_trait::async_trait;

use crate::domains::auth::errors::{DispatchError, StoreError};
use crate::domains::auth::jwt::{JwtService, TokenError};
use crate::domains::auth::models::Session;

// =============================================================================
// Session Store Trait (Infrastructure - persistence only)
// =============================================================================

#[async_trait]
pub trait BaseSessionStore: Send + Sync {
    /// Insert a new session. Fails with `RecordExists` instead of overwriting
    /// a live session with the same id.
    async fn create(&self, session: &Session) -> Result<(), StoreError>;

    /// Fetch a live session. Expired sessions are reported as `RecordNotFound`.
    async fn get(&self, session_id: &str) -> Result<Session, StoreError>;

    /// Remove a session. Zero matching rows is `RecordNotFound`.
    async fn delete(&self, session_id: &str) -> Result<(), StoreError>;

    /// Atomically remove the session if it is live and `code` matches,
    /// returning the removed record. Anything else is `RecordNotFound`.
    async fn consume(&self, session_id: &str, code: i32) -> Result<Session, StoreError>;

    /// Remove every expired session, returning how many were removed
    async fn purge_expired(&self) -> Result<u64, StoreError>;

    /// Cheap liveness probe for the health endpoint
    async fn health_check(&self) -> Result<(), StoreError>;
}

// =============================================================================
// Code Dispatcher Trait (Infrastructure - SMS delivery)
// =============================================================================

#[async_trait]
pub trait BaseCodeDispatcher: Send + Sync {
    /// Deliver a one-time code to a phone number
    async fn send_code(&self, phone: &str, code: i32) -> Result<(), DispatchError>;
}

// =============================================================================
// Token Issuer Trait (Infrastructure - signed credentials)
// =============================================================================

pub trait BaseTokenIssuer: Send + Sync {
    /// Sign a token asserting `phone` has been verified
    fn create_token(&self, phone: &str) -> Result<String, TokenError>;

    /// Validate a token and return the phone number it carries
    fn parse_and_validate(&self, token: &str) -> Result<String, TokenError>;
}

impl BaseTokenIssuer for JwtService {
    fn create_token(&self, phone: &str) -> Result<String, TokenError> {
        JwtService::create_token(self, phone)
    }

    fn parse_and_validate(&self, token: &str) -> Result<String, TokenError> {
        JwtService::parse_and_validate(self, token)
    }
}
