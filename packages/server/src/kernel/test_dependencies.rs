// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BaseCodeDispatcher, BaseSessionStore, BaseTokenIssuer, ServerDeps};
use crate::domains::auth::code::{CodeGenerator, DEV_CODE};
use crate::domains::auth::errors::{DispatchError, StoreError};
use crate::domains::auth::jwt::{JwtService, TokenError};
use crate::domains::auth::models::Session;
use crate::domains::auth::stores::InMemorySessionStore;

pub const TEST_JWT_SECRET: &str = "test-secret-do-not-use-in-production";
pub const TEST_JWT_ISSUER: &str = "phone-auth-test";

// =============================================================================
// Mock Code Dispatcher
// =============================================================================

/// Arguments captured from a send_code call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCode {
    pub phone: String,
    pub code: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchBehavior {
    Succeed,
    Fail,
    Hang,
}

#[derive(Clone)]
pub struct MockCodeDispatcher {
    behavior: Arc<Mutex<DispatchBehavior>>,
    calls: Arc<Mutex<Vec<SentCode>>>,
}

impl MockCodeDispatcher {
    pub fn new() -> Self {
        Self {
            behavior: Arc::new(Mutex::new(DispatchBehavior::Succeed)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every send fails with `DispatchError::Unavailable`
    pub fn failing() -> Self {
        let mock = Self::new();
        mock.set_behavior(DispatchBehavior::Fail);
        mock
    }

    /// Every send blocks forever (exercises the call timeout)
    pub fn hanging() -> Self {
        let mock = Self::new();
        mock.set_behavior(DispatchBehavior::Hang);
        mock
    }

    pub fn set_failing(&self, failing: bool) {
        self.set_behavior(if failing {
            DispatchBehavior::Fail
        } else {
            DispatchBehavior::Succeed
        });
    }

    fn set_behavior(&self, behavior: DispatchBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Get all codes that were sent (including failed attempts)
    pub fn calls(&self) -> Vec<SentCode> {
        self.calls.lock().unwrap().clone()
    }

    /// Last code sent to `phone`
    pub fn last_code_for(&self, phone: &str) -> Option<i32> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.phone == phone)
            .map(|c| c.code)
    }
}

impl Default for MockCodeDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseCodeDispatcher for MockCodeDispatcher {
    async fn send_code(&self, phone: &str, code: i32) -> Result<(), DispatchError> {
        self.calls.lock().unwrap().push(SentCode {
            phone: phone.to_string(),
            code,
        });

        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            DispatchBehavior::Succeed => Ok(()),
            DispatchBehavior::Fail => Err(DispatchError::Unavailable(
                "mock dispatcher configured to fail".to_string(),
            )),
            DispatchBehavior::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}

// =============================================================================
// Fault-injecting session store
// =============================================================================

/// Wraps an in-memory store and fails selected operations
#[derive(Clone)]
pub struct FaultySessionStore {
    inner: InMemorySessionStore,
    fail_create: bool,
    fail_delete: bool,
    fail_consume: bool,
    hang_create: bool,
    hang_health: bool,
}

impl FaultySessionStore {
    pub fn new(inner: InMemorySessionStore) -> Self {
        Self {
            inner,
            fail_create: false,
            fail_delete: false,
            fail_consume: false,
            hang_create: false,
            hang_health: false,
        }
    }

    /// `create` reports `RecordExists`, as for an identifier collision
    pub fn with_colliding_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn with_failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn with_failing_consume(mut self) -> Self {
        self.fail_consume = true;
        self
    }

    /// `create` persists the session and then never returns
    pub fn with_hanging_create(mut self) -> Self {
        self.hang_create = true;
        self
    }

    pub fn with_hanging_health_check(mut self) -> Self {
        self.hang_health = true;
        self
    }
}

fn injected_failure() -> StoreError {
    StoreError::QueryFailed(sqlx::Error::Protocol("injected failure".to_string()))
}

#[async_trait]
impl BaseSessionStore for FaultySessionStore {
    async fn create(&self, session: &Session) -> Result<(), StoreError> {
        if self.fail_create {
            return Err(StoreError::RecordExists);
        }
        self.inner.create(session).await?;
        if self.hang_create {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Session, StoreError> {
        self.inner.get(session_id).await
    }

    async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        if self.fail_delete {
            return Err(injected_failure());
        }
        self.inner.delete(session_id).await
    }

    async fn consume(&self, session_id: &str, code: i32) -> Result<Session, StoreError> {
        if self.fail_consume {
            return Err(injected_failure());
        }
        self.inner.consume(session_id, code).await
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        self.inner.purge_expired().await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        if self.hang_health {
            std::future::pending::<()>().await;
        }
        self.inner.health_check().await
    }
}

// =============================================================================
// Failing token issuer
// =============================================================================

pub struct FailingTokenIssuer;

impl BaseTokenIssuer for FailingTokenIssuer {
    fn create_token(&self, _phone: &str) -> Result<String, TokenError> {
        Err(TokenError::SigningFailed("signing key unavailable".to_string()))
    }

    fn parse_and_validate(&self, _token: &str) -> Result<String, TokenError> {
        Err(TokenError::InvalidToken)
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Collection of test dependencies; the concrete fakes stay reachable so
/// tests can inspect them after running an action.
pub struct TestDependencies {
    pub store: InMemorySessionStore,
    pub dispatcher: MockCodeDispatcher,
    pub jwt_service: Arc<JwtService>,
    pub call_timeout: Duration,
}

impl TestDependencies {
    pub fn new() -> Self {
        let jwt_service = JwtService::new(
            TEST_JWT_SECRET,
            TEST_JWT_ISSUER.to_string(),
            chrono::Duration::hours(24),
        )
        .expect("test jwt config is valid");

        Self {
            store: InMemorySessionStore::new(chrono::Duration::minutes(5)),
            dispatcher: MockCodeDispatcher::new(),
            jwt_service: Arc::new(jwt_service),
            call_timeout: Duration::from_secs(2),
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: MockCodeDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// ServerDeps backed by the in-memory store, mock dispatcher and the
    /// fixed dev code
    pub fn server_deps(&self) -> ServerDeps {
        self.server_deps_with_store(Arc::new(self.store.clone()))
    }

    /// Same as [`Self::server_deps`] but with a substitute store
    pub fn server_deps_with_store(&self, store: Arc<dyn BaseSessionStore>) -> ServerDeps {
        ServerDeps::new(
            store,
            Arc::new(self.dispatcher.clone()),
            self.jwt_service.clone(),
            CodeGenerator::Fixed(DEV_CODE),
            self.call_timeout,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
