//! Integration tests for the create/verify session flow.
//!
//! Runs the actions against the in-memory store and the mock dispatcher:
//! - Happy path and exactly-once consumption
//! - Wrong codes leave the session intact
//! - Compensation when the code cannot be sent
//! - Call timeouts

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use phone_auth::domains::auth::actions::{
    create_session, purge_expired_sessions, verify_session,
};
use phone_auth::domains::auth::code::{CodeGenerator, CODE_MAX, CODE_MIN, DEV_CODE};
use phone_auth::domains::auth::{AuthError, DispatchError, Session, StoreError};
use phone_auth::kernel::test_dependencies::{
    FailingTokenIssuer, FaultySessionStore, MockCodeDispatcher, SentCode,
};
use phone_auth::kernel::{BaseSessionStore, ServerDeps, TestDependencies};

const PHONE: &str = "+15551234567";

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn create_session_persists_session_and_sends_code() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();

    let session_id = create_session(PHONE, &deps).await.unwrap();

    assert_eq!(session_id.len(), 64);
    let stored = test_deps.store.get(&session_id).await.unwrap();
    assert_eq!(stored.phone, PHONE);
    assert_eq!(stored.code, DEV_CODE);

    assert_eq!(
        test_deps.dispatcher.calls(),
        vec![SentCode {
            phone: PHONE.to_string(),
            code: DEV_CODE,
        }]
    );
}

#[tokio::test]
async fn create_session_random_codes_stay_in_range() {
    let test_deps = TestDependencies::new();
    let deps = ServerDeps {
        code_generator: CodeGenerator::Random,
        ..test_deps.server_deps()
    };

    for _ in 0..50 {
        let session_id = create_session(PHONE, &deps).await.unwrap();
        let stored = test_deps.store.get(&session_id).await.unwrap();
        assert!((CODE_MIN..=CODE_MAX).contains(&stored.code));
        assert_eq!(test_deps.dispatcher.last_code_for(PHONE), Some(stored.code));
    }
}

#[tokio::test]
async fn create_session_rejects_malformed_phone() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();

    for phone in ["", "5551234567", "+1 555 123", "+0123"] {
        let result = create_session(phone, &deps).await;
        assert!(
            matches!(result, Err(AuthError::InvalidInput(_))),
            "{phone:?} should be rejected"
        );
    }

    assert!(test_deps.store.is_empty().await);
    assert!(test_deps.dispatcher.calls().is_empty());
}

#[tokio::test]
async fn create_session_ids_are_distinct() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();

    let mut ids = HashSet::new();
    for _ in 0..200 {
        ids.insert(create_session(PHONE, &deps).await.unwrap());
    }

    assert_eq!(ids.len(), 200);
    assert_eq!(test_deps.store.len().await, 200);
}

#[tokio::test]
async fn create_session_store_collision_is_creation_failure() {
    let test_deps = TestDependencies::new();
    let store = FaultySessionStore::new(test_deps.store.clone()).with_colliding_create();
    let deps = test_deps.server_deps_with_store(Arc::new(store));

    let result = create_session(PHONE, &deps).await;

    assert!(matches!(
        result,
        Err(AuthError::SessionCreationFailed(StoreError::RecordExists))
    ));
    // Nothing is sent for a session that was never stored
    assert!(test_deps.dispatcher.calls().is_empty());
}

// ============================================================================
// Compensation
// ============================================================================

#[tokio::test]
async fn dispatch_failure_deletes_session() {
    let test_deps = TestDependencies::new().with_dispatcher(MockCodeDispatcher::failing());
    let deps = test_deps.server_deps();

    let result = create_session(PHONE, &deps).await;

    match result {
        Err(AuthError::SendCodeFailed {
            source: DispatchError::Unavailable(_),
            compensation: None,
        }) => {}
        other => panic!("expected SendCodeFailed, got {other:?}"),
    }

    // The dispatcher was asked, and the session it would have verified is gone
    assert_eq!(test_deps.dispatcher.calls().len(), 1);
    assert!(test_deps.store.is_empty().await);
}

#[tokio::test]
async fn dispatch_failure_reports_failed_compensation() {
    let test_deps = TestDependencies::new().with_dispatcher(MockCodeDispatcher::failing());
    let store = FaultySessionStore::new(test_deps.store.clone()).with_failing_delete();
    let deps = test_deps.server_deps_with_store(Arc::new(store));

    let result = create_session(PHONE, &deps).await;

    match result {
        Err(AuthError::SendCodeFailed {
            compensation: Some(StoreError::QueryFailed(_)),
            ..
        }) => {}
        other => panic!("expected SendCodeFailed with compensation error, got {other:?}"),
    }
}

#[tokio::test]
async fn dispatch_timeout_deletes_session() {
    let test_deps = TestDependencies::new()
        .with_dispatcher(MockCodeDispatcher::hanging())
        .with_call_timeout(Duration::from_millis(50));
    let deps = test_deps.server_deps();

    let result = create_session(PHONE, &deps).await;

    assert!(matches!(
        result,
        Err(AuthError::SendCodeFailed {
            source: DispatchError::Timeout(_),
            compensation: None,
        })
    ));
    assert!(test_deps.store.is_empty().await);
}

#[tokio::test]
async fn store_timeout_on_create_is_cancelled_and_cleaned_up() {
    let test_deps = TestDependencies::new().with_call_timeout(Duration::from_millis(50));
    let store = FaultySessionStore::new(test_deps.store.clone()).with_hanging_create();
    let deps = test_deps.server_deps_with_store(Arc::new(store));

    let result = create_session(PHONE, &deps).await;

    assert!(matches!(
        result,
        Err(AuthError::Cancelled {
            operation: "create session",
            ..
        })
    ));
    assert!(test_deps.store.is_empty().await);
    assert!(test_deps.dispatcher.calls().is_empty());
}

// ============================================================================
// Verify
// ============================================================================

#[tokio::test]
async fn verify_with_correct_code_issues_token_once() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();

    let session_id = create_session(PHONE, &deps).await.unwrap();

    let token = verify_session(&session_id, DEV_CODE, &deps).await.unwrap();
    assert!(!token.is_empty());
    assert_eq!(test_deps.jwt_service.parse_and_validate(&token).unwrap(), PHONE);

    // Consumed: the session is gone and cannot be verified again
    assert!(matches!(
        test_deps.store.get(&session_id).await,
        Err(StoreError::RecordNotFound)
    ));
    assert!(matches!(
        verify_session(&session_id, DEV_CODE, &deps).await,
        Err(AuthError::SessionNotFound)
    ));
}

#[tokio::test]
async fn verify_with_wrong_code_keeps_session() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();

    let session_id = create_session(PHONE, &deps).await.unwrap();

    for wrong in [1000, 1234, 9999] {
        assert!(matches!(
            verify_session(&session_id, wrong, &deps).await,
            Err(AuthError::InvalidCode)
        ));
    }

    assert!(test_deps.store.get(&session_id).await.is_ok());
    assert!(verify_session(&session_id, DEV_CODE, &deps).await.is_ok());
}

#[tokio::test]
async fn verify_unknown_session_is_not_found() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();

    let result = verify_session(&"ab".repeat(32), DEV_CODE, &deps).await;

    assert!(matches!(result, Err(AuthError::SessionNotFound)));
}

#[tokio::test]
async fn verify_rejects_malformed_input() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();
    let session_id = create_session(PHONE, &deps).await.unwrap();

    assert!(matches!(
        verify_session("not-a-session", DEV_CODE, &deps).await,
        Err(AuthError::InvalidInput(_))
    ));
    assert!(matches!(
        verify_session(&session_id, 999, &deps).await,
        Err(AuthError::InvalidInput(_))
    ));
    assert!(matches!(
        verify_session(&session_id, 10000, &deps).await,
        Err(AuthError::InvalidInput(_))
    ));

    // Malformed attempts do not touch the session
    assert!(test_deps.store.get(&session_id).await.is_ok());
}

#[tokio::test]
async fn verify_expired_session_is_not_found() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();

    let mut session = Session::new("cd".repeat(32), PHONE.to_string(), DEV_CODE);
    session.created_at = chrono::Utc::now() - chrono::Duration::minutes(6);
    test_deps.store.create(&session).await.unwrap();

    assert!(matches!(
        verify_session(&session.session_id, DEV_CODE, &deps).await,
        Err(AuthError::SessionNotFound)
    ));
}

#[tokio::test]
async fn concurrent_verification_issues_exactly_one_token() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();
    let session_id = create_session(PHONE, &deps).await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let deps = deps.clone();
            let session_id = session_id.clone();
            tokio::spawn(async move { verify_session(&session_id, DEV_CODE, &deps).await })
        })
        .collect();

    let mut tokens = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => tokens += 1,
            Err(AuthError::SessionNotFound) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(tokens, 1);
}

#[tokio::test]
async fn failed_delete_after_match_still_issues_token() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();
    let session_id = create_session(PHONE, &deps).await.unwrap();

    let store = FaultySessionStore::new(test_deps.store.clone()).with_failing_consume();
    let deps = test_deps.server_deps_with_store(Arc::new(store));

    let token = verify_session(&session_id, DEV_CODE, &deps).await.unwrap();
    assert_eq!(test_deps.jwt_service.parse_and_validate(&token).unwrap(), PHONE);
}

#[tokio::test]
async fn token_failure_is_reported() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();
    let session_id = create_session(PHONE, &deps).await.unwrap();

    let deps = ServerDeps {
        token_issuer: Arc::new(FailingTokenIssuer),
        ..deps
    };

    assert!(matches!(
        verify_session(&session_id, DEV_CODE, &deps).await,
        Err(AuthError::TokenCreationFailed(_))
    ));
}

// ============================================================================
// Sweep
// ============================================================================

#[tokio::test]
async fn purge_removes_only_expired_sessions() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();

    let live_id = create_session(PHONE, &deps).await.unwrap();

    let mut expired = Session::new("ef".repeat(32), PHONE.to_string(), DEV_CODE);
    expired.created_at = chrono::Utc::now() - chrono::Duration::hours(1);
    test_deps.store.create(&expired).await.unwrap();

    assert_eq!(purge_expired_sessions(&deps).await.unwrap(), 1);
    assert_eq!(test_deps.store.len().await, 1);
    assert!(test_deps.store.get(&live_id).await.is_ok());
}
