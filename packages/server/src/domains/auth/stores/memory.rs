use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domains::auth::errors::StoreError;
use crate::domains::auth::models::Session;
use crate::kernel::BaseSessionStore;

/// In-memory session store
///
/// Used in dev deployments without a database and in tests. Every mutation
/// happens under a single write lock, so `create` and `consume` are atomic.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: chrono::Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: chrono::Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Number of stored records, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl BaseSessionStore for InMemorySessionStore {
    async fn create(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;

        if let Some(existing) = sessions.get(&session.session_id) {
            if !existing.is_expired(self.ttl, Utc::now()) {
                return Err(StoreError::RecordExists);
            }
        }

        sessions.insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Session, StoreError> {
        let sessions = self.sessions.read().await;
        match sessions.get(session_id) {
            Some(session) if !session.is_expired(self.ttl, Utc::now()) => Ok(session.clone()),
            _ => Err(StoreError::RecordNotFound),
        }
    }

    async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(session_id)
            .map(|_| ())
            .ok_or(StoreError::RecordNotFound)
    }

    async fn consume(&self, session_id: &str, code: i32) -> Result<Session, StoreError> {
        let mut sessions = self.sessions.write().await;

        let matches = sessions
            .get(session_id)
            .map(|s| s.code == code && !s.is_expired(self.ttl, Utc::now()))
            .unwrap_or(false);

        if !matches {
            return Err(StoreError::RecordNotFound);
        }

        sessions
            .remove(session_id)
            .ok_or(StoreError::RecordNotFound)
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        let before = sessions.len();

        sessions.retain(|_, session| !session.is_expired(self.ttl, now));

        Ok((before - sessions.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
