use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domains::auth::errors::StoreError;
use crate::domains::auth::models::Session;
use crate::kernel::BaseSessionStore;

/// Postgres-backed session store (`verification_sessions` table)
///
/// Uniqueness is enforced by the primary key; every operation is a single
/// statement except `create`, which clears an expired row with the same id
/// in the same transaction before inserting.
#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
    ttl: chrono::Duration,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool, ttl: chrono::Duration) -> Self {
        Self { pool, ttl }
    }

    fn cutoff(&self) -> DateTime<Utc> {
        Utc::now() - self.ttl
    }
}

#[async_trait]
impl BaseSessionStore for PostgresSessionStore {
    async fn create(&self, session: &Session) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(StoreError::TransactionFailed)?;

        sqlx::query(
            "DELETE FROM verification_sessions WHERE session_id = $1 AND created_at <= $2",
        )
        .bind(&session.session_id)
        .bind(self.cutoff())
        .execute(&mut *tx)
        .await
        .map_err(StoreError::QueryFailed)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO verification_sessions (session_id, phone, code, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (session_id) DO NOTHING
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.phone)
        .bind(session.code)
        .bind(session.created_at)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::QueryFailed)?
        .rows_affected();

        if inserted == 0 {
            // Dropping the transaction rolls it back
            return Err(StoreError::RecordExists);
        }

        tx.commit().await.map_err(StoreError::TransactionFailed)?;
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Session, StoreError> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT session_id, phone, code, created_at
            FROM verification_sessions
            WHERE session_id = $1 AND created_at > $2
            "#,
        )
        .bind(session_id)
        .bind(self.cutoff())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::QueryFailed)?
        .ok_or(StoreError::RecordNotFound)
    }

    async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        let deleted = sqlx::query("DELETE FROM verification_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::QueryFailed)?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::RecordNotFound);
        }
        Ok(())
    }

    async fn consume(&self, session_id: &str, code: i32) -> Result<Session, StoreError> {
        sqlx::query_as::<_, Session>(
            r#"
            DELETE FROM verification_sessions
            WHERE session_id = $1 AND code = $2 AND created_at > $3
            RETURNING session_id, phone, code, created_at
            "#,
        )
        .bind(session_id)
        .bind(code)
        .bind(self.cutoff())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::QueryFailed)?
        .ok_or(StoreError::RecordNotFound)
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let purged = sqlx::query("DELETE FROM verification_sessions WHERE created_at <= $1")
            .bind(self.cutoff())
            .execute(&self.pool)
            .await
            .map_err(StoreError::QueryFailed)?
            .rows_affected();
        Ok(purged)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(StoreError::QueryFailed)
    }
}
