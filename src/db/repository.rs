//! Session repository.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::auth::Session;
use crate::errors::ClientError;

/// Persistent storage for the single logged-in session.
#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load the stored session, if any.
    pub async fn load(&self) -> Result<Option<Session>, ClientError> {
        let row = sqlx::query(
            "SELECT token, refresh, user_id, username, established_at FROM session WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let established_at: String = row.get("established_at");
            let established_at = DateTime::parse_from_rfc3339(&established_at)
                .map_err(|e| ClientError::Storage(format!("Corrupt session timestamp: {}", e)))?
                .with_timezone(&Utc);

            Ok(Session {
                token: row.get("token"),
                refresh: row.get("refresh"),
                user_id: row.get("user_id"),
                username: row.get("username"),
                established_at,
            })
        })
        .transpose()
    }

    /// Store a session, replacing any previous one.
    pub async fn save(&self, session: &Session) -> Result<(), ClientError> {
        sqlx::query(
            "INSERT OR REPLACE INTO session (id, token, refresh, user_id, username, established_at) VALUES (1, ?, ?, ?, ?, ?)",
        )
        .bind(&session.token)
        .bind(&session.refresh)
        .bind(&session.user_id)
        .bind(&session.username)
        .bind(session.established_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove the stored session.
    pub async fn clear(&self) -> Result<(), ClientError> {
        sqlx::query("DELETE FROM session WHERE id = 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
