use crate::{now, Result, Session, Store};

impl Store {
    pub async fn insert_session(
        &self,
        token_hash: &str,
        user_id: i64,
        expires_at: &str,
    ) -> Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            RETURNING token_hash, user_id, created_at, expires_at
            "#,
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(now())
        .bind(expires_at)
        .fetch_one(self.pool())
        .await?;
        Ok(session)
    }

    pub async fn find_session(&self, token_hash: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_optional(self.pool())
            .await?;
        Ok(session)
    }

    /// Returns the number of sessions removed (0 or 1).
    pub async fn delete_session(&self, token_hash: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }

    /// Drop every session whose expiry is at or before `cutoff`.
    pub async fn purge_expired_sessions(&self, cutoff: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(cutoff)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::temp_store;

    #[tokio::test]
    async fn session_lifecycle() {
        let (store, _dir) = temp_store().await;
        store
            .insert_session("abc", 7, "2030-01-01T00:00:00.000Z")
            .await
            .unwrap();

        let found = store.find_session("abc").await.unwrap().unwrap();
        assert_eq!(found.user_id, 7);

        assert_eq!(store.delete_session("abc").await.unwrap(), 1);
        assert_eq!(store.delete_session("abc").await.unwrap(), 0);
        assert!(store.find_session("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_only_removes_expired() {
        let (store, _dir) = temp_store().await;
        store
            .insert_session("old", 1, "2020-01-01T00:00:00.000Z")
            .await
            .unwrap();
        store
            .insert_session("new", 1, "2030-01-01T00:00:00.000Z")
            .await
            .unwrap();

        let removed = store
            .purge_expired_sessions("2025-06-01T00:00:00.000Z")
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.find_session("new").await.unwrap().is_some());
    }
}
