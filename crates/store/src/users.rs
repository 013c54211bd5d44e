use crate::{now, Result, Store, User};

impl Store {
    /// Insert a user. A duplicate email fails with a database error.
    pub async fn insert_user(&self, name: &str, email: &str, password_hash: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING user_id, name, email, password_hash, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(now())
        .fetch_one(self.pool())
        .await?;
        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::temp_store;

    #[tokio::test]
    async fn insert_then_lookup_by_email() {
        let (store, _dir) = temp_store().await;
        let user = store.insert_user("Ada", "ada@example.com", "h").await.unwrap();
        assert!(user.user_id > 0);

        let found = store.find_user_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(found.user_id, user.user_id);
        assert_eq!(found.password_hash, "h");
        assert!(store.find_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let (store, _dir) = temp_store().await;
        store.insert_user("Ada", "ada@example.com", "h").await.unwrap();
        let err = store
            .insert_user("Other", "ada@example.com", "h2")
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn password_hash_is_not_serialized() {
        let (store, _dir) = temp_store().await;
        let user = store.insert_user("Ada", "ada@example.com", "secret").await.unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
