//! Signup, login, and session tokens.
//!
//! Login issues an opaque bearer token. Only its blake3 hash is stored, so
//! a copy of the database cannot be replayed as live sessions.

use crate::error::{AppError, AppResult};
use crate::password::{burn_verification, hash_password, verify_password};
use crate::App;
use chrono::{DateTime, Utc};
use store::User;
use tracing::{debug, info, warn};

/// Message for requests without a usable session.
pub const AUTH_REQUIRED: &str = "Authentication required";

/// A freshly issued session. `token` is only ever seen here.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl App {
    /// Register a user and return the new row.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> AppResult<User> {
        let (name, email) = (name.trim(), email.trim());
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::Validation("Missing fields".into()));
        }

        let password = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::storage("Insert failed", e))?
            .map_err(|e| AppError::storage("Insert failed", e))?;

        let user = self
            .store()
            .insert_user(name, email, &hash)
            .await
            .map_err(|e| AppError::storage("Insert failed", e))?;

        info!(user_id = user.user_id, "user signed up");
        Ok(user)
    }

    /// Verify credentials and open a session.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<IssuedSession> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation("Missing fields".into()));
        }

        let user = self.store().find_user_by_email(email).await?;
        let candidate = password.to_owned();
        let verified = match user {
            Some(user) => {
                let stored = user.password_hash.clone();
                let joined =
                    tokio::task::spawn_blocking(move || verify_password(&candidate, &stored)).await;
                verification_outcome(joined)?.then_some(user)
            }
            None => {
                let _ = tokio::task::spawn_blocking(move || burn_verification(&candidate)).await;
                None
            }
        };

        let Some(user) = verified else {
            debug!("login rejected");
            return Err(AppError::invalid_credentials());
        };

        let token = new_token();
        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.config().session_ttl())
                .unwrap_or_else(|_| chrono::Duration::days(1));
        self.store()
            .insert_session(&token_hash(&token), user.user_id, &store::timestamp(expires_at))
            .await?;

        info!(user_id = user.user_id, "session opened");
        Ok(IssuedSession {
            user_id: user.user_id,
            token,
            expires_at,
        })
    }

    /// Close the session for `token`. Returns whether one existed.
    pub async fn logout(&self, token: &str) -> AppResult<bool> {
        let removed = self.store().delete_session(&token_hash(token)).await?;
        Ok(removed > 0)
    }

    /// Resolve a bearer token to its user id.
    pub async fn authenticate(&self, token: &str) -> AppResult<i64> {
        let hash = token_hash(token);
        let Some(session) = self.store().find_session(&hash).await? else {
            return Err(AppError::Authentication(AUTH_REQUIRED.into()));
        };

        let expired = DateTime::parse_from_rfc3339(&session.expires_at)
            .map(|at| at.with_timezone(&Utc) <= Utc::now())
            .unwrap_or(true);
        if expired {
            if let Err(err) = self.store().delete_session(&hash).await {
                warn!(error = %err, "failed to drop expired session");
            }
            return Err(AppError::Authentication(AUTH_REQUIRED.into()));
        }

        Ok(session.user_id)
    }

    /// Delete every expired session. Returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> AppResult<u64> {
        Ok(self
            .store()
            .purge_expired_sessions(&store::timestamp(Utc::now()))
            .await?)
    }
}

/// Two v4 UUIDs (244 random bits) rendered as 64 hex characters.
fn new_token() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// A verification task that did not finish is a server failure, never a
/// rejected password.
fn verification_outcome(joined: Result<bool, tokio::task::JoinError>) -> AppResult<bool> {
    joined.map_err(|e| AppError::storage("Login failed", e))
}

fn token_hash(token: &str) -> String {
    blake3::hash(token.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_long_and_distinct() {
        let a = new_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, new_token());
    }

    #[test]
    fn token_hash_is_stable() {
        assert_eq!(token_hash("abc"), token_hash("abc"));
        assert_ne!(token_hash("abc"), token_hash("abd"));
        assert_eq!(token_hash("abc").len(), 64);
    }

    #[tokio::test]
    async fn panicked_verification_is_a_server_error() {
        let joined = tokio::task::spawn_blocking(|| -> bool { panic!("verifier crashed") }).await;
        let err = verification_outcome(joined).unwrap_err();
        assert!(matches!(&err, AppError::Storage { message, .. } if message == "Login failed"));
        assert!(!matches!(err, AppError::Authentication(_)));

        assert!(verification_outcome(Ok(false)).is_ok_and(|ok| !ok));
    }

    use crate::config::AppConfig;
    use crate::test_support::{temp_app, temp_app_with};

    #[tokio::test]
    async fn signup_then_login_returns_same_user() {
        let (app, _dir) = temp_app().await;
        let user = app.signup("Ada", "ada@example.com", "s3cret").await.unwrap();
        let session = app.login("ada@example.com", "s3cret").await.unwrap();
        assert_eq!(session.user_id, user.user_id);
        assert_eq!(app.authenticate(&session.token).await.unwrap(), user.user_id);
    }

    #[tokio::test]
    async fn bad_password_and_unknown_email_look_the_same() {
        let (app, _dir) = temp_app().await;
        app.signup("Ada", "ada@example.com", "s3cret").await.unwrap();

        let wrong = app.login("ada@example.com", "nope").await.unwrap_err();
        let unknown = app.login("bob@example.com", "s3cret").await.unwrap_err();
        assert!(matches!(wrong, AppError::Authentication(_)));
        assert!(matches!(unknown, AppError::Authentication(_)));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let (app, _dir) = temp_app().await;
        assert!(matches!(
            app.signup("", "a@example.com", "pw").await,
            Err(AppError::Validation(m)) if m == "Missing fields"
        ));
        assert!(matches!(
            app.login("a@example.com", "").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_email_fails_insert() {
        let (app, _dir) = temp_app().await;
        app.signup("Ada", "ada@example.com", "pw").await.unwrap();
        let err = app.signup("Ada", "ada@example.com", "pw").await.unwrap_err();
        assert_eq!(err.to_string(), "Insert failed");
    }

    #[tokio::test]
    async fn logout_ends_session() {
        let (app, _dir) = temp_app().await;
        app.signup("Ada", "ada@example.com", "pw").await.unwrap();
        let session = app.login("ada@example.com", "pw").await.unwrap();

        assert!(app.logout(&session.token).await.unwrap());
        assert!(!app.logout(&session.token).await.unwrap());
        assert!(matches!(
            app.authenticate(&session.token).await,
            Err(AppError::Authentication(m)) if m == AUTH_REQUIRED
        ));
    }

    #[tokio::test]
    async fn expired_sessions_are_rejected() {
        let (app, _dir) = temp_app_with(AppConfig {
            session_ttl_secs: 0,
            ..AppConfig::default()
        })
        .await;
        app.signup("Ada", "ada@example.com", "pw").await.unwrap();
        let session = app.login("ada@example.com", "pw").await.unwrap();

        assert!(app.authenticate(&session.token).await.is_err());
        assert!(app.authenticate("not-a-token").await.is_err());
        assert_eq!(app.purge_expired_sessions().await.unwrap(), 0);
    }
}
