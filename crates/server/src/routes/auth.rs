use crate::error::ServerResult;
use crate::extract::{ApiForm, AuthUser};
use crate::middleware::SESSION_COOKIE;
use crate::state::ServerState;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Register a new account
pub async fn signup(
    State(state): State<Arc<ServerState>>,
    ApiForm(form): ApiForm<SignupForm>,
) -> ServerResult<impl IntoResponse> {
    let user = state
        .app
        .signup(&form.name, &form.email, &form.password)
        .await?;
    Ok(Json(SignupResponse {
        success: true,
        user_id: user.user_id,
    }))
}

/// Verify credentials and open a session
///
/// The token is returned in the body for API clients and set as an
/// `HttpOnly` cookie for the browser pages.
pub async fn login(
    State(state): State<Arc<ServerState>>,
    ApiForm(form): ApiForm<LoginForm>,
) -> ServerResult<impl IntoResponse> {
    let session = state.app.login(&form.email, &form.password).await?;
    let cookie = format!(
        "{SESSION_COOKIE}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        session.token, state.config.session_ttl_secs
    );
    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            user_id: session.user_id,
            token: session.token,
            expires_at: session.expires_at,
        }),
    ))
}

/// Close the caller's session and clear the cookie
pub async fn logout(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
) -> ServerResult<impl IntoResponse> {
    state.app.logout(&user.token).await?;
    tracing::info!(user_id = user.user_id, "session closed");
    let cookie = format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
    Ok(([(SET_COOKIE, cookie)], Json(serde_json::json!({ "success": true }))))
}
