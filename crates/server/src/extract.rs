//! Extractors whose rejections render as [`ServerError`] JSON.

use crate::error::ServerError;
use crate::middleware::session_token;
use crate::state::ServerState;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use intelli_summarize::{AppError, AUTH_REQUIRED};
use serde::{de, Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

/// `application/x-www-form-urlencoded` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(ServerError))]
pub struct ApiForm<T>(pub T);

/// Query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ServerError))]
pub struct ApiQuery<T>(pub T);

/// The caller behind a valid session.
///
/// Resolved per handler rather than by a router layer, so a request that
/// matches no method never reaches the session table.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub token: String,
}

impl FromRequestParts<Arc<ServerState>> for AuthUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ServerState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers)
            .ok_or_else(|| AppError::Authentication(AUTH_REQUIRED.into()))?;
        let user_id = state.app.authenticate(&token).await?;
        Ok(AuthUser { user_id, token })
    }
}

/// Form field that reads a blank value (`x=`) as `T::default()`. Pair with
/// `#[serde(default)]` so an absent field behaves the same way.
pub fn empty_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse().map_err(de::Error::custom)
}
