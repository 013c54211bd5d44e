//! Browser pages. Only the dashboard needs a session; the login and signup
//! pages send signed-in users straight to it.

use crate::error::ServerError;
use crate::middleware::current_user;
use crate::state::ServerState;
use axum::extract::State;
use axum::http::{HeaderMap, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use std::sync::Arc;

const HOME_HTML: &str = include_str!("../../assets/home.html");
const LOGIN_HTML: &str = include_str!("../../assets/login.html");
const SIGNUP_HTML: &str = include_str!("../../assets/signup.html");
const DASHBOARD_HTML: &str = include_str!("../../assets/dashboard.html");

pub async fn home() -> Html<&'static str> {
    Html(HOME_HTML)
}

pub async fn login(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    if current_user(&state, &headers).await.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    Html(LOGIN_HTML).into_response()
}

pub async fn signup(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    if current_user(&state, &headers).await.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    Html(SIGNUP_HTML).into_response()
}

pub async fn dashboard(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    if current_user(&state, &headers).await.is_none() {
        return Redirect::to("/login").into_response();
    }
    Html(DASHBOARD_HTML).into_response()
}

/// Unknown API paths get a JSON 404; everything else lands on the home page.
pub async fn fallback(uri: Uri) -> Response {
    if uri.path() == "/api" || uri.path().starts_with("/api/") {
        return ServerError::NotFound.into_response();
    }
    Html(HOME_HTML).into_response()
}
