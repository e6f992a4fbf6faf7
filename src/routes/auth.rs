//! Authentication endpoints.
//!
//! - `POST /auth/login`  — exchange admin credentials for a session token
//! - `GET  /auth/me`     — identify the authenticated caller
//! - `POST /auth/logout` — revoke the presented token

use std::time::Duration;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    middleware,
    routing::{get, post},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{constant_time_eq, require_session, AuthedUser, SessionToken};
use crate::composer::HandlerGroup;
use crate::AppState;

pub fn group() -> HandlerGroup {
    HandlerGroup::new("auth")
        .route(Method::POST, "/login", post(login))
        .route(
            Method::GET,
            "/me",
            get(me).layer(middleware::from_fn(require_session)),
        )
        .route(
            Method::POST,
            "/logout",
            post(logout).layer(middleware::from_fn(require_session)),
        )
}

/// Request body for `POST /auth/login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /auth/login` — issue a session token.
///
/// Both the username and password comparison run in constant time, and both
/// always run, so response timing reveals nothing about which field was
/// wrong.
///
/// # Error codes
///
/// | HTTP | Code                  | Meaning              |
/// |------|-----------------------|----------------------|
/// | 401  | `INVALID_CREDENTIALS` | Bad username or password |
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let auth = &state.config.auth;
    let user_ok = constant_time_eq(auth.admin_username.as_bytes(), payload.username.as_bytes());
    let pass_ok = constant_time_eq(auth.admin_password.as_bytes(), payload.password.as_bytes());
    if !(user_ok & pass_ok) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid username or password", "code": "INVALID_CREDENTIALS"})),
        ));
    }

    let ttl = Duration::from_secs(auth.session_ttl_secs);
    let token = state.sessions.issue(&payload.username, ttl).await;
    tracing::info!(username = %payload.username, "login");

    Ok(Json(json!({
        "token": token,
        "expires_in_secs": auth.session_ttl_secs,
    })))
}

/// `GET /auth/me` — report the authenticated username.
pub async fn me(Extension(user): Extension<AuthedUser>) -> Json<Value> {
    Json(json!({"username": user.0}))
}

/// `POST /auth/logout` — revoke the presented session token.
pub async fn logout(
    State(state): State<AppState>,
    Extension(token): Extension<SessionToken>,
) -> Json<Value> {
    state.sessions.revoke(&token.0).await;
    Json(json!({"ok": true}))
}
