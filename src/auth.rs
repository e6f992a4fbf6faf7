//! Session token authentication.
//!
//! Everything except `/`, `/auth/login`, and CORS preflights requires a
//! `Authorization: Bearer <token>` header carrying a session token issued by
//! `POST /auth/login`. The store is injected via an axum `Extension` so the
//! middleware stays decoupled from `AppState`.

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::sessions::SessionStore;

/// Username of the authenticated caller, inserted into request extensions by
/// [`require_session`] for downstream handlers.
#[derive(Clone)]
pub struct AuthedUser(pub String);

/// The validated bearer token itself, stashed by [`require_session`] so
/// handlers that act on the session (logout) need not re-parse headers.
#[derive(Clone)]
pub struct SessionToken(pub String);

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Axum middleware that rejects requests without a valid session token.
///
/// # Error responses
///
/// - `401 Unauthorized` — header missing or malformed
/// - `403 Forbidden` — token present but unknown or expired
/// - `500 Internal Server Error` — [`SessionStore`] extension not found
///   (misconfiguration)
pub async fn require_session(mut request: Request, next: Next) -> Response {
    let store = match request.extensions().get::<SessionStore>() {
        Some(store) => store.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Server configuration error"})),
            )
                .into_response();
        }
    };

    let token = match bearer_token(request.headers()) {
        Some(t) => t.to_string(),
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Missing or invalid Authorization header"})),
            )
                .into_response();
        }
    };

    let Some(username) = store.lookup(&token).await else {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Invalid or expired session token"})),
        )
            .into_response();
    };

    request.extensions_mut().insert(AuthedUser(username));
    request.extensions_mut().insert(SessionToken(token));
    next.run(request).await
}

/// Constant-time byte comparison to prevent timing side-channel attacks.
///
/// Always iterates over the full length of `expected` regardless of `provided`
/// length, so an attacker cannot determine the secret length from response
/// times.
pub fn constant_time_eq(expected: &[u8], provided: &[u8]) -> bool {
    let mut diff = u8::from(expected.len() != provided.len());
    // Always iterate over the expected length to avoid timing leak
    for i in 0..expected.len() {
        let p = if i < provided.len() {
            provided[i]
        } else {
            0xff
        };
        diff |= expected[i] ^ p;
    }
    diff == 0
}
