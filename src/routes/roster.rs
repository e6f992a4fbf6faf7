//! Nurse roster endpoints — the scheduler's input data.
//!
//! - `POST   /nurses`        — register a nurse at a hospital
//! - `GET    /nurses`        — list a hospital's roster
//! - `DELETE /nurses/{name}` — remove a nurse

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    middleware,
    routing::{delete, get, post},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::require_session;
use crate::composer::HandlerGroup;
use crate::scheduling::Nurse;
use crate::AppState;

pub fn group() -> HandlerGroup {
    HandlerGroup::new("roster")
        .route(Method::GET, "/nurses", get(list_nurses))
        .route(Method::POST, "/nurses", post(register_nurse))
        .route(Method::DELETE, "/nurses/{name}", delete(remove_nurse))
        .layer(middleware::from_fn(require_session))
}

/// Request body for `POST /nurses`.
#[derive(Deserialize)]
pub struct RegisterNurseRequest {
    pub name: String,
    pub department: String,
    pub hospital_id: String,
}

/// Query parameters selecting the hospital to operate on.
#[derive(Deserialize)]
pub struct RosterQuery {
    pub hospital_id: String,
}

/// `POST /nurses` — add a nurse to a hospital's roster.
///
/// # Error codes
///
/// | HTTP | Code              | Meaning                                 |
/// |------|-------------------|-----------------------------------------|
/// | 409  | `DUPLICATE_NURSE` | Name already registered at this hospital |
pub async fn register_nurse(
    State(state): State<AppState>,
    Json(payload): Json<RegisterNurseRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let nurse = Nurse {
        name: payload.name.clone(),
        department: payload.department,
    };
    if !state.directory.add_nurse(&payload.hospital_id, nurse).await {
        return Err((
            StatusCode::CONFLICT,
            Json(json!({
                "error": "A nurse with this name is already registered",
                "code": "DUPLICATE_NURSE"
            })),
        ));
    }
    tracing::info!(hospital_id = %payload.hospital_id, name = %payload.name, "nurse registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({"ok": true, "name": payload.name})),
    ))
}

/// `GET /nurses?hospital_id=...` — list a hospital's roster, sorted by name.
/// Unknown hospitals simply list empty.
pub async fn list_nurses(
    State(state): State<AppState>,
    Query(query): Query<RosterQuery>,
) -> Json<Value> {
    let nurses = state.directory.list_nurses(&query.hospital_id).await;
    Json(json!({
        "hospital_id": query.hospital_id,
        "nurses": nurses,
    }))
}

/// `DELETE /nurses/{name}?hospital_id=...` — remove a nurse from the roster.
///
/// # Error codes
///
/// | HTTP | Code              | Meaning                             |
/// |------|-------------------|-------------------------------------|
/// | 404  | `NURSE_NOT_FOUND` | No such nurse at this hospital      |
pub async fn remove_nurse(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<RosterQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if !state.directory.remove_nurse(&query.hospital_id, &name).await {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Nurse not found at this hospital",
                "code": "NURSE_NOT_FOUND"
            })),
        ));
    }
    Ok(Json(json!({"ok": true})))
}
