//! Shift schedule endpoints.
//!
//! - `POST /schedule/generate_schedule` — build and store a hospital's schedule
//! - `POST /schedule/fetch_schedule`    — return the last generated schedule
//!
//! The admin panel polls `fetch_schedule` and treats 404 as "no schedule
//! yet", so that status (not an empty table) is the contract for a hospital
//! that never generated one.

use axum::{
    extract::State,
    http::{Method, StatusCode},
    middleware,
    routing::post,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::require_session;
use crate::composer::HandlerGroup;
use crate::AppState;

pub fn group() -> HandlerGroup {
    HandlerGroup::new("schedule")
        .route(Method::POST, "/generate_schedule", post(generate_schedule))
        .route(Method::POST, "/fetch_schedule", post(fetch_schedule))
        .layer(middleware::from_fn(require_session))
}

/// Request body for `POST /schedule/generate_schedule`.
#[derive(Deserialize)]
pub struct GenerateScheduleRequest {
    pub hospital_id: String,
    /// Nurses to skip for this run, by name.
    #[serde(default)]
    pub absent_nurses: Vec<String>,
}

/// Request body for `POST /schedule/fetch_schedule`.
#[derive(Deserialize)]
pub struct FetchScheduleRequest {
    pub hospital_id: String,
}

/// `POST /schedule/generate_schedule` — assign shifts to the hospital's
/// registered nurses, minus absentees, and store the result.
///
/// # Error codes
///
/// | HTTP | Code           | Meaning                                    |
/// |------|----------------|--------------------------------------------|
/// | 400  | `EMPTY_ROSTER` | No registered nurses left after absentees  |
pub async fn generate_schedule(
    State(state): State<AppState>,
    Json(payload): Json<GenerateScheduleRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state
        .directory
        .generate_schedule(&payload.hospital_id, &payload.absent_nurses)
        .await
    {
        Some(schedule) => {
            tracing::info!(
                hospital_id = %payload.hospital_id,
                nurses = schedule.len(),
                "schedule generated"
            );
            Ok(Json(json!(schedule)))
        }
        None => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "No nurses available to schedule for this hospital",
                "code": "EMPTY_ROSTER"
            })),
        )),
    }
}

/// `POST /schedule/fetch_schedule` — return the stored schedule as a map of
/// nurse name to assigned shifts.
///
/// # Error codes
///
/// | HTTP | Code          | Meaning                                  |
/// |------|---------------|------------------------------------------|
/// | 404  | `NO_SCHEDULE` | No schedule generated for this hospital  |
pub async fn fetch_schedule(
    State(state): State<AppState>,
    Json(payload): Json<FetchScheduleRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.directory.fetch_schedule(&payload.hospital_id).await {
        Some(schedule) => Ok(Json(json!(schedule))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "No schedule found for this hospital",
                "code": "NO_SCHEDULE"
            })),
        )),
    }
}
