//! File upload endpoint.
//!
//! - `POST /upload_file` — multipart form upload, field name `file`
//!
//! Uploaded files land in `<data_dir>/uploads/`. The filename is taken from
//! the multipart part verbatim but must be a plain basename — separators,
//! null bytes, and dot names are rejected rather than rewritten.
//!
//! ## Atomicity
//!
//! Writes use a temp-file-then-rename pattern in the target directory, so a
//! re-uploaded file is replaced in one step and readers never see partial
//! content.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{Method, StatusCode},
    middleware,
    routing::post,
    Json,
};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::auth::require_session;
use crate::composer::HandlerGroup;
use crate::config::Config;
use crate::AppState;

/// Monotonic counter to uniquify temp file names across concurrent writes.
static WRITE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Slack on top of the payload cap for multipart boundaries and part headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn group(config: &Config) -> HandlerGroup {
    HandlerGroup::new("upload_file")
        .route(Method::POST, "/upload_file", post(upload_file))
        .layer(middleware::from_fn(require_session))
        .layer(DefaultBodyLimit::max(
            config.server.max_upload_size + MULTIPART_OVERHEAD,
        ))
}

/// `POST /upload_file` — store one uploaded file and report its digest.
///
/// # Error codes
///
/// | HTTP | Code                | Meaning                              |
/// |------|---------------------|--------------------------------------|
/// | 400  | `MISSING_FILE`      | No `file` part in the form           |
/// | 400  | `INVALID_FILENAME`  | Empty, dot, or path-like filename    |
/// | 400  | `INVALID_MULTIPART` | Malformed or oversized form body     |
/// | 400  | `FILE_TOO_LARGE`    | Payload exceeds `max_upload_size`    |
/// | 500  | `IO_ERROR`          | Write or rename failure              |
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("Malformed multipart body: {e}"),
                "code": "INVALID_MULTIPART"
            })),
        )
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = validate_filename(field.file_name())?;
        let bytes = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("Failed to read upload: {e}"),
                    "code": "INVALID_MULTIPART"
                })),
            )
        })?;

        let max = state.config.server.max_upload_size;
        if bytes.len() > max {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("File too large ({} bytes, max {max})", bytes.len()),
                    "code": "FILE_TOO_LARGE"
                })),
            ));
        }

        let upload_dir = Path::new(&state.config.server.data_dir).join("uploads");
        let target = upload_dir.join(&filename);
        write_atomic(&upload_dir, &target, &bytes).await?;

        let digest = hex::encode(Sha256::digest(&bytes));
        tracing::info!(filename = %filename, size = bytes.len(), "file uploaded");

        return Ok(Json(json!({
            "filename": filename,
            "size": bytes.len(),
            "sha256": digest,
        })));
    }

    Err((
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "Form contains no 'file' part", "code": "MISSING_FILE"})),
    ))
}

/// Accept only plain basenames: no separators, no null bytes, no `.`/`..`,
/// not empty.
fn validate_filename(name: Option<&str>) -> Result<String, (StatusCode, Json<Value>)> {
    let reject = |msg: &str| {
        Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": msg, "code": "INVALID_FILENAME"})),
        ))
    };
    let Some(name) = name else {
        return reject("Upload is missing a filename");
    };
    if name.is_empty() || name == "." || name == ".." {
        return reject("Filename must be a plain file name");
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return reject("Filename must not contain path separators or null bytes");
    }
    Ok(name.to_string())
}

/// Write to a temp file in the upload directory, then rename over the target.
async fn write_atomic(
    dir: &Path,
    target: &Path,
    bytes: &[u8],
) -> Result<(), (StatusCode, Json<Value>)> {
    let io_err = |e: std::io::Error| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string(), "code": "IO_ERROR"})),
        )
    };

    tokio::fs::create_dir_all(dir).await.map_err(io_err)?;

    let seq = WRITE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let temp_path = dir.join(format!(".nursease_tmp_{}_{}", std::process::id(), seq));

    tokio::fs::write(&temp_path, bytes).await.map_err(io_err)?;
    if let Err(e) = tokio::fs::rename(&temp_path, target).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(io_err(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_filename() {
        assert_eq!(validate_filename(Some("roster.csv")).unwrap(), "roster.csv");
        assert!(validate_filename(None).is_err());
        assert!(validate_filename(Some("")).is_err());
        assert!(validate_filename(Some(".")).is_err());
        assert!(validate_filename(Some("..")).is_err());
        assert!(validate_filename(Some("../etc/passwd")).is_err());
        assert!(validate_filename(Some("a/b.txt")).is_err());
        assert!(validate_filename(Some("a\\b.txt")).is_err());
        assert!(validate_filename(Some("a\0b")).is_err());
    }
}
