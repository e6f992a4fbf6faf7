#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::unused_async)]

//! # nursease-admin
//!
//! NurseEase Admin API — administrative backend for nurse scheduling.
//!
//! The server is one axum application assembled by the composer: four
//! handler groups mounted at fixed prefixes, a uniform cross-origin layer,
//! and an inline root route. All stores are in memory; uploads are the only
//! thing written to disk.
//!
//! ## API surface
//!
//! | Method | Path                          | Auth | Description                    |
//! |--------|-------------------------------|------|--------------------------------|
//! | GET    | `/`                           | No   | Welcome message                |
//! | POST   | `/auth/login`                 | No   | Obtain a session token         |
//! | GET    | `/auth/me`                    | Yes  | Authenticated caller identity  |
//! | POST   | `/auth/logout`                | Yes  | Revoke the session token       |
//! | POST   | `/schedule/generate_schedule` | Yes  | Build a hospital's schedule    |
//! | POST   | `/schedule/fetch_schedule`    | Yes  | Fetch the stored schedule      |
//! | GET    | `/nurses`                     | Yes  | List a hospital's roster       |
//! | POST   | `/nurses`                     | Yes  | Register a nurse               |
//! | DELETE | `/nurses/{name}`              | Yes  | Remove a nurse                 |
//! | POST   | `/upload_file`                | Yes  | Multipart file upload          |
//!
//! ## Architecture
//!
//! ```text
//! main.rs        — entry point, clap, tracing init, graceful shutdown
//! composer.rs    — router assembly, mount table, CORS layer, conflict checks
//! auth.rs        — session token middleware, constant-time comparison
//! sessions.rs    — in-memory session token store with expiry sweep
//! scheduling.rs  — rosters and round-robin shift generation
//! config.rs      — TOML + env-var configuration
//! state.rs       — shared AppState
//! routes/
//!   auth.rs      — login, me, logout
//!   schedule.rs  — generate_schedule, fetch_schedule
//!   roster.rs    — nurse registration and listing
//!   upload.rs    — multipart upload with atomic writes
//! ```

pub mod auth;
pub mod composer;
pub mod config;
pub mod routes;
pub mod scheduling;
pub mod sessions;
pub mod state;

// Re-export key types at crate root for convenience.
pub use composer::{build_application, ComposeError, HandlerGroup, RouteMount, APP_TITLE, APP_VERSION};
pub use config::Config;
pub use scheduling::HospitalDirectory;
pub use sessions::SessionStore;
pub use state::AppState;
