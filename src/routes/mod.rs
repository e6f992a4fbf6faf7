//! HTTP route handlers.
//!
//! Each sub-module is one handler group mounted by the composer. `auth`
//! issues session tokens; `schedule`, `roster`, and `upload` require one via
//! the [`crate::auth::require_session`] middleware.

pub mod auth;
pub mod roster;
pub mod schedule;
pub mod upload;
