//! Shared application state passed to every handler via Axum's `State` extractor.

use std::sync::Arc;

use crate::config::Config;
use crate::scheduling::HospitalDirectory;
use crate::sessions::SessionStore;

/// Shared application state for the NurseEase admin server.
///
/// Cloneable — all clones share the same inner stores. The routing table
/// built on top of this state is immutable once composed; only the stores
/// themselves accept writes after startup.
#[derive(Clone)]
pub struct AppState {
    /// Immutable configuration loaded at startup.
    pub config: Arc<Config>,
    /// Login session tokens issued by `/auth/login`.
    pub sessions: SessionStore,
    /// Per-hospital nurse rosters and generated schedules.
    pub directory: HospitalDirectory,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            sessions: SessionStore::new(),
            directory: HospitalDirectory::new(),
        }
    }
}
