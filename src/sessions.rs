//! Login session tokens.
//!
//! `/auth/login` issues an opaque UUID v4 token with a TTL; every protected
//! endpoint presents it as `Authorization: Bearer <token>`. Tokens live in an
//! in-memory map and die with the process — there is no persistence.
//!
//! The map is behind an `RwLock`. Lookups take a read lock; issue, revoke,
//! and the periodic expiry sweep take a write lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

/// A single issued session.
#[derive(Clone)]
struct Session {
    username: String,
    expires_at: Instant,
}

/// Token store shared across handlers and the sweep task.
///
/// Cloneable — all clones share the same inner `Arc<RwLock<...>>`.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Issue a fresh token for `username`, valid for `ttl`.
    pub async fn issue(&self, username: &str, ttl: Duration) -> String {
        let token = Uuid::new_v4().to_string();
        let session = Session {
            username: username.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.sessions.write().await.insert(token.clone(), session);
        token
    }

    /// Resolve a token to its username, or `None` if unknown or expired.
    ///
    /// Expired entries are left in place for the sweep task; treating them
    /// as absent here keeps lookups on the read lock.
    pub async fn lookup(&self, token: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(token)?;
        if session.expires_at <= Instant::now() {
            return None;
        }
        Some(session.username.clone())
    }

    /// Revoke a token. Returns `true` if it existed.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Drop all expired sessions. Returns how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    /// Number of live (unswept) sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_and_lookup() {
        let store = SessionStore::new();
        let token = store.issue("admin", Duration::from_secs(60)).await;
        assert_eq!(store.lookup(&token).await.as_deref(), Some("admin"));
        assert_eq!(store.lookup("not-a-token").await, None);
    }

    #[tokio::test]
    async fn test_revoke() {
        let store = SessionStore::new();
        let token = store.issue("admin", Duration::from_secs(60)).await;
        assert!(store.revoke(&token).await);
        assert!(!store.revoke(&token).await);
        assert_eq!(store.lookup(&token).await, None);
    }

    #[tokio::test]
    async fn test_expired_token_rejected_and_swept() {
        let store = SessionStore::new();
        let token = store.issue("admin", Duration::from_secs(0)).await;
        assert_eq!(store.lookup(&token).await, None);
        assert_eq!(store.sweep_expired().await, 1);
        assert_eq!(store.count().await, 0);
    }
}
