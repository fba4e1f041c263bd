//! Single-slot bearer token store.
//!
//! Mutation is always user-initiated and single-flight (login, logout,
//! verified-invalid purge), so a plain `RwLock` around one slot is enough.

use std::path::PathBuf;

use parking_lot::RwLock;
use tracing::{info, warn};

/// Process-wide holder for the current bearer token. Injectable so the
/// gateway can be tested against a throwaway store.
pub struct SessionStore {
    slot: RwLock<Option<String>>,
    /// When set, the token is mirrored to this file across restarts.
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Store without persistence, for tests and short-lived tools.
    pub fn in_memory() -> Self {
        Self {
            slot: RwLock::new(None),
            path: None,
        }
    }

    /// Store persisted at a fixed path. An existing token file is loaded
    /// so a session survives restarts.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let existing = std::fs::read_to_string(&path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if existing.is_some() {
            info!(path = %path.display(), "Restored session token");
        }
        Self {
            slot: RwLock::new(existing),
            path: Some(path),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.slot.read().clone()
    }

    pub fn set(&self, token: String) {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(e) = std::fs::write(path, &token) {
                warn!(path = %path.display(), error = %e, "Failed to persist session token");
            }
        }
        *self.slot.write() = Some(token);
    }

    pub fn clear(&self) {
        if let Some(path) = &self.path {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "Failed to remove session token file");
                }
            }
        }
        *self.slot.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_lifecycle() {
        let store = SessionStore::in_memory();
        assert_eq!(store.get(), None);

        store.set("tok-1".into());
        assert_eq!(store.get(), Some("tok-1".into()));

        store.set("tok-2".into());
        assert_eq!(store.get(), Some("tok-2".into()));

        store.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_persistent_roundtrip() {
        let path = std::env::temp_dir().join("streampass_test_token_roundtrip");

        let store = SessionStore::persistent(&path);
        store.set("persisted-token".into());
        drop(store);

        let restored = SessionStore::persistent(&path);
        assert_eq!(restored.get(), Some("persisted-token".into()));

        restored.clear();
        assert_eq!(restored.get(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_clear_without_file_is_silent() {
        let path = std::env::temp_dir().join("streampass_test_token_missing");
        let store = SessionStore::persistent(&path);
        store.clear();
        assert_eq!(store.get(), None);
    }
}
