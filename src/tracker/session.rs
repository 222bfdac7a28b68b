//! Visitor session identity.
//!
//! A session id is created lazily the first time a post is tracked and kept
//! in a `SessionStore` under `heatmap_session_{post_id}`, so a returning
//! visitor is recognized across page loads for as long as the store lives.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::config::SESSION_KEY_PREFIX;
use crate::error_handling::SessionError;

const SESSION_SUFFIX_LEN: usize = 9;

/// Key-value storage for session ids.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
}

/// In-memory store; sessions last as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object on disk.
///
/// The file is read on every access and rewritten on every update; it holds
/// one entry per tracked post.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileSessionStore {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<HashMap<String, String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(HashMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

/// Storage key for a post's session.
pub fn session_key(post_id: &str) -> String {
    format!("{SESSION_KEY_PREFIX}{post_id}")
}

/// Generates a fresh session id: `{millis}-{9 random alphanumerics}`.
pub fn generate_session_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), suffix.to_lowercase())
}

/// Returns the stored session id for `post_id`, creating it on first access.
///
/// A failing store never blocks tracking: the error is returned alongside a
/// fresh, unpersisted id so the caller can count it and carry on.
pub fn get_or_create_session_id(
    store: &dyn SessionStore,
    post_id: &str,
) -> (String, Option<SessionError>) {
    let key = session_key(post_id);
    match store.get(&key) {
        Ok(Some(existing)) if !existing.is_empty() => (existing, None),
        Ok(_) => {
            let id = generate_session_id();
            match store.set(&key, &id) {
                Ok(()) => {
                    log::debug!("Created session {} for post {}", id, post_id);
                    (id, None)
                }
                Err(e) => (id, Some(e)),
            }
        }
        Err(e) => (generate_session_id(), Some(e)),
    }
}
