//! Session store — the one persisted slot holding the access token.
//!
//! Presence of a non-empty token is what "authenticated" means to the
//! navigation guard and the HTTP client. The store never triggers redirects
//! itself; it only persists.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Storage backend for the token slot.
pub trait TokenSlot: Send + Sync {
    /// Read the slot. `None` when empty.
    fn read(&self) -> Result<Option<String>>;
    /// Overwrite the slot.
    fn write(&self, token: &str) -> Result<()>;
    /// Remove the slot. Removing an empty slot is not an error.
    fn remove(&self) -> Result<()>;
}

/// File-backed slot: one file holding the raw token string.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Slot at the default location (`<data dir>/access_token`).
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(crate::utils::paths::token_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenSlot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read session file: {}", self.path.display())),
        }
    }

    fn write(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory: {}", parent.display())
            })?;
        }
        fs::write(&self.path, token)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))
    }

    fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove session file: {}", self.path.display())
            }),
        }
    }
}

/// In-memory slot for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySlot {
    token: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.slot().clone())
    }

    fn write(&self, token: &str) -> Result<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// Handle to the persisted session. Clones share the same slot.
#[derive(Clone)]
pub struct SessionStore {
    slot: Arc<dyn TokenSlot>,
}

impl SessionStore {
    pub fn new(slot: impl TokenSlot + 'static) -> Self {
        Self {
            slot: Arc::new(slot),
        }
    }

    /// Store backed by the default token file.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(FileSlot::default_location()?))
    }

    /// Store backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(MemorySlot::new())
    }

    /// The current token, if one is persisted, exactly as stored.
    /// Blank slot content counts as no token. An unreadable slot is
    /// logged and treated as absent: the guard degrades to "log in again".
    pub fn token(&self) -> Option<String> {
        match self.slot.read() {
            Ok(Some(token)) if token.trim().is_empty() => None,
            Ok(Some(token)) => Some(token),
            Ok(None) => None,
            Err(e) => {
                tracing::error!("Failed to read session token: {:#}", e);
                None
            }
        }
    }

    /// True iff a token is currently persisted.
    pub fn has_session(&self) -> bool {
        self.token().is_some()
    }

    /// Persist a token verbatim, replacing any previous one.
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.slot.write(token)
    }

    /// Remove the persisted token. Idempotent.
    pub fn clear(&self) -> Result<()> {
        self.slot.remove()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("has_session", &self.has_session())
            .finish()
    }
}
