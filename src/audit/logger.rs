//! Navigation journal writer — append-only JSONL files.
//!
//! Writes to `~/.motorctl/journal/{session_id}.jsonl`, one JSON object per
//! line, flushing after every write.

use crate::audit::types::{JournalEntry, JournalEvent};
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Append-only journal writer.
pub struct JournalLogger {
    /// Session this journal belongs to
    session_id: String,
    /// Path to the journal file
    log_path: PathBuf,
    /// Open file handle (kept open for the session lifetime)
    file: File,
    /// Number of entries written this session
    entry_count: usize,
}

impl JournalLogger {
    /// Create a journal for a console session in the default directory.
    pub fn new(session_id: &str) -> Result<Self> {
        let dir = Self::journal_directory()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create journal directory: {}", dir.display()))?;
        Self::open(session_id, dir.join(format!("{}.jsonl", session_id)))
    }

    /// Create a journal writing to a specific path (for testing).
    pub fn with_path(session_id: &str, path: impl AsRef<Path>) -> Result<Self> {
        let log_path = path.as_ref().to_path_buf();
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::open(session_id, log_path)
    }

    fn open(session_id: &str, log_path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open journal file: {}", log_path.display()))?;

        Ok(Self {
            session_id: session_id.to_string(),
            log_path,
            file,
            entry_count: 0,
        })
    }

    /// Append an entry. Flushes immediately.
    pub fn log(&mut self, entry: &JournalEntry) -> Result<()> {
        let json = serde_json::to_string(entry).context("Failed to serialize journal entry")?;
        writeln!(self.file, "{}", json).context("Failed to write journal entry")?;
        self.file.flush().context("Failed to flush journal file")?;
        self.entry_count += 1;
        Ok(())
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Get the default journal directory (~/.motorctl/journal/).
    pub fn journal_directory() -> Result<PathBuf> {
        crate::utils::paths::journal_directory()
    }
}

/// Journal handle shared by the router and the confirmation bridge.
#[derive(Clone)]
pub struct SharedJournal {
    inner: Arc<Mutex<JournalLogger>>,
}

impl SharedJournal {
    pub fn new(logger: JournalLogger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(logger)),
        }
    }

    /// Record an event. Failures are logged, never propagated:
    /// a broken journal must not block navigation.
    pub fn record(&self, from: Option<&str>, to: &str, event: JournalEvent) {
        let mut logger = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = JournalEntry {
            timestamp: Utc::now(),
            session_id: logger.session_id().to_string(),
            from: from.map(str::to_string),
            to: to.to_string(),
            event,
        };
        if let Err(e) = logger.log(&entry) {
            tracing::error!("Failed to write navigation journal: {:#}", e);
        }
    }

    pub fn entry_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry_count()
    }
}
