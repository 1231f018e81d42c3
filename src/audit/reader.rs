//! Navigation journal reader — filter and display session journals.
//!
//! Backs the `motorctl log` command.

use crate::audit::types::*;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads and queries journal files.
pub struct JournalReader {
    dir: PathBuf,
}

impl JournalReader {
    /// Create a reader using the default journal directory.
    pub fn new() -> Result<Self> {
        let dir = crate::audit::logger::JournalLogger::journal_directory()?;
        Ok(Self { dir })
    }

    /// Create a reader for a specific directory (for testing).
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Read all entries from a session journal.
    pub fn read_session(&self, session_id: &str) -> Result<Vec<JournalEntry>> {
        let path = self.dir.join(format!("{}.jsonl", session_id));
        self.read_file(&path)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<JournalEntry>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read journal file: {}", path.display()))?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Failed to parse journal entry at line {}", i + 1))
            })
            .collect()
    }

    /// Read entries from the most recent session.
    pub fn read_latest_session(&self) -> Result<Vec<JournalEntry>> {
        match self.find_latest_session()? {
            Some(path) => self.read_file(&path),
            None => Ok(Vec::new()),
        }
    }

    fn find_latest_session(&self) -> Result<Option<PathBuf>> {
        if !self.dir.exists() {
            return Ok(None);
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "jsonl"))
            .collect();

        // Most recently modified first
        entries.sort_by(|a, b| {
            let a_time = fs::metadata(a).and_then(|m| m.modified()).ok();
            let b_time = fs::metadata(b).and_then(|m| m.modified()).ok();
            b_time.cmp(&a_time)
        });

        Ok(entries.into_iter().next())
    }

    /// List all recorded session IDs.
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "jsonl"))
            .filter_map(|e| {
                e.path()
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
            })
            .collect();

        sessions.sort();
        Ok(sessions)
    }

    /// Filter entries based on criteria.
    pub fn filter_entries(entries: &[JournalEntry], filter: &JournalFilter) -> Vec<JournalEntry> {
        entries
            .iter()
            .filter(|e| filter.outcome.map_or(true, |o| o.matches(&e.event)))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Generate a summary for a set of entries.
    pub fn summarize(entries: &[JournalEntry]) -> SessionSummary {
        let mut summary = SessionSummary::default();

        if let Some(first) = entries.first() {
            summary.session_id = first.session_id.clone();
            summary.start_time = Some(first.timestamp);
        }
        if let Some(last) = entries.last() {
            summary.end_time = Some(last.timestamp);
        }

        summary.total_events = entries.len();
        for entry in entries {
            match entry.event {
                JournalEvent::Allowed { .. } => summary.allowed += 1,
                JournalEvent::Redirected { .. } => summary.redirected += 1,
                JournalEvent::Pended => summary.pended += 1,
                JournalEvent::Confirmed => summary.confirmed += 1,
                JournalEvent::Cancelled => summary.cancelled += 1,
            }
        }

        summary
    }

    /// Pretty-print an entry for terminal display.
    pub fn format_entry(entry: &JournalEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S").to_string();
        let label = match &entry.event {
            JournalEvent::Allowed { .. } => "ALLOWED".green().to_string(),
            JournalEvent::Redirected { .. } => "REDIRECT".blue().to_string(),
            JournalEvent::Pended => "HELD".yellow().to_string(),
            JournalEvent::Confirmed => "CONFIRMED".yellow().bold().to_string(),
            JournalEvent::Cancelled => "CANCELLED".red().to_string(),
        };

        let from = entry.from.as_deref().unwrap_or("(start)");
        let mut line = format!(
            "[{}] {} {} -> {}",
            timestamp.dimmed(),
            label,
            from,
            entry.to.bold()
        );

        match &entry.event {
            JournalEvent::Allowed { rule } => {
                line.push_str(&format!(" ({})", rule.to_string().dimmed()));
            }
            JournalEvent::Redirected { rule, location } => {
                line.push_str(&format!(" => {} ({})", location, rule.to_string().dimmed()));
            }
            _ => {}
        }

        line
    }
}
