//! `motorctl log` — browse the navigation journal.
//!
//! Shows what happened in a console session: every page the operator tried
//! to open, where the guard sent them, and which motor pages were confirmed
//! or cancelled.

use crate::audit::{JournalFilter, JournalReader, OutcomeFilter};
use anyhow::{bail, Context, Result};
use colored::Colorize;

/// Run the `motorctl log` command.
pub fn run_log(
    session_id: Option<&str>,
    outcome: Option<&str>,
    limit: Option<usize>,
    summary_only: bool,
) -> Result<()> {
    let reader = JournalReader::new().context("Failed to initialize journal reader")?;

    let outcome = match outcome {
        Some(name) => match OutcomeFilter::from_str_loose(name) {
            Some(filter) => Some(filter),
            None => bail!(
                "Unknown outcome '{}': use allowed, redirected, pended, confirmed or cancelled",
                name
            ),
        },
        None => None,
    };

    let entries = if let Some(sid) = session_id {
        reader
            .read_session(sid)
            .with_context(|| format!("Failed to read session: {}", sid))?
    } else {
        let entries = reader.read_latest_session()?;
        if entries.is_empty() {
            println!();
            println!("  {} No journal entries found.", "ℹ".blue());
            println!("  Open the console first:");
            println!("    {}", "motorctl console".dimmed());
            println!();
            return Ok(());
        }
        entries
    };

    let filter = JournalFilter { outcome, limit };
    let filtered = JournalReader::filter_entries(&entries, &filter);
    let summary = JournalReader::summarize(&entries);

    println!();
    if summary_only {
        println!("  {} Session: {}", "📋".bold(), summary.session_id.cyan());
        println!();
        println!(
            "  {} events | {} allowed | {} redirected | {} held | {} confirmed | {} cancelled",
            summary.total_events.to_string().bold(),
            summary.allowed.to_string().green().bold(),
            summary.redirected.to_string().blue().bold(),
            summary.pended.to_string().yellow().bold(),
            summary.confirmed.to_string().yellow(),
            summary.cancelled.to_string().red().bold(),
        );
        if let (Some(start), Some(end)) = (summary.start_time, summary.end_time) {
            println!(
                "  Duration: {}",
                format_duration((end - start).num_seconds())
            );
        }
    } else {
        println!("  Session: {}", summary.session_id.cyan());
        println!();
        for entry in &filtered {
            println!("  {}", JournalReader::format_entry(entry));
        }
        println!();
        println!("  {} {}", "─".repeat(40).dimmed(), summary.one_line().dimmed());
    }
    println!();

    Ok(())
}

/// List available sessions.
pub fn run_log_list() -> Result<()> {
    let reader = JournalReader::new()?;
    let sessions = reader.list_sessions()?;

    println!();
    if sessions.is_empty() {
        println!("  {} No sessions found.", "ℹ".blue());
        println!();
        return Ok(());
    }

    println!("  {} Available sessions:", "📋".bold());
    println!();
    for session in &sessions {
        println!("  • {}", session);
    }
    println!();
    println!("  View a session: {}", "motorctl log --session <id>".dimmed());
    println!();

    Ok(())
}

fn format_duration(seconds: i64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
