//! Types for the navigation journal.
//!
//! Every navigation attempt the guard evaluates gets one entry, and so does
//! every confirm/cancel of a pending motor-page transition.

use crate::guard::engine::{Decision, GuardRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry in the navigation journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// When this happened
    pub timestamp: DateTime<Utc>,

    /// Console session identifier (UUID, generated at `motorctl console` start)
    pub session_id: String,

    /// Where the router was (None on the initial load)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Where the navigation was headed
    pub to: String,

    /// What happened
    pub event: JournalEvent,
}

/// What a journal entry records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEvent {
    /// The guard let the navigation through
    Allowed { rule: GuardRule },
    /// The guard sent the navigation elsewhere
    Redirected { rule: GuardRule, location: String },
    /// The guard parked the navigation for confirmation
    Pended,
    /// The operator confirmed a pending navigation
    Confirmed,
    /// The operator cancelled a pending navigation
    Cancelled,
}

impl From<&Decision> for JournalEvent {
    fn from(decision: &Decision) -> Self {
        match decision {
            Decision::Allow { rule } => JournalEvent::Allowed { rule: *rule },
            Decision::Redirect { to, rule } => JournalEvent::Redirected {
                rule: *rule,
                location: to.full_path(),
            },
            Decision::Pend { .. } => JournalEvent::Pended,
        }
    }
}

/// Summary statistics for a session's journal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub total_events: usize,
    pub allowed: usize,
    pub redirected: usize,
    pub pended: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl SessionSummary {
    /// Format as a human-readable one-liner for terminal output.
    pub fn one_line(&self) -> String {
        format!(
            "{} events | {} allowed | {} redirected | {} held | {} confirmed | {} cancelled",
            self.total_events,
            self.allowed,
            self.redirected,
            self.pended,
            self.confirmed,
            self.cancelled
        )
    }
}

/// Filter criteria for querying the journal.
#[derive(Debug, Clone, Default)]
pub struct JournalFilter {
    pub outcome: Option<OutcomeFilter>,
    pub limit: Option<usize>,
}

/// Filter for event kinds in journal queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeFilter {
    Allowed,
    Redirected,
    Pended,
    Confirmed,
    Cancelled,
}

impl OutcomeFilter {
    /// Parse a filter name, accepting a few aliases.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().trim() {
            "allowed" | "allow" => Some(OutcomeFilter::Allowed),
            "redirected" | "redirect" => Some(OutcomeFilter::Redirected),
            "pended" | "pending" | "held" | "blocked" => Some(OutcomeFilter::Pended),
            "confirmed" | "confirm" => Some(OutcomeFilter::Confirmed),
            "cancelled" | "canceled" | "cancel" => Some(OutcomeFilter::Cancelled),
            _ => None,
        }
    }

    pub fn matches(&self, event: &JournalEvent) -> bool {
        matches!(
            (self, event),
            (OutcomeFilter::Allowed, JournalEvent::Allowed { .. })
                | (OutcomeFilter::Redirected, JournalEvent::Redirected { .. })
                | (OutcomeFilter::Pended, JournalEvent::Pended)
                | (OutcomeFilter::Confirmed, JournalEvent::Confirmed)
                | (OutcomeFilter::Cancelled, JournalEvent::Cancelled)
        )
    }
}
