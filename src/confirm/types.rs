//! Types for the confirmation flow.

use crate::guard::{NavigationOutcome, PendingNavigation};

/// The operator's answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    /// Enter the motor page
    Confirm,
    /// Stay where we are and drop the pending navigation
    Cancel,
    /// Leave the navigation pending and decide later
    Later,
}

/// What resolving a pending navigation did.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Confirmed; the re-issued navigation ended in `outcome`
    Confirmed {
        pending: PendingNavigation,
        outcome: NavigationOutcome,
    },
    /// Cancelled; the router stayed put
    Cancelled { pending: PendingNavigation },
    /// Still pending
    Deferred,
}
