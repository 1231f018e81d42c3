//! Confirmation bridge — the presentation side of the motor-safety gate.
//!
//! The guard parks a motor-page entry as a pending navigation; the bridge
//! shows it and resolves it. Confirm arms the one-shot bypass and re-issues
//! the navigation, cancel just drops it. Both are no-ops when nothing is
//! pending, so a double click cannot navigate twice.

pub mod terminal;
pub mod types;

use crate::audit::{JournalEvent, SharedJournal};
use crate::guard::{NavigationOutcome, PendingNavigation, Router, SharedGuardState};
use anyhow::Result;
use async_trait::async_trait;

pub use terminal::{AutoCancel, AutoConfirm, TerminalPrompt};
pub use types::{PromptChoice, Resolution};

/// Trait for confirmation prompts.
/// Implementations can be terminal-based, scripted, etc.
#[async_trait]
pub trait ConfirmationPrompt {
    async fn ask(&self, pending: &PendingNavigation) -> Result<PromptChoice>;
}

/// Exposes the pending navigation and the confirm/cancel commands.
pub struct ConfirmationBridge {
    state: SharedGuardState,
    journal: Option<SharedJournal>,
}

impl ConfirmationBridge {
    /// Bridge over the router's own guard state (and journal, if any).
    pub fn for_router(router: &Router) -> Self {
        Self {
            state: router.guard().state().clone(),
            journal: router.journal().cloned(),
        }
    }

    /// The pending navigation, for presentation.
    pub fn pending(&self) -> Option<PendingNavigation> {
        self.state.pending()
    }

    /// Confirm the pending navigation and re-issue it.
    /// Returns `None` when nothing was pending.
    pub fn confirm(&self, router: &mut Router) -> Option<(PendingNavigation, NavigationOutcome)> {
        let pending = self.state.take_pending()?;
        tracing::info!("confirmed navigation to {}", pending.target);
        self.record(&pending, JournalEvent::Confirmed);

        self.state.arm_bypass();
        let outcome = router.push(pending.target.clone());
        Some((pending, outcome))
    }

    /// Drop the pending navigation without navigating.
    /// Returns the cancelled navigation, or `None` when nothing was pending.
    pub fn cancel(&self) -> Option<PendingNavigation> {
        let pending = self.state.take_pending()?;
        tracing::info!("cancelled navigation to {}", pending.target);
        self.record(&pending, JournalEvent::Cancelled);
        Some(pending)
    }

    /// Ask `prompt` about the pending navigation and apply the answer.
    pub async fn resolve_with(
        &self,
        router: &mut Router,
        prompt: &(dyn ConfirmationPrompt + Send + Sync),
    ) -> Result<Option<Resolution>> {
        let Some(pending) = self.pending() else {
            return Ok(None);
        };

        let resolution = match prompt.ask(&pending).await? {
            PromptChoice::Confirm => match self.confirm(router) {
                Some((pending, outcome)) => Resolution::Confirmed { pending, outcome },
                None => Resolution::Deferred,
            },
            PromptChoice::Cancel => match self.cancel() {
                Some(pending) => Resolution::Cancelled { pending },
                None => Resolution::Deferred,
            },
            PromptChoice::Later => Resolution::Deferred,
        };

        Ok(Some(resolution))
    }

    fn record(&self, pending: &PendingNavigation, event: JournalEvent) {
        if let Some(ref journal) = self.journal {
            let from = pending.origin.as_ref().map(|l| l.full_path());
            journal.record(from.as_deref(), &pending.target.full_path(), event);
        }
    }
}
