//! Guard state shared by the navigation guard and the confirmation bridge.
//!
//! Two pieces of state: the one-shot bypass flag and at most one pending
//! navigation. Both sides hold clones of the same `SharedGuardState`
//! handle, never copies of the state itself.

use crate::routes::Location;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// A motor-page transition held for human confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNavigation {
    /// Where the navigation was headed
    pub target: Location,
    /// Route name of the target, when the table knows it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Where the router was when the attempt was held
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Location>,
}

/// Guard phase, derived from whether anything is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPhase {
    Idle,
    AwaitingConfirmation,
}

#[derive(Debug, Default)]
struct GuardState {
    bypass: bool,
    pending: Option<PendingNavigation>,
}

/// Handle to the guard state. Clones share one state.
#[derive(Debug, Clone, Default)]
pub struct SharedGuardState {
    inner: Arc<Mutex<GuardState>>,
}

impl SharedGuardState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GuardState> {
        // The state is two plain fields; a panic mid-update cannot leave it torn
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn phase(&self) -> GuardPhase {
        if self.lock().pending.is_some() {
            GuardPhase::AwaitingConfirmation
        } else {
            GuardPhase::Idle
        }
    }

    /// The pending navigation, if any.
    pub fn pending(&self) -> Option<PendingNavigation> {
        self.lock().pending.clone()
    }

    /// Store a pending navigation, returning the one it superseded.
    pub fn set_pending(&self, pending: PendingNavigation) -> Option<PendingNavigation> {
        self.lock().pending.replace(pending)
    }

    /// Remove and return the pending navigation.
    pub fn take_pending(&self) -> Option<PendingNavigation> {
        self.lock().pending.take()
    }

    /// Set the one-shot bypass flag.
    pub fn arm_bypass(&self) {
        self.lock().bypass = true;
    }

    /// Read and clear the bypass flag.
    pub fn take_bypass(&self) -> bool {
        std::mem::take(&mut self.lock().bypass)
    }

    pub fn bypass_armed(&self) -> bool {
        self.lock().bypass
    }

    /// Whether two handles point at the same state.
    pub fn same_as(&self, other: &SharedGuardState) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
