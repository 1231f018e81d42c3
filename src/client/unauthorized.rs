//! What the client does to the UI when the backend answers 401.
//!
//! The client clears the session itself; the handler is the "send the user
//! back to the login page" half, kept behind a trait so the client can be
//! tested without a console around it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Collaborator invoked after a 401 cleared the session.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self);
}

/// Requests a hard reload of the console at the login page.
///
/// The console polls `take()` before each command and performs the reload
/// through `Router::reload`, which drops the current location so the login
/// page loads as an initial navigation.
#[derive(Debug, Clone, Default)]
pub struct ForcedRedirect {
    requested: Arc<AtomicBool>,
}

impl ForcedRedirect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a reload was requested; clears the request.
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

impl UnauthorizedHandler for ForcedRedirect {
    fn on_unauthorized(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }
}

/// Counts 401s and does nothing else. For one-shot CLI commands and tests.
#[derive(Debug, Clone, Default)]
pub struct CountUnauthorized {
    count: Arc<AtomicUsize>,
}

impl CountUnauthorized {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl UnauthorizedHandler for CountUnauthorized {
    fn on_unauthorized(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_redirect_take_clears() {
        let redirect = ForcedRedirect::new();
        assert!(!redirect.take());

        let handle = redirect.clone();
        handle.on_unauthorized();
        assert!(redirect.is_requested());
        assert!(redirect.take());
        assert!(!redirect.take());
    }

    #[test]
    fn test_counter() {
        let counter = CountUnauthorized::new();
        counter.on_unauthorized();
        counter.clone().on_unauthorized();
        assert_eq!(counter.count(), 2);
    }
}
