//! Router adapter — runs the guard on every navigation and applies its
//! decision to the current location.
//!
//! Allow commits the navigation, Redirect re-enters the guard with the new
//! target (from the same origin), Pend leaves the router where it was.

use crate::audit::{JournalEvent, SharedJournal};
use crate::guard::engine::{Decision, NavigationGuard};
use crate::routes::Location;

/// Redirect hops followed before a navigation is abandoned.
pub const MAX_REDIRECTS: usize = 4;

/// What a navigation attempt ended in.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    /// The router is now at `at`. `redirects` counts the hops taken.
    Completed { at: Location, redirects: usize },
    /// The target was held for confirmation; the router did not move.
    Held { target: Location },
    /// Redirects did not settle; the router did not move.
    Abandoned { last: Location },
}

impl NavigationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, NavigationOutcome::Completed { .. })
    }

    pub fn is_held(&self) -> bool {
        matches!(self, NavigationOutcome::Held { .. })
    }
}

/// The console's router.
pub struct Router {
    guard: NavigationGuard,
    current: Option<Location>,
    history: Vec<Location>,
    journal: Option<SharedJournal>,
}

impl Router {
    pub fn new(guard: NavigationGuard) -> Self {
        Self {
            guard,
            current: None,
            history: Vec::new(),
            journal: None,
        }
    }

    /// Record every guard decision in a navigation journal.
    pub fn with_journal(mut self, journal: SharedJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Current location. `None` until the first navigation completes.
    pub fn current(&self) -> Option<&Location> {
        self.current.as_ref()
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    pub fn journal(&self) -> Option<&SharedJournal> {
        self.journal.as_ref()
    }

    /// Attempt a navigation from the current location.
    pub fn push(&mut self, to: impl Into<Location>) -> NavigationOutcome {
        let from = self.current.clone();
        let mut target: Location = to.into();

        for hop in 0..=MAX_REDIRECTS {
            let decision = self.guard.check(from.as_ref(), &target);
            self.record(from.as_ref(), &target, JournalEvent::from(&decision));

            match decision {
                Decision::Allow { .. } => {
                    if let Some(previous) = self.current.replace(target.clone()) {
                        self.history.push(previous);
                    }
                    return NavigationOutcome::Completed {
                        at: target,
                        redirects: hop,
                    };
                }
                Decision::Redirect { to, .. } => {
                    target = to;
                }
                Decision::Pend { target } => {
                    return NavigationOutcome::Held { target };
                }
            }
        }

        tracing::warn!("navigation abandoned after {} redirects at {}", MAX_REDIRECTS, target);
        NavigationOutcome::Abandoned { last: target }
    }

    /// Navigate back to the previous location. The guard still applies.
    pub fn back(&mut self) -> Option<NavigationOutcome> {
        let previous = self.history.pop()?;
        let outcome = self.push(previous.clone());
        if outcome.is_completed() {
            // Going back does not add a history entry
            self.history.pop();
        } else {
            self.history.push(previous);
        }
        Some(outcome)
    }

    /// Hard navigation: forget the current location and history, then
    /// navigate as an initial load.
    pub fn reload(&mut self, to: impl Into<Location>) -> NavigationOutcome {
        self.current = None;
        self.history.clear();
        self.push(to)
    }

    pub(crate) fn record(&self, from: Option<&Location>, to: &Location, event: JournalEvent) {
        if let Some(ref journal) = self.journal {
            let from = from.map(Location::full_path);
            journal.record(from.as_deref(), &to.full_path(), event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::state::SharedGuardState;
    use crate::routes::parser::default_table;
    use crate::session::SessionStore;

    fn router(logged_in: bool) -> (Router, SessionStore, SharedGuardState) {
        let session = SessionStore::in_memory();
        if logged_in {
            session.set_token("token").unwrap();
        }
        let state = SharedGuardState::new();
        let guard = NavigationGuard::new(default_table().unwrap(), session.clone(), state.clone());
        (Router::new(guard), session, state)
    }

    #[test]
    fn test_unauthenticated_lands_on_login_with_return_path() {
        let (mut router, _, _) = router(false);
        let outcome = router.push("/rotary-motor");
        match outcome {
            NavigationOutcome::Completed { at, redirects } => {
                assert_eq!(at.path, "/login");
                assert_eq!(at.query_value("redirect"), Some("/rotary-motor"));
                assert_eq!(redirects, 1);
            }
            other => panic!("expected login, got {:?}", other),
        }
    }

    #[test]
    fn test_logged_in_login_goes_to_dashboard() {
        let (mut router, _, _) = router(true);
        router.push("/measurements-history");
        let outcome = router.push("/login");
        assert_eq!(
            outcome,
            NavigationOutcome::Completed {
                at: Location::new("/"),
                redirects: 1
            }
        );
    }

    #[test]
    fn test_held_navigation_stays_put() {
        let (mut router, _, state) = router(true);
        router.push("/");
        let outcome = router.push("/tilt-motor");
        assert!(outcome.is_held());
        assert_eq!(router.current(), Some(&Location::new("/")));
        assert!(state.pending().is_some());
    }

    #[test]
    fn test_initial_load_into_motor_page() {
        let (mut router, _, state) = router(true);
        let outcome = router.push("/tilt-motor");
        assert!(outcome.is_completed());
        assert_eq!(router.current(), Some(&Location::new("/tilt-motor")));
        assert!(state.pending().is_none());
    }

    #[test]
    fn test_back_runs_the_guard() {
        let (mut router, _, _) = router(true);
        router.push("/tilt-motor");
        router.push("/measurements-history");

        // Back into a motor page is a route-to-route entry: held
        let outcome = router.back().unwrap();
        assert!(outcome.is_held());
        assert_eq!(router.current(), Some(&Location::new("/measurements-history")));

        // History entry survives for a later attempt
        assert!(router.back().unwrap().is_held());
    }

    #[test]
    fn test_back_without_history() {
        let (mut router, _, _) = router(true);
        assert!(router.back().is_none());
        router.push("/");
        assert!(router.back().is_none());
    }

    #[test]
    fn test_reload_is_initial_load() {
        let (mut router, session, _) = router(true);
        router.push("/");
        router.push("/measurements-history");
        session.clear().unwrap();

        let outcome = router.reload("/login");
        assert_eq!(
            outcome,
            NavigationOutcome::Completed {
                at: Location::new("/login"),
                redirects: 0
            }
        );
        assert!(router.back().is_none());
    }
}
