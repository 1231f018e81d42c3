//! Navigation guard decision engine.
//!
//! Evaluates a navigation attempt `(from, to)` against the route table and
//! returns a decision: Allow, Redirect, or Pend (hold for confirmation).
//!
//! Checks run **in order** and the first match wins:
//! 1. auth gate: protected target without a session → login, `redirect=<target>`
//! 2. post-login: login target with a session → dashboard
//! 3. bypass: a confirmed transition passes once
//! 4. calibration → run: passes without confirmation
//! 5. motor safety: route-to-route entry into a motor page → pend
//! 6. default: allow
//!
//! Auth runs before everything, so the safety gate can never leak a
//! protected page. Bypass runs before the safety gate, otherwise a confirmed
//! retry would prompt again.
//!
//! `evaluate` is pure; `NavigationGuard` wraps it with the session lookup and
//! the shared guard state.

use crate::guard::state::{PendingNavigation, SharedGuardState};
use crate::routes::{Location, RouteTable};
use crate::session::SessionStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Query key carrying the originally intended path on auth redirects.
pub const REDIRECT_QUERY: &str = "redirect";

/// Which check produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardRule {
    AuthGate,
    PostLogin,
    Bypass,
    CalibrationExemption,
    MotorSafety,
    Default,
}

impl fmt::Display for GuardRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardRule::AuthGate => write!(f, "auth_gate"),
            GuardRule::PostLogin => write!(f, "post_login"),
            GuardRule::Bypass => write!(f, "bypass"),
            GuardRule::CalibrationExemption => write!(f, "calibration_exemption"),
            GuardRule::MotorSafety => write!(f, "motor_safety"),
            GuardRule::Default => write!(f, "default"),
        }
    }
}

/// The result of evaluating a navigation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Navigation may complete.
    Allow { rule: GuardRule },
    /// Navigation goes to `to` instead.
    Redirect { to: Location, rule: GuardRule },
    /// Navigation is held until a human confirms it; the router stays put.
    Pend { target: Location },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Decision::Pend { .. })
    }

    /// Which check produced this decision.
    pub fn rule(&self) -> GuardRule {
        match self {
            Decision::Allow { rule } | Decision::Redirect { rule, .. } => *rule,
            Decision::Pend { .. } => GuardRule::MotorSafety,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow { rule } => write!(f, "allowed ({})", rule),
            Decision::Redirect { to, rule } => write!(f, "redirected to {} ({})", to, rule),
            Decision::Pend { target } => write!(f, "held for confirmation: {}", target),
        }
    }
}

/// Evaluate one navigation attempt. Pure: no state is read or written.
///
/// `from` is `None` on the initial load. `bypass_set` is the value of the
/// one-shot bypass flag the caller has already consumed.
pub fn evaluate(
    table: &RouteTable,
    from: Option<&Location>,
    to: &Location,
    session_present: bool,
    bypass_set: bool,
) -> Decision {
    if table.requires_auth(&to.path) && !session_present {
        let login = Location::new(&table.login_route().path)
            .with_query(REDIRECT_QUERY, to.full_path());
        return Decision::Redirect {
            to: login,
            rule: GuardRule::AuthGate,
        };
    }

    if table.is_login(&to.path) && session_present {
        return Decision::Redirect {
            to: Location::new(&table.dashboard_route().path),
            rule: GuardRule::PostLogin,
        };
    }

    if bypass_set {
        return Decision::Allow {
            rule: GuardRule::Bypass,
        };
    }

    if let Some(from) = from {
        if table.is_calibration(&from.path) && table.is_run(&to.path) {
            return Decision::Allow {
                rule: GuardRule::CalibrationExemption,
            };
        }

        if table.is_motor(&to.path) {
            return Decision::Pend { target: to.clone() };
        }
    }

    Decision::Allow {
        rule: GuardRule::Default,
    }
}

/// The guard the router runs on every navigation attempt.
///
/// Holds the route table, a session handle and the shared guard state. The
/// confirmation bridge holds the same state handle.
#[derive(Clone)]
pub struct NavigationGuard {
    table: Arc<RouteTable>,
    session: SessionStore,
    state: SharedGuardState,
}

impl NavigationGuard {
    pub fn new(table: RouteTable, session: SessionStore, state: SharedGuardState) -> Self {
        Self {
            table: Arc::new(table),
            session,
            state,
        }
    }

    /// Evaluate an attempt and apply its effect on the guard state.
    ///
    /// The bypass flag is taken (and so cleared) before any check runs,
    /// whichever check ends up deciding. A `Pend` replaces any earlier
    /// pending navigation; other decisions leave it alone.
    pub fn check(&self, from: Option<&Location>, to: &Location) -> Decision {
        let bypass = self.state.take_bypass();
        let session_present = self.session.has_session();
        let decision = evaluate(&self.table, from, to, session_present, bypass);

        let from_path = from.map(Location::full_path);
        tracing::debug!(
            from = from_path.as_deref().unwrap_or("(start)"),
            to = %to,
            session = session_present,
            bypass,
            "navigation {}",
            decision
        );

        if let Decision::Pend { target } = &decision {
            let pending = PendingNavigation {
                target: target.clone(),
                route: self.table.resolve(&target.path).map(|r| r.name.clone()),
                origin: from.cloned(),
            };
            if let Some(previous) = self.state.set_pending(pending) {
                tracing::debug!("pending navigation to {} superseded", previous.target);
            }
        }

        decision
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn state(&self) -> &SharedGuardState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::parser::default_table;

    fn loc(path: &str) -> Location {
        Location::parse(path)
    }

    fn eval(from: Option<&str>, to: &str, session: bool, bypass: bool) -> Decision {
        let table = default_table().unwrap();
        let from = from.map(loc);
        evaluate(&table, from.as_ref(), &loc(to), session, bypass)
    }

    #[test]
    fn test_auth_gate_redirects_with_return_path() {
        let table = default_table().unwrap();
        for route in table.routes().iter().filter(|r| r.requires_auth) {
            let decision = eval(Some("/login"), &route.path, false, false);
            match decision {
                Decision::Redirect { to, rule } => {
                    assert_eq!(rule, GuardRule::AuthGate);
                    assert_eq!(to.path, "/login");
                    assert_eq!(to.query_value(REDIRECT_QUERY), Some(route.path.as_str()));
                }
                other => panic!("{} should redirect to login, got {:?}", route.path, other),
            }
        }
    }

    #[test]
    fn test_auth_gate_keeps_query_in_return_path() {
        let decision = eval(None, "/measurements-history?entry=4", false, false);
        match decision {
            Decision::Redirect { to, .. } => {
                assert_eq!(
                    to.query_value(REDIRECT_QUERY),
                    Some("/measurements-history?entry=4")
                );
            }
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_auth_dominates_bypass() {
        let decision = eval(Some("/"), "/tilt-motor", false, true);
        assert_eq!(decision.rule(), GuardRule::AuthGate);
    }

    #[test]
    fn test_login_with_session_goes_to_dashboard() {
        for from in [None, Some("/"), Some("/tilt-motor")] {
            let decision = eval(from, "/login", true, false);
            assert_eq!(
                decision,
                Decision::Redirect {
                    to: loc("/"),
                    rule: GuardRule::PostLogin
                }
            );
        }
    }

    #[test]
    fn test_login_without_session_allowed() {
        assert!(eval(None, "/login", false, false).is_allowed());
    }

    #[test]
    fn test_motor_route_pends_from_any_route() {
        let table = default_table().unwrap();
        for motor in table.motor_routes() {
            for from in table.routes() {
                if table.is_calibration(&from.path) && table.is_run(&motor.path) {
                    continue;
                }
                let decision = eval(Some(&from.path), &motor.path, true, false);
                assert_eq!(
                    decision,
                    Decision::Pend {
                        target: loc(&motor.path)
                    },
                    "{} -> {}",
                    from.path,
                    motor.path
                );
            }
        }
    }

    #[test]
    fn test_bypass_allows_motor_route() {
        let decision = eval(Some("/"), "/rotary-motor", true, true);
        assert_eq!(
            decision,
            Decision::Allow {
                rule: GuardRule::Bypass
            }
        );
    }

    #[test]
    fn test_calibration_to_run_exempt() {
        for bypass in [false, true] {
            let decision = eval(
                Some("/peristaltic-motor-calibration"),
                "/peristaltic-motor",
                true,
                bypass,
            );
            assert!(decision.is_allowed());
        }
        assert_eq!(
            eval(
                Some("/peristaltic-motor-calibration"),
                "/peristaltic-motor",
                true,
                false
            )
            .rule(),
            GuardRule::CalibrationExemption
        );
    }

    #[test]
    fn test_exemption_is_one_directional() {
        let decision = eval(
            Some("/peristaltic-motor-tube-configurations"),
            "/peristaltic-motor",
            true,
            false,
        );
        assert!(decision.is_pending());
    }

    #[test]
    fn test_initial_load_into_motor_route_allowed() {
        let decision = eval(None, "/tilt-motor", true, false);
        assert_eq!(
            decision,
            Decision::Allow {
                rule: GuardRule::Default
            }
        );
    }

    #[test]
    fn test_unknown_route_is_ordinary() {
        assert!(eval(Some("/"), "/does-not-exist", false, false).is_allowed());
        assert!(eval(Some("/"), "/does-not-exist", true, false).is_allowed());
    }

    #[test]
    fn test_guard_consumes_bypass_on_every_outcome() {
        let table = default_table().unwrap();
        let session = SessionStore::in_memory();
        let state = SharedGuardState::new();
        let guard = NavigationGuard::new(table, session.clone(), state.clone());

        // Auth gate wins, bypass still consumed
        state.arm_bypass();
        let decision = guard.check(Some(&loc("/")), &loc("/tilt-motor"));
        assert_eq!(decision.rule(), GuardRule::AuthGate);
        assert!(!state.bypass_armed());

        // Post-login wins, bypass still consumed
        session.set_token("t").unwrap();
        state.arm_bypass();
        guard.check(Some(&loc("/")), &loc("/login"));
        assert!(!state.bypass_armed());

        // Bypass wins exactly once
        state.arm_bypass();
        assert!(guard.check(Some(&loc("/")), &loc("/tilt-motor")).is_allowed());
        assert!(guard.check(Some(&loc("/")), &loc("/tilt-motor")).is_pending());
    }

    #[test]
    fn test_guard_records_pending_and_supersedes() {
        let table = default_table().unwrap();
        let session = SessionStore::in_memory();
        session.set_token("t").unwrap();
        let state = SharedGuardState::new();
        let guard = NavigationGuard::new(table, session, state.clone());

        guard.check(Some(&loc("/")), &loc("/tilt-motor"));
        let pending = state.pending().unwrap();
        assert_eq!(pending.target, loc("/tilt-motor"));
        assert_eq!(pending.route.as_deref(), Some("TiltMotor"));
        assert_eq!(pending.origin, Some(loc("/")));

        guard.check(Some(&loc("/")), &loc("/rotary-motor"));
        assert_eq!(state.pending().unwrap().target, loc("/rotary-motor"));

        // An allowed navigation does not cancel what is pending
        guard.check(Some(&loc("/")), &loc("/measurements-history"));
        assert_eq!(state.pending().unwrap().target, loc("/rotary-motor"));
    }
}
