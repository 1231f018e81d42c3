pub mod engine;
pub mod router;
pub mod state;

pub use engine::{evaluate, Decision, GuardRule, NavigationGuard};
pub use router::{NavigationOutcome, Router};
pub use state::{GuardPhase, PendingNavigation, SharedGuardState};
