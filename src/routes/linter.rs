//! Route table linter — flags tables the guard would enforce badly.
//!
//! `motorctl check` runs these after a table parses. None of them are hard
//! errors (the table is usable), but each one weakens either the auth gate
//! or the motor-safety gate.

use crate::routes::types::*;
use colored::Colorize;

/// A lint warning about a route table.
#[derive(Debug)]
pub struct LintWarning {
    pub severity: Severity,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Severity {
    /// Weakens a safety or security gate
    Warning,
    /// Probably unintended
    Info,
}

impl LintWarning {
    fn warn_with_fix(msg: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: msg.into(),
            suggestion: Some(fix.into()),
        }
    }

    fn info(msg: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: msg.into(),
            suggestion: None,
        }
    }

    /// Format for terminal output.
    pub fn display(&self) -> String {
        let icon = match self.severity {
            Severity::Warning => "⚠".yellow().to_string(),
            Severity::Info => "ℹ".blue().to_string(),
        };
        let mut out = format!("  {} {}", icon, self.message);
        if let Some(ref suggestion) = self.suggestion {
            out.push_str(&format!("\n    {}: {}", "Fix".green(), suggestion));
        }
        out
    }
}

/// Lint a route table and return warnings.
pub fn lint_table(table: &RouteTable) -> Vec<LintWarning> {
    let mut warnings = Vec::new();

    check_motor_routes_exist(table, &mut warnings);
    check_motor_routes_protected(table, &mut warnings);
    check_dashboard(table, &mut warnings);
    check_exemption(table, &mut warnings);
    check_unprotected_pages(table, &mut warnings);

    warnings
}

fn check_motor_routes_exist(table: &RouteTable, warnings: &mut Vec<LintWarning>) {
    if table.motor_routes().next().is_none() {
        warnings.push(LintWarning::warn_with_fix(
            "No route is marked as a motor page: the confirmation prompt will never show",
            "Add `motor: true` to every page that can move hardware",
        ));
    }
}

fn check_motor_routes_protected(table: &RouteTable, warnings: &mut Vec<LintWarning>) {
    for route in table.motor_routes().filter(|r| !r.requires_auth) {
        warnings.push(LintWarning::warn_with_fix(
            format!(
                "Motor page '{}' ({}) is reachable without logging in",
                route.name, route.path
            ),
            format!("Remove `requires_auth: false` from '{}'", route.name),
        ));
    }
}

fn check_dashboard(table: &RouteTable, warnings: &mut Vec<LintWarning>) {
    let dashboard = table.dashboard_route();
    if dashboard.motor {
        warnings.push(LintWarning::warn_with_fix(
            format!(
                "The dashboard '{}' is a motor page: logged-in users landing on the login page will be asked to confirm",
                dashboard.name
            ),
            "Point `dashboard:` at a page without `motor: true`",
        ));
    }
    if !dashboard.requires_auth {
        warnings.push(LintWarning::info(format!(
            "The dashboard '{}' does not require a session",
            dashboard.name
        )));
    }
}

fn check_exemption(table: &RouteTable, warnings: &mut Vec<LintWarning>) {
    let calibration = table.calibration_route();
    let run = table.run_route();

    if calibration.name == run.name {
        warnings.push(LintWarning::info(format!(
            "The calibration and run routes are both '{}': the no-confirm shortcut has no effect",
            run.name
        )));
        return;
    }
    if !run.motor {
        warnings.push(LintWarning::info(format!(
            "The run route '{}' is not a motor page: the calibration shortcut is unnecessary",
            run.name
        )));
    }
    if calibration.motor {
        warnings.push(LintWarning::info(format!(
            "The calibration route '{}' is itself a motor page",
            calibration.name
        )));
    }
}

fn check_unprotected_pages(table: &RouteTable, warnings: &mut Vec<LintWarning>) {
    let login = table.login_route();
    for route in table
        .routes()
        .iter()
        .filter(|r| !r.requires_auth && !r.motor && r.name != login.name)
    {
        warnings.push(LintWarning::info(format!(
            "Page '{}' ({}) is public",
            route.name, route.path
        )));
    }
}
