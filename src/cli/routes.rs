//! `motorctl routes` / `motorctl check` — inspect and validate route tables.

use crate::routes::linter::lint_table;
use crate::routes::parser::{load_table, parse_table_file};
use crate::routes::RouteTable;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Run the `motorctl routes` command.
pub fn run_routes(path: Option<&Path>) -> Result<()> {
    let table = load_table(path)?;
    print_table(&table);
    Ok(())
}

/// Print a route table with its designated pages.
pub fn print_table(table: &RouteTable) {
    println!();
    println!("  {} {}", "Console:".bold(), table.console_name().cyan());
    if let Some(description) = table.description() {
        println!("  {}", description.dimmed());
    }
    println!();
    for (i, route) in table.routes().iter().enumerate() {
        println!("  {}. {}{}", i + 1, route.describe(), designation(table, &route.name));
    }
    println!();
}

fn designation(table: &RouteTable, name: &str) -> String {
    let mut roles = Vec::new();
    if table.login_route().name == name {
        roles.push("login");
    }
    if table.dashboard_route().name == name {
        roles.push("dashboard");
    }
    if table.calibration_route().name == name {
        roles.push("calibration");
    }
    if table.run_route().name == name {
        roles.push("run");
    }
    if roles.is_empty() {
        String::new()
    } else {
        format!("  {}", format!("({})", roles.join(", ")).dimmed())
    }
}

/// Run the `motorctl check` command: parse, validate and lint a table.
/// Without a path the built-in table is checked.
pub fn run_check(path: Option<&Path>) -> Result<()> {
    let table = match path {
        Some(path) => parse_table_file(path)
            .with_context(|| format!("Route table {} is invalid", path.display()))?,
        None => load_table(None)?,
    };

    println!();
    println!("  {} Route table is valid!", "✓".green().bold());
    println!("  Console: {}", table.console_name().cyan());
    println!(
        "  Routes:  {} ({} motor)",
        table.routes().len(),
        table.motor_routes().count()
    );
    println!();
    for (i, route) in table.routes().iter().enumerate() {
        println!("  {}. {}", i + 1, route.describe());
    }

    let warnings = lint_table(&table);
    println!();
    if warnings.is_empty() {
        println!("  {} No issues found.", "✓".green());
    } else {
        println!(
            "  {} {} {}:",
            "─".repeat(20).dimmed(),
            warnings.len(),
            if warnings.len() == 1 {
                "suggestion"
            } else {
                "suggestions"
            }
        );
        println!();
        for warning in &warnings {
            println!("{}", warning.display());
        }
    }
    println!();
    Ok(())
}
