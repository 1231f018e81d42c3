//! YAML route table parser.
//!
//! Parses a route table file into a validated `RouteTable`. Routes require a
//! session unless they say `requires_auth: false`, so forgetting the flag
//! never exposes a page.
//!
//! # Example route table:
//! ```yaml
//! console: lab-console-v1
//! login: Login
//! dashboard: Dashboard
//! calibration: PeristalticMotorCalibration
//! run: PeristalticMotor
//! routes:
//!   - name: Login
//!     path: /login
//!     requires_auth: false
//!   - name: Dashboard
//!     path: /
//!   - name: TiltMotor
//!     path: /tilt-motor
//!     motor: true
//! ```

use crate::routes::types::*;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Raw YAML representation before validation.
#[derive(Debug, Deserialize)]
struct RawRouteTable {
    console: String,
    #[serde(default)]
    description: Option<String>,
    login: String,
    dashboard: String,
    calibration: String,
    run: String,
    routes: Vec<RawRoute>,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    name: String,
    path: String,
    #[serde(default)]
    requires_auth: Option<bool>,
    #[serde(default)]
    motor: bool,
}

/// Parse a YAML route table file from a file path.
pub fn parse_table_file(path: impl AsRef<Path>) -> Result<RouteTable> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read route table: {}", path.display()))?;
    parse_table_str(&content)
        .with_context(|| format!("Failed to parse route table: {}", path.display()))
}

/// Parse a YAML route table string.
pub fn parse_table_str(yaml: &str) -> Result<RouteTable> {
    let raw: RawRouteTable =
        serde_yaml::from_str(yaml).context("Invalid YAML syntax in route table")?;

    let routes = raw
        .routes
        .into_iter()
        .map(|r| RouteDescriptor {
            name: r.name,
            path: r.path,
            requires_auth: r.requires_auth.unwrap_or(true),
            motor: r.motor,
        })
        .collect();

    RouteTable::new(
        raw.console,
        raw.description,
        routes,
        DesignatedRoutes {
            login: raw.login,
            dashboard: raw.dashboard,
            calibration: raw.calibration,
            run: raw.run,
        },
    )
}

/// The built-in lab console table.
pub fn default_table() -> Result<RouteTable> {
    parse_table_str(crate::routes::defaults::LAB_CONSOLE_YAML)
        .context("Built-in route table is invalid")
}

/// Load the table from `path` if given, else the built-in one.
pub fn load_table(path: Option<&Path>) -> Result<RouteTable> {
    match path {
        Some(path) => parse_table_file(path),
        None => default_table(),
    }
}
