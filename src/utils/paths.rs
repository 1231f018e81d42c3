//! Path helpers: the console's data directory and route path normalization.
//!
//! Everything motorctl persists (session token, navigation journal) lives
//! under one data directory, `~/.motorctl/` unless `MOTORCTL_HOME` says
//! otherwise.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable that overrides the data directory.
pub const HOME_ENV: &str = "MOTORCTL_HOME";

/// Name of the persisted session slot inside the data directory.
pub const TOKEN_FILE: &str = "access_token";

/// Get the data directory (`$MOTORCTL_HOME` or `~/.motorctl/`).
pub fn data_directory() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".motorctl"))
}

/// Path of the persisted session token.
pub fn token_path() -> Result<PathBuf> {
    Ok(data_directory()?.join(TOKEN_FILE))
}

/// Directory holding the navigation journal files.
pub fn journal_directory() -> Result<PathBuf> {
    Ok(data_directory()?.join("journal"))
}

/// Normalize a route path for lookup.
/// Strips the query and fragment, collapses `//`, ensures a leading `/`
/// and drops a trailing `/` (except for the root itself).
pub fn normalize_route_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or("").trim();

    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }

    if normalized.is_empty() {
        "/".to_string()
    } else {
        normalized
    }
}
