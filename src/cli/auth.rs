//! `motorctl login` / `motorctl logout`.

use crate::client::{ApiClient, CountUnauthorized};
use crate::session::SessionStore;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Run the `motorctl login` command.
///
/// The password comes from `--password` or, failing that, one line of stdin.
pub async fn run_login(api_url: &str, username: &str, password: Option<&str>) -> Result<()> {
    let password = match password {
        Some(p) => p.to_string(),
        None => read_password()?,
    };
    if password.is_empty() {
        bail!("Empty password");
    }

    let session = SessionStore::open_default().context("Failed to open session store")?;
    let client = ApiClient::new(api_url, session.clone(), Arc::new(CountUnauthorized::new()))?;

    client
        .login(username, &password)
        .await
        .with_context(|| format!("Login as '{}' failed", username))?;

    println!();
    println!("  {} Logged in as {}", "✓".green(), username.bold());
    if let Ok(path) = crate::utils::paths::token_path() {
        println!("  Token stored at {}", path.display().to_string().dimmed());
    }
    println!();
    Ok(())
}

/// Run the `motorctl logout` command.
pub fn run_logout() -> Result<()> {
    let session = SessionStore::open_default().context("Failed to open session store")?;
    let had_session = session.has_session();
    session.clear()?;

    println!();
    if had_session {
        println!("  {} Logged out.", "✓".green());
    } else {
        println!("  {} No active session.", "ℹ".blue());
    }
    println!();
    Ok(())
}

fn read_password() -> Result<String> {
    print!("  Password: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
