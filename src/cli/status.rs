//! `motorctl status` / `motorctl stop` — one-shot backend calls.

use crate::client::protocol::{ApiResponse, GeneralStatus, MotorSummary};
use crate::client::{ApiClient, ApiError, CountUnauthorized, Motor};
use crate::session::SessionStore;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::sync::Arc;

fn client(api_url: &str) -> Result<ApiClient> {
    let session = SessionStore::open_default().context("Failed to open session store")?;
    if !session.has_session() {
        bail!("Not logged in. Run `motorctl login -u <username>` first.");
    }
    ApiClient::new(api_url, session, Arc::new(CountUnauthorized::new()))
}

/// Run the `motorctl status` command.
pub async fn run_status(api_url: &str, motor: Option<&str>) -> Result<()> {
    let client = client(api_url)?;

    match motor {
        Some(name) => {
            let motor = parse_motor(name)?;
            let status = client
                .motor_status(motor)
                .await
                .map_err(explain)
                .with_context(|| format!("Failed to read {} motor status", motor))?;

            println!();
            println!("  {} {}", format!("{}:", motor).bold(), status.status);
            if let Some(position) = status.position {
                println!("    position:    {}", position);
            }
            println!("    moving:      {}", yes_no(status.is_moving));
            println!("    initialized: {}", yes_no(status.initialized));
            println!();
        }
        None => {
            let status = client
                .general_status()
                .await
                .map_err(explain)
                .context("Failed to read motor status")?;
            print_general_status(&status);
        }
    }
    Ok(())
}

/// Run the `motorctl stop` command.
pub async fn run_stop(api_url: &str, motor: &str) -> Result<()> {
    let motor = parse_motor(motor)?;
    let ack = client(api_url)?
        .stop(motor)
        .await
        .map_err(explain)
        .with_context(|| format!("Failed to stop {} motor", motor))?;
    print_ack(motor, &ack);
    if !ack.success {
        bail!("Backend refused to stop the {} motor", motor);
    }
    Ok(())
}

/// Print the combined status of all motors.
pub fn print_general_status(status: &GeneralStatus) {
    println!();
    println!("  {}", "Motor status".bold());
    for motor in Motor::ALL {
        println!("  {}", summary_line(motor, status.get(motor)));
    }
    let moving = status.moving();
    if !moving.is_empty() {
        let names: Vec<String> = moving.iter().map(|m| m.to_string()).collect();
        println!();
        println!("  {} Moving: {}", "⚠".yellow(), names.join(", "));
    }
    println!();
}

/// Print a stop acknowledgement.
pub fn print_ack(motor: Motor, ack: &ApiResponse) {
    let icon = if ack.success {
        "✓".green()
    } else {
        "✗".red()
    };
    println!("  {} {}: {}", icon, motor, ack.message);
}

fn summary_line(motor: Motor, summary: &MotorSummary) -> String {
    let state = if summary.is_moving {
        "moving".yellow().to_string()
    } else {
        summary
            .status
            .clone()
            .unwrap_or_else(|| "unknown".to_string())
    };
    let position = summary
        .position
        .map(|p| format!("@ {}", p))
        .unwrap_or_default();
    let init = if summary.initialized {
        String::new()
    } else {
        "(not initialized)".dimmed().to_string()
    };
    format!("{:<12} {:<10} {} {}", motor.to_string(), state, position, init)
        .trim_end()
        .to_string()
}

fn parse_motor(name: &str) -> Result<Motor> {
    Motor::from_str_loose(name)
        .with_context(|| format!("Unknown motor '{}': use tilt, rotary or peristaltic", name))
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// A 401 has already cleared the session by the time it reaches here.
fn explain(error: ApiError) -> anyhow::Error {
    if error.is_unauthorized() {
        anyhow::Error::new(error).context("Session expired. Run `motorctl login` again.")
    } else {
        anyhow::Error::new(error)
    }
}
