//! Motorctl — operator console for the lab motor rig.
//!
//! Quick start:
//!   motorctl login -u alice   # store a session token
//!   motorctl console          # navigate the console, motor pages ask first
//!   motorctl log              # see what happened in the last console session
//!
//! For more info: motorctl --help

use clap::{Parser, Subcommand};
use colored::Colorize;
use motorctl::audit::JournalReader;
use motorctl::cli;
use motorctl::cli::console::{ConsoleOptions, PromptMode};
use motorctl::client::api::{API_URL_ENV, DEFAULT_API_URL};
use motorctl::routes::parser::load_table;
use motorctl::session::SessionStore;
use std::path::{Path, PathBuf};

/// Motorctl — operator console for the lab motor rig.
///
/// Log in to the motor backend, navigate the console's pages (motor pages
/// ask for confirmation first), and stop motors from the command line.
#[derive(Parser)]
#[command(
    name = "motorctl",
    version,
    about = "Operator console for the lab motor rig",
    long_about = "Motorctl guards navigation between the console's pages:\n\
                  protected pages need a session, and motor pages ask\n\
                  before they open.\n\n\
                  Quick start:\n  \
                  motorctl login -u <user>   # store a session token\n  \
                  motorctl console           # open the console\n  \
                  motorctl log               # see what happened"
)]
struct Cli {
    /// Motor backend base URL
    #[arg(long, global = true, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Route table YAML (built-in lab console table if not given)
    #[arg(long, global = true)]
    routes: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(short, long, help = "Username")]
        username: String,

        #[arg(short, long, help = "Password (read from stdin if not given)")]
        password: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Show motor status
    Status {
        #[arg(help = "Motor: tilt, rotary, peristaltic (all if not given)")]
        motor: Option<String>,
    },

    /// Stop a motor
    Stop {
        #[arg(help = "Motor: tilt, rotary, peristaltic")]
        motor: String,
    },

    /// Open the interactive console
    Console {
        /// Page to open first
        #[arg(long, default_value = "/")]
        start: String,

        /// Confirm every motor page without asking
        #[arg(long, conflicts_with = "auto_cancel")]
        auto_confirm: bool,

        /// Cancel every motor page without asking
        #[arg(long)]
        auto_cancel: bool,
    },

    /// List the console's pages
    Routes,

    /// Validate a route table file
    Check {
        /// Path to route table (built-in table if not given)
        file: Option<PathBuf>,
    },

    /// See what happened in a console session
    Log {
        #[arg(short, long, help = "Session ID to view")]
        session: Option<String>,

        #[arg(
            short,
            long,
            help = "Filter: allowed, redirected, pended, confirmed, cancelled"
        )]
        outcome: Option<String>,

        #[arg(short, long, help = "Max entries to show")]
        limit: Option<usize>,

        #[arg(long, help = "Show only the session summary")]
        summary: bool,

        #[arg(long, help = "List all recorded sessions")]
        list: bool,
    },
}

#[tokio::main]
async fn main() {
    // Only warnings by default; RUST_LOG=motorctl=debug shows guard decisions
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "motorctl=warn".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    let routes = cli.routes.as_deref();

    let result = match cli.command {
        None => show_overview(routes),

        Some(Commands::Login { username, password }) => {
            cli::auth::run_login(&cli.api_url, &username, password.as_deref()).await
        }

        Some(Commands::Logout) => cli::auth::run_logout(),

        Some(Commands::Status { motor }) => {
            cli::status::run_status(&cli.api_url, motor.as_deref()).await
        }

        Some(Commands::Stop { motor }) => cli::status::run_stop(&cli.api_url, &motor).await,

        Some(Commands::Console {
            start,
            auto_confirm,
            auto_cancel,
        }) => {
            let prompt_mode = if auto_confirm {
                PromptMode::AutoConfirm
            } else if auto_cancel {
                PromptMode::AutoCancel
            } else {
                PromptMode::Terminal
            };
            let options = ConsoleOptions {
                api_url: cli.api_url.clone(),
                routes_path: cli.routes.clone(),
                start,
                prompt_mode,
            };
            cli::console::run_console(options).await
        }

        Some(Commands::Routes) => cli::routes::run_routes(routes),

        Some(Commands::Check { file }) => cli::routes::run_check(file.as_deref().or(routes)),

        Some(Commands::Log {
            session,
            outcome,
            limit,
            summary,
            list,
        }) => {
            if list {
                cli::log::run_log_list()
            } else {
                cli::log::run_log(session.as_deref(), outcome.as_deref(), limit, summary)
            }
        }
    };

    if let Err(e) = result {
        eprintln!();
        eprintln!("  {} {}", "✗".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
        eprintln!();
        std::process::exit(1);
    }
}

/// When the user just types `motorctl`: session state, route table and
/// the last console session.
fn show_overview(routes: Option<&Path>) -> anyhow::Result<()> {
    let table = load_table(routes)?;
    let session = SessionStore::open_default()?;

    println!();
    println!("  {}  {}", "motorctl".bold(), table.console_name().dimmed());
    println!(
        "  {}",
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".dimmed()
    );
    println!();
    if session.has_session() {
        println!("  Session: {}", "logged in".green());
    } else {
        println!("  Session: {}", "not logged in".yellow());
    }
    println!(
        "  Pages:   {} ({} motor)",
        table.routes().len(),
        table.motor_routes().count()
    );

    if let Ok(reader) = JournalReader::new() {
        if let Ok(entries) = reader.read_latest_session() {
            if !entries.is_empty() {
                let summary = JournalReader::summarize(&entries);
                println!("  Last session: {}", summary.one_line().dimmed());
            }
        }
    }

    println!();
    println!("  {}", "Commands:".dimmed());
    println!("    {}       store a session token", "motorctl login".bold());
    println!("    {}     open the console", "motorctl console".bold());
    println!("    {}      motor status", "motorctl status".bold());
    println!("    {}         see what happened", "motorctl log".bold());
    println!();

    Ok(())
}
