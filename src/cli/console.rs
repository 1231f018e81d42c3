//! `motorctl console` — the interactive operator console.
//!
//! A line-based shell over the router: every `go` runs through the
//! navigation guard, held motor-page entries go to the confirmation prompt,
//! and a 401 from the backend reloads the console at the login page.

use crate::audit::{JournalLogger, SharedJournal};
use crate::client::{ApiClient, ApiError, ForcedRedirect, Motor};
use crate::confirm::{
    AutoCancel, AutoConfirm, ConfirmationBridge, ConfirmationPrompt, Resolution, TerminalPrompt,
};
use crate::guard::{NavigationGuard, NavigationOutcome, Router, SharedGuardState};
use crate::routes::parser::load_table;
use crate::routes::{Location, RouteTable};
use crate::session::SessionStore;
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// How held navigations get answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptMode {
    #[default]
    Terminal,
    AutoConfirm,
    AutoCancel,
}

/// Options for the console.
#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    pub api_url: String,
    pub routes_path: Option<PathBuf>,
    pub start: String,
    pub prompt_mode: PromptMode,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            api_url: crate::client::api::DEFAULT_API_URL.to_string(),
            routes_path: None,
            start: "/".to_string(),
            prompt_mode: PromptMode::Terminal,
        }
    }
}

/// A parsed console input line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Go(String),
    Back,
    Where,
    Pending,
    Confirm,
    Cancel,
    Routes,
    Status,
    Stop(Motor),
    Login { username: String, password: String },
    Logout,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

/// Parse one line of console input.
pub fn parse_command(line: &str) -> ConsoleCommand {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return ConsoleCommand::Empty;
    };
    let args: Vec<&str> = words.collect();

    match (verb.to_lowercase().as_str(), args.as_slice()) {
        ("go" | "open" | "cd", [path]) => ConsoleCommand::Go(path.to_string()),
        ("go" | "open" | "cd", _) => ConsoleCommand::Invalid("usage: go <path>".to_string()),
        ("back", []) => ConsoleCommand::Back,
        ("where" | "pwd", []) => ConsoleCommand::Where,
        ("pending", []) => ConsoleCommand::Pending,
        ("confirm" | "yes", []) => ConsoleCommand::Confirm,
        ("cancel" | "no", []) => ConsoleCommand::Cancel,
        ("routes", []) => ConsoleCommand::Routes,
        ("status", []) => ConsoleCommand::Status,
        ("stop", [motor]) => match Motor::from_str_loose(motor) {
            Some(motor) => ConsoleCommand::Stop(motor),
            None => ConsoleCommand::Invalid(format!(
                "unknown motor '{}': use tilt, rotary or peristaltic",
                motor
            )),
        },
        ("stop", _) => ConsoleCommand::Invalid("usage: stop <tilt|rotary|peristaltic>".to_string()),
        ("login", [username, password]) => ConsoleCommand::Login {
            username: username.to_string(),
            password: password.to_string(),
        },
        ("login", _) => ConsoleCommand::Invalid("usage: login <username> <password>".to_string()),
        ("logout", []) => ConsoleCommand::Logout,
        ("help" | "?", _) => ConsoleCommand::Help,
        ("quit" | "exit" | "q", _) => ConsoleCommand::Quit,
        (other, _) => ConsoleCommand::Invalid(format!("unknown command '{}' (try `help`)", other)),
    }
}

/// Everything a running console holds.
struct Console {
    router: Router,
    bridge: ConfirmationBridge,
    client: ApiClient,
    redirect: ForcedRedirect,
    prompt: Box<dyn ConfirmationPrompt + Send + Sync>,
}

/// Run the interactive console.
pub async fn run_console(options: ConsoleOptions) -> Result<()> {
    let table = load_table(options.routes_path.as_deref())?;
    let session = SessionStore::open_default().context("Failed to open session store")?;
    let redirect = ForcedRedirect::new();
    let client = ApiClient::new(&options.api_url, session.clone(), Arc::new(redirect.clone()))?;

    let session_id = uuid::Uuid::new_v4().to_string();
    let journal = match JournalLogger::new(&session_id) {
        Ok(logger) => Some(SharedJournal::new(logger)),
        Err(e) => {
            tracing::warn!("Navigation journal disabled: {:#}", e);
            None
        }
    };

    let prompt: Box<dyn ConfirmationPrompt + Send + Sync> = match options.prompt_mode {
        PromptMode::Terminal => Box::new(TerminalPrompt::new()),
        PromptMode::AutoConfirm => Box::new(AutoConfirm),
        PromptMode::AutoCancel => Box::new(AutoCancel),
    };

    let mut console = Console::new(table, session, client, redirect, journal, prompt);

    println!();
    println!(
        "  {}  {}",
        "motorctl".bold(),
        console.router.guard().table().console_name().dimmed()
    );
    println!("  Session: {}", session_id.dimmed());
    println!("  Type {} for commands.", "help".bold());
    println!();

    console.navigate(&options.start).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        console.apply_forced_redirect();

        print!("  {} ", console.prompt_label());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        if !console.dispatch(parse_command(&line)).await? {
            break;
        }
    }

    Ok(())
}

impl Console {
    fn new(
        table: RouteTable,
        session: SessionStore,
        client: ApiClient,
        redirect: ForcedRedirect,
        journal: Option<SharedJournal>,
        prompt: Box<dyn ConfirmationPrompt + Send + Sync>,
    ) -> Self {
        let guard = NavigationGuard::new(table, session, SharedGuardState::new());
        let mut router = Router::new(guard);
        if let Some(journal) = journal {
            router = router.with_journal(journal);
        }
        let bridge = ConfirmationBridge::for_router(&router);

        Self {
            router,
            bridge,
            client,
            redirect,
            prompt,
        }
    }

    /// Reload at the login page if a 401 asked for it since the last command.
    fn apply_forced_redirect(&mut self) {
        if self.redirect.take() {
            self.reload_at_login();
        }
    }

    fn at_login(&self) -> bool {
        let table = self.router.guard().table();
        self.router
            .current()
            .is_some_and(|at| table.is_login(&at.path))
    }

    fn prompt_label(&self) -> String {
        let at = self
            .router
            .current()
            .map(|l| l.path.clone())
            .unwrap_or_else(|| "-".to_string());
        if self.bridge.pending().is_some() {
            format!("{} {}>", at.cyan(), "(pending)".yellow())
        } else {
            format!("{}>", at.cyan())
        }
    }

    /// Run one command. Returns false when the console should exit.
    async fn dispatch(&mut self, command: ConsoleCommand) -> Result<bool> {
        match command {
            ConsoleCommand::Go(path) => self.navigate(&path).await?,
            ConsoleCommand::Back => match self.router.back() {
                Some(outcome) => self.after_navigation(outcome).await?,
                None => println!("  {} Nowhere to go back to.", "ℹ".blue()),
            },
            ConsoleCommand::Where => match self.router.current() {
                Some(at) => println!("  {}", at.full_path().bold()),
                None => println!("  {}", "(nowhere yet)".dimmed()),
            },
            ConsoleCommand::Pending => match self.bridge.pending() {
                Some(pending) => println!(
                    "  {} {} is waiting for confirmation",
                    "⚠".yellow(),
                    pending.target.full_path().bold()
                ),
                None => println!("  {} Nothing pending.", "ℹ".blue()),
            },
            ConsoleCommand::Confirm => match self.bridge.confirm(&mut self.router) {
                Some((_, outcome)) => print_outcome(&outcome),
                None => println!("  {} Nothing to confirm.", "ℹ".blue()),
            },
            ConsoleCommand::Cancel => match self.bridge.cancel() {
                Some(pending) => println!(
                    "  {} Cancelled {}",
                    "✗".red(),
                    pending.target.full_path()
                ),
                None => println!("  {} Nothing to cancel.", "ℹ".blue()),
            },
            ConsoleCommand::Routes => {
                crate::cli::routes::print_table(self.router.guard().table());
            }
            ConsoleCommand::Status => match self.client.general_status().await {
                Ok(status) => crate::cli::status::print_general_status(&status),
                Err(e) => print_api_error(&e),
            },
            ConsoleCommand::Stop(motor) => match self.client.stop(motor).await {
                Ok(ack) => crate::cli::status::print_ack(motor, &ack),
                Err(e) => print_api_error(&e),
            },
            ConsoleCommand::Login { username, password } => {
                self.login(&username, &password).await?;
            }
            ConsoleCommand::Logout => {
                self.client.logout()?;
                println!("  {} Logged out.", "✓".green());
                let login = self.router.guard().table().login_route().path.clone();
                self.navigate(&login).await?;
            }
            ConsoleCommand::Help => print_help(),
            ConsoleCommand::Quit => return Ok(false),
            ConsoleCommand::Empty => {}
            ConsoleCommand::Invalid(message) => println!("  {} {}", "?".yellow(), message),
        }
        Ok(true)
    }

    async fn navigate(&mut self, path: &str) -> Result<()> {
        let outcome = self.router.push(Location::parse(path));
        self.after_navigation(outcome).await
    }

    /// Report an outcome; held navigations go straight to the prompt.
    async fn after_navigation(&mut self, outcome: NavigationOutcome) -> Result<()> {
        print_outcome(&outcome);
        if !outcome.is_held() {
            return Ok(());
        }

        match self
            .bridge
            .resolve_with(&mut self.router, self.prompt.as_ref())
            .await?
        {
            Some(Resolution::Confirmed { outcome, .. }) => print_outcome(&outcome),
            Some(Resolution::Cancelled { pending }) => {
                println!("  {} Stayed put; {} cancelled.", "✗".red(), pending.target.path)
            }
            Some(Resolution::Deferred) | None => {}
        }
        Ok(())
    }

    /// Log in, then resume the page the login redirect was carrying.
    async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        if let Err(e) = self.client.login(username, password).await {
            // A rejected login is a 401 too. On the login page already, keep
            // its redirect target; anywhere else the reload still applies.
            if e.is_unauthorized() && self.at_login() {
                self.redirect.take();
            }
            print_api_error(&e);
            return Ok(());
        }
        println!("  {} Logged in as {}", "✓".green(), username.bold());

        let resume = self
            .router
            .current()
            .and_then(|at| at.query_value(crate::guard::engine::REDIRECT_QUERY))
            .map(str::to_string);
        let target = resume.unwrap_or_else(|| self.router.guard().table().dashboard_route().path.clone());
        self.navigate(&target).await
    }

    fn reload_at_login(&mut self) {
        println!();
        println!(
            "  {} Session expired or rejected. Back to the login page.",
            "⚠".yellow()
        );
        let login = self.router.guard().table().login_route().path.clone();
        let outcome = self.router.reload(Location::new(login));
        print_outcome(&outcome);
    }
}

fn print_outcome(outcome: &NavigationOutcome) {
    match outcome {
        NavigationOutcome::Completed { at, redirects } => {
            if *redirects > 0 {
                println!("  {} Redirected to {}", "→".blue(), at.full_path().bold());
            } else {
                println!("  {} {}", "✓".green(), at.full_path().bold());
            }
        }
        NavigationOutcome::Held { target } => {
            println!(
                "  {} {} is a motor page, confirmation required",
                "⚠".yellow(),
                target.path.bold()
            );
        }
        NavigationOutcome::Abandoned { last } => {
            println!(
                "  {} Navigation abandoned: redirects did not settle (last: {})",
                "✗".red(),
                last
            );
        }
    }
}

fn print_api_error(error: &ApiError) {
    println!("  {} {}", "✗".red(), error);
}

fn print_help() {
    println!();
    println!("  {}", "Navigation".bold());
    println!("    go <path>        open a page (motor pages ask first)");
    println!("    back             previous page");
    println!("    where            current page");
    println!("    pending          show the navigation waiting for confirmation");
    println!("    confirm          open the pending motor page");
    println!("    cancel           drop the pending motor page");
    println!("    routes           list pages");
    println!();
    println!("  {}", "Backend".bold());
    println!("    login <user> <password>");
    println!("    logout");
    println!("    status           motor status");
    println!("    stop <motor>     stop tilt, rotary or peristaltic");
    println!();
    println!("    quit");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::parser::default_table;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// A console over an in-memory session against `server`, rejecting
    /// every login with a 401.
    async fn console_rejecting_logins(server: &MockServer, token: Option<&str>) -> (Console, SessionStore) {
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(server)
            .await;

        let session = SessionStore::in_memory();
        if let Some(token) = token {
            session.set_token(token).unwrap();
        }
        let redirect = ForcedRedirect::new();
        let client = ApiClient::new(&server.uri(), session.clone(), Arc::new(redirect.clone())).unwrap();
        let console = Console::new(
            default_table().unwrap(),
            session.clone(),
            client,
            redirect,
            None,
            Box::new(AutoConfirm),
        );
        (console, session)
    }

    fn at(console: &Console) -> String {
        console.router.current().map(Location::full_path).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_rejected_login_off_the_login_page_reloads_at_login() {
        let server = MockServer::start().await;
        let (mut console, session) = console_rejecting_logins(&server, Some("tok")).await;

        console.navigate("/").await.unwrap();
        console.navigate("/tilt-motor").await.unwrap();
        assert_eq!(at(&console), "/tilt-motor");

        assert!(console.dispatch(parse_command("login bob wrong")).await.unwrap());
        assert!(!session.has_session());

        console.apply_forced_redirect();
        assert_eq!(at(&console), "/login");
        assert!(console.router.back().is_none());
    }

    #[tokio::test]
    async fn test_rejected_login_on_the_login_page_keeps_redirect_target() {
        let server = MockServer::start().await;
        let (mut console, _) = console_rejecting_logins(&server, None).await;

        console.navigate("/rotary-motor").await.unwrap();
        assert_eq!(at(&console), "/login?redirect=%2Frotary-motor");

        console.dispatch(parse_command("login bob wrong")).await.unwrap();
        console.apply_forced_redirect();
        assert_eq!(at(&console), "/login?redirect=%2Frotary-motor");
    }

    #[tokio::test]
    async fn test_unauthorized_status_reloads_at_bare_login() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let (mut console, session) = console_rejecting_logins(&server, Some("tok")).await;

        console.navigate("/measurements-history").await.unwrap();
        console.navigate("/peristaltic-motor-calibration").await.unwrap();
        console.dispatch(ConsoleCommand::Status).await.unwrap();
        assert!(!session.has_session());

        console.apply_forced_redirect();
        assert_eq!(at(&console), "/login");
        assert!(console.router.back().is_none());
    }

    #[test]
    fn test_parse_navigation_commands() {
        assert_eq!(
            parse_command("go /tilt-motor"),
            ConsoleCommand::Go("/tilt-motor".to_string())
        );
        assert_eq!(parse_command("  confirm "), ConsoleCommand::Confirm);
        assert_eq!(parse_command("CANCEL"), ConsoleCommand::Cancel);
        assert_eq!(parse_command("back"), ConsoleCommand::Back);
        assert_eq!(parse_command(""), ConsoleCommand::Empty);
        assert!(matches!(parse_command("go"), ConsoleCommand::Invalid(_)));
    }

    #[test]
    fn test_parse_backend_commands() {
        assert_eq!(parse_command("stop rotate"), ConsoleCommand::Stop(Motor::Rotary));
        assert!(matches!(parse_command("stop spindle"), ConsoleCommand::Invalid(_)));
        assert_eq!(
            parse_command("login alice secret"),
            ConsoleCommand::Login {
                username: "alice".to_string(),
                password: "secret".to_string()
            }
        );
        assert!(matches!(parse_command("login alice"), ConsoleCommand::Invalid(_)));
        assert_eq!(parse_command("quit"), ConsoleCommand::Quit);
        assert!(matches!(parse_command("dance"), ConsoleCommand::Invalid(_)));
    }
}
