//! Terminal confirmation prompt using crossterm.
//!
//! When the guard holds a motor-page navigation, this shows what page is
//! about to open and waits for the operator to confirm or cancel. There is
//! no timeout: the navigation stays pending until someone answers.

use crate::confirm::types::PromptChoice;
use crate::confirm::ConfirmationPrompt;
use crate::guard::PendingNavigation;
use anyhow::Result;
use async_trait::async_trait;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::Write;

/// Terminal prompt: [C] confirm, [X] cancel, [Esc] decide later.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConfirmationPrompt for TerminalPrompt {
    async fn ask(&self, pending: &PendingNavigation) -> Result<PromptChoice> {
        // crossterm reads the terminal synchronously
        let pending = pending.clone();
        tokio::task::spawn_blocking(move || show_confirmation_prompt(&pending)).await?
    }
}

fn show_confirmation_prompt(pending: &PendingNavigation) -> Result<PromptChoice> {
    let mut stdout = std::io::stdout();

    let page = pending
        .route
        .clone()
        .unwrap_or_else(|| pending.target.path.clone());
    let origin = pending
        .origin
        .as_ref()
        .map(|l| l.full_path())
        .unwrap_or_else(|| "(start)".to_string());

    execute!(
        stdout,
        Print("\n"),
        SetForegroundColor(Color::Yellow),
        Print("╔══════════════════════════════════════════════════════════╗\n"),
        Print("║              ⚠  MOTOR CONTROL PAGE                       ║\n"),
        Print("╠══════════════════════════════════════════════════════════╣\n"),
        ResetColor,
        SetForegroundColor(Color::White),
        Print(format!("║  Page:    {:<47}║\n", truncate(&page, 47))),
        Print(format!(
            "║  Path:    {:<47}║\n",
            truncate(&pending.target.full_path(), 47)
        )),
        Print(format!("║  From:    {:<47}║\n", truncate(&origin, 47))),
        SetForegroundColor(Color::Yellow),
        Print("║                                                          ║\n"),
        Print("║  This page can move hardware. Make sure the rig is safe. ║\n"),
        Print("║                                                          ║\n"),
        SetForegroundColor(Color::Green),
        Print("║  [C] Confirm    "),
        SetForegroundColor(Color::Red),
        Print("[X] Cancel    "),
        SetForegroundColor(Color::Blue),
        Print("[Esc] Decide later            "),
        SetForegroundColor(Color::Yellow),
        Print("║\n"),
        Print("╚══════════════════════════════════════════════════════════╝\n"),
        ResetColor,
    )?;
    stdout.flush()?;

    terminal::enable_raw_mode()?;
    let choice = read_choice();
    terminal::disable_raw_mode()?;
    let choice = choice?;

    let (color, label) = match choice {
        PromptChoice::Confirm => (Color::Green, "\n  ✓ Confirmed\n\n"),
        PromptChoice::Cancel => (Color::Red, "\n  ✗ Cancelled\n\n"),
        PromptChoice::Later => (Color::Blue, "\n  … Still pending. Use `confirm` or `cancel` later\n\n"),
    };
    execute!(stdout, SetForegroundColor(color), Print(label), ResetColor)?;
    stdout.flush()?;

    Ok(choice)
}

fn read_choice() -> Result<PromptChoice> {
    loop {
        if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    return Ok(PromptChoice::Confirm);
                }
                KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Char('n') | KeyCode::Char('N') => {
                    return Ok(PromptChoice::Cancel);
                }
                KeyCode::Esc => return Ok(PromptChoice::Later),
                _ => continue,
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Confirms everything without prompting (scripts and tests).
pub struct AutoConfirm;

#[async_trait]
impl ConfirmationPrompt for AutoConfirm {
    async fn ask(&self, _pending: &PendingNavigation) -> Result<PromptChoice> {
        Ok(PromptChoice::Confirm)
    }
}

/// Cancels everything without prompting.
pub struct AutoCancel;

#[async_trait]
impl ConfirmationPrompt for AutoCancel {
    async fn ask(&self, _pending: &PendingNavigation) -> Result<PromptChoice> {
        Ok(PromptChoice::Cancel)
    }
}
