//! Interactive bargaining session on stdin/stdout.

use std::path::PathBuf;

use anyhow::Result;
use bargain_core::transcript::to_json;
use bargain_core::{NegotiationSession, TranscriptExporter, TranscriptFormat};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::config::Settings;
use crate::terminal_output::{note_error, note_info, note_success, note_warn, render_view};

/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayCommand {
    Accept,
    Reject,
    /// Raw counter text; parsing is left to the session.
    Counter(String),
    Reset,
    Show,
    Csv(Option<PathBuf>),
    Json(Option<PathBuf>),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<PlayCommand, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };
    let dir = || (!rest.is_empty()).then(|| PathBuf::from(rest));
    match head.to_ascii_lowercase().as_str() {
        "a" | "accept" => Ok(PlayCommand::Accept),
        "r" | "reject" => Ok(PlayCommand::Reject),
        "c" | "counter" => Ok(PlayCommand::Counter(rest.to_string())),
        "n" | "new" | "reset" => Ok(PlayCommand::Reset),
        "" | "s" | "show" => Ok(PlayCommand::Show),
        "csv" => Ok(PlayCommand::Csv(dir())),
        "json" => Ok(PlayCommand::Json(dir())),
        "h" | "help" | "?" => Ok(PlayCommand::Help),
        "q" | "quit" | "exit" => Ok(PlayCommand::Quit),
        other => Err(format!("unknown command '{other}' (type 'help')")),
    }
}

fn help_text(counter_enabled: bool) -> String {
    let mut lines = vec![
        "  a, accept          accept the current offer",
        "  r, reject          reject and move to the next round",
    ];
    if counter_enabled {
        lines.push("  c, counter <x>     counter with A's share x in [0, 1]");
    }
    lines.extend([
        "  n, reset           start a new session",
        "  csv [dir]          write the transcript as CSV",
        "  json [dir]         print the transcript as JSON, or write it to dir",
        "  q, quit            leave",
    ]);
    lines.join("\n")
}

pub async fn run(settings: Settings) -> Result<()> {
    let session_config = settings.session_config()?;
    let format = TranscriptFormat::for_policy(&session_config.policy);
    let counter_enabled = session_config.policy.supports_counter();
    let mut session = match settings.seed() {
        Some(seed) => NegotiationSession::with_seed(session_config, seed),
        None => NegotiationSession::new(session_config),
    };
    session.start()?;
    info!(session_id = %session.session_id(), variant = ?settings.variant(), "Interactive session ready");

    println!("{}\n", help_text(counter_enabled));
    println!("{}", render_view(&session.view(), counter_enabled));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(c) => c,
            Err(msg) => {
                note_warn(&msg);
                continue;
            }
        };

        let applied = match command {
            PlayCommand::Accept => session.accept(),
            PlayCommand::Reject => session.reject(),
            PlayCommand::Counter(raw) if counter_enabled => session.counter_input(&raw),
            PlayCommand::Counter(_) => {
                note_warn("this variant has no counter-offers; accept or reject");
                continue;
            }
            PlayCommand::Reset => session.reset(),
            PlayCommand::Show => Ok(true),
            PlayCommand::Csv(dir) => {
                export_csv(&session, dir, format).await;
                continue;
            }
            PlayCommand::Json(dir) => {
                export_json(&session, dir).await;
                continue;
            }
            PlayCommand::Help => {
                println!("{}", help_text(counter_enabled));
                continue;
            }
            PlayCommand::Quit => break,
        };

        match applied {
            Ok(true) => {}
            Ok(false) => note_info("session is over; 'n' starts a new one"),
            Err(e) => {
                warn!(error = %e, "Session action failed");
                note_error(&e.to_string());
            }
        }
        println!("{}", render_view(&session.view(), counter_enabled));
    }

    Ok(())
}

async fn export_csv(session: &NegotiationSession, dir: Option<PathBuf>, format: TranscriptFormat) {
    let exporter = TranscriptExporter::new(dir.unwrap_or_else(|| PathBuf::from(".")));
    match exporter
        .write_csv(session.session_id(), session.history(), format)
        .await
    {
        Ok(path) => note_success(&format!("wrote {}", path.display())),
        Err(e) => note_error(&e.to_string()),
    }
}

async fn export_json(session: &NegotiationSession, dir: Option<PathBuf>) {
    let result = match dir {
        Some(dir) => TranscriptExporter::new(dir)
            .write_json(session.session_id(), session.history())
            .await
            .map(|path| note_success(&format!("wrote {}", path.display()))),
        None => to_json(session.history()).map(|json| println!("{json}")),
    };
    if let Err(e) = result {
        note_error(&e.to_string());
    }
}
