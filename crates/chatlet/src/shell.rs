// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chatlet shell` command implementation.
//!
//! Launches an interactive session with a colored prompt and readline
//! history. Every edit of the prompt line reaches the widget as an input
//! change, so the draft survives leaving mid-sentence and typing status
//! follows the keyboard. The widget's events are rendered as they arrive; a
//! background probe keeps the online marker current.

use std::io::IsTerminal;
use std::ops::Deref;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chatlet_bus::WidgetEvent;
use chatlet_config::model::ThemeOverrides;
use chatlet_config::ChatletConfig;
use chatlet_core::{ChatletError, DurableStore, FileUpload, Outcome};
use chatlet_storage::SqliteStore;
use chatlet_transport::HttpTransport;
use chatlet_widget::{ChatWidget, ConnectivityProbe};
use colored::Colorize;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::render::{format_event, format_message};

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Quit,
    Help,
    Toggle,
    Upload(String),
    Theme { key: String, value: String },
    Chat(String),
    Empty,
    Invalid(String),
}

fn parse_line(line: &str) -> ShellCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ShellCommand::Empty;
    }
    if !trimmed.starts_with('/') {
        return ShellCommand::Chat(line.to_string());
    }

    let (command, rest) = trimmed
        .split_once(char::is_whitespace)
        .map(|(c, r)| (c, r.trim()))
        .unwrap_or((trimmed, ""));
    match command {
        "/quit" | "/exit" => ShellCommand::Quit,
        "/help" => ShellCommand::Help,
        "/toggle" => ShellCommand::Toggle,
        "/upload" if !rest.is_empty() => ShellCommand::Upload(rest.to_string()),
        "/upload" => ShellCommand::Invalid("usage: /upload <path>".to_string()),
        "/theme" => match rest.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
                ShellCommand::Theme {
                    key: key.trim().to_string(),
                    value: value.trim().to_string(),
                }
            }
            _ => ShellCommand::Invalid("usage: /theme key=value".to_string()),
        },
        other => ShellCommand::Invalid(format!("unknown command {other}, try /help")),
    }
}

/// Reads a file and guesses its MIME type from the extension.
async fn read_upload(path: &Path) -> Result<FileUpload, ChatletError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        ChatletError::Internal(format!("failed to read {}: {e}", path.display()))
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = mime_guess::from_path(path).first_or_octet_stream();
    Ok(FileUpload::new(name, mime_type.essence_str(), bytes))
}

/// Forwards prompt edits to the widget's input field.
///
/// Lines starting with `/` are commands and never become the draft.
struct DraftReporter<W> {
    widget: W,
    last: Mutex<String>,
}

impl<W: Deref<Target = ChatWidget>> DraftReporter<W> {
    fn new(widget: W) -> Self {
        let last = Mutex::new(widget.draft());
        Self { widget, last }
    }

    /// Reports `line` if it differs from the last reported text.
    fn changed(&self, line: &str) -> bool {
        if line.trim_start().starts_with('/') {
            return false;
        }
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if *last == line {
            return false;
        }
        line.clone_into(&mut *last);
        self.widget.input(line);
        true
    }

    /// Sends the line the user pressed Enter on.
    async fn submit(&self, line: &str) -> Option<Outcome> {
        self.changed(line);
        let outcome = self.widget.submit().await;
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        outcome
    }

    fn draft(&self) -> String {
        let draft = self.widget.draft();
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = draft.clone();
        draft
    }
}

// rustyline asks for a hint after every edit; that is the change hook.
impl<W: Deref<Target = ChatWidget>> Hinter for DraftReporter<W> {
    type Hint = String;

    fn hint(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        self.changed(line);
        None
    }
}

impl<W: Deref<Target = ChatWidget>> Completer for DraftReporter<W> {
    type Candidate = String;
}

impl<W: Deref<Target = ChatWidget>> Highlighter for DraftReporter<W> {}

impl<W: Deref<Target = ChatWidget>> Validator for DraftReporter<W> {}

impl<W: Deref<Target = ChatWidget>> Helper for DraftReporter<W> {}

/// Runs the `chatlet shell` interactive session.
pub async fn run_shell(config: ChatletConfig) -> Result<(), ChatletError> {
    let store: Arc<dyn DurableStore> = Arc::new(SqliteStore::from_config(&config.storage)?);
    let transport = Arc::new(HttpTransport::from_config(&config)?);

    let (probe, connectivity) = ConnectivityProbe::new(
        transport.clone(),
        Duration::from_secs(config.presence.probe_interval_secs),
        true,
    );
    let cancel = CancellationToken::new();
    let probe_task = probe.spawn(cancel.clone());

    let widget = Arc::new(ChatWidget::start(&config, store, transport, connectivity)?);
    let use_color = std::io::stdout().is_terminal();
    let renderer = tokio::spawn(render_events(widget.subscribe(), use_color, cancel.clone()));

    let mut rl: Editor<DraftReporter<Arc<ChatWidget>>, DefaultHistory> = Editor::new()
        .map_err(|e| ChatletError::Internal(format!("failed to initialize readline: {e}")))?;
    rl.set_helper(Some(DraftReporter::new(widget.clone())));

    println!("{}", widget.title().bold().green());
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());
    for message in widget.transcript() {
        println!("{}", format_message(&message, use_color));
    }

    let prompt = format!("{}> ", "chatlet".green());
    loop {
        // The saved draft is pre-filled and stays editable.
        let draft = rl.helper().map(DraftReporter::draft).unwrap_or_default();
        let read =
            tokio::task::block_in_place(|| rl.readline_with_initial(&prompt, (draft.as_str(), "")));
        let line = match read {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        let command = parse_line(&line);
        if !matches!(command, ShellCommand::Empty) {
            let _ = rl.add_history_entry(&line);
        }

        match command {
            ShellCommand::Quit => break,
            ShellCommand::Empty => {}
            ShellCommand::Help => print_help(),
            ShellCommand::Toggle => {
                widget.toggle();
            }
            ShellCommand::Theme { key, value } => match ThemeOverrides::single(&key, value) {
                Some(overrides) => widget.update_theme(overrides),
                None => eprintln!("{}: unknown theme key {key}", "error".red()),
            },
            ShellCommand::Upload(path) => match read_upload(Path::new(&path)).await {
                Ok(file) => {
                    debug!(file = %file.name, mime = %file.mime_type, size = file.size(), "uploading");
                    widget.upload_file(file).await;
                }
                Err(e) => eprintln!("{}: {e}", "error".red()),
            },
            ShellCommand::Chat(text) => {
                if let Some(drafts) = rl.helper() {
                    drafts.submit(&text).await;
                }
            }
            ShellCommand::Invalid(usage) => eprintln!("{}", usage.yellow()),
        }
    }

    info!("shell session ended");
    cancel.cancel();
    let _ = probe_task.await;
    let _ = renderer.await;
    Ok(())
}

async fn render_events(
    mut events: broadcast::Receiver<WidgetEvent>,
    use_color: bool,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    if let Some(line) = format_event(&event, use_color) {
                        println!("{line}");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "renderer fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = cancel.cancelled() => break,
        }
    }
}

fn print_help() {
    println!("  /upload <path>     send an image");
    println!("  /toggle            open or close the chat window");
    println!("  /theme key=value   change one theme value");
    println!("  /quit              leave the shell");
}
