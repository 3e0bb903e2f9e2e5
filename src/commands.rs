//! Terminal commands for Scenewright
//!
//! A line-oriented view over a [`Session`]: parses what the user typed,
//! runs it and renders the resulting state as text.

use anyhow::{bail, Result};
use tracing::debug;

use scenewright_core::{DocumentId, Event, SaveStatus};
use scenewright_editor::{word_label, ConfirmGate, EditorPhase, RemoveOutcome, Session};

/// One terminal command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Filter(String),
    Open(DocumentId),
    New,
    Title(String),
    Write(String),
    Delete(DocumentId),
    Show,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  list               show scenes (filtered by the current search)
  filter [text]      set the search text; empty clears it
  open <id>          open a scene
  new                create a scene and open it
  title <text>       rename the open scene
  write <markup>     replace the open scene's content
  delete <id>        delete a scene (asks first)
  show               print the open scene
  status             print the save status
  help               this text
  quit               leave";

impl Command {
    /// Parse one input line
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_lowercase().as_str() {
            "list" | "ls" => Command::List,
            "filter" | "search" => Command::Filter(rest.to_string()),
            "open" => Command::Open(required_id(verb, rest)?),
            "new" => Command::New,
            "title" => Command::Title(rest.to_string()),
            "write" => Command::Write(rest.to_string()),
            "delete" | "rm" => Command::Delete(required_id(verb, rest)?),
            "show" => Command::Show,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => bail!("empty command"),
            other => bail!("unknown command '{}', try 'help'", other),
        };
        Ok(command)
    }
}

fn required_id(verb: &str, rest: &str) -> Result<DocumentId> {
    if rest.is_empty() {
        bail!("usage: {} <id>", verb);
    }
    Ok(DocumentId::from(rest))
}

/// Run `command` against `session`, returning the text to print
pub async fn execute(session: &Session, command: Command, gate: &dyn ConfirmGate) -> Result<String> {
    debug!("executing {:?}", command);
    let output = match command {
        Command::List => render_list(session),
        Command::Filter(query) => {
            session.set_query(query);
            render_list(session)
        }
        Command::Open(id) => {
            session.select(id).await;
            render_editor(session)
        }
        Command::New => match session.create_scene().await {
            Ok(_) => render_editor(session),
            Err(err) => err.user_message(),
        },
        Command::Title(title) => {
            require_open(session)?;
            if !session.edit_title(title) {
                bail!("the scene is still loading");
            }
            render_status(session)
        }
        Command::Write(markup) => {
            require_open(session)?;
            if !session.edit_content(markup) {
                bail!("the scene is still loading");
            }
            let words = session.editor().word_count();
            format!("{} | {}", word_label(words), render_status(session))
        }
        Command::Delete(id) => match session.delete_scene(&id, gate).await {
            Ok(RemoveOutcome::Removed { .. }) => format!("Deleted {}", id),
            Ok(RemoveOutcome::Declined) => "Kept.".to_string(),
            Ok(RemoveOutcome::NotListed) => format!("No scene with id {}", id),
            Err(err) => err.user_message(),
        },
        Command::Show => render_editor(session),
        Command::Status => render_status(session),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };
    Ok(output)
}

fn require_open(session: &Session) -> Result<()> {
    if session.editor().phase() == EditorPhase::Empty {
        bail!("no scene is open; use 'open <id>' or 'new'");
    }
    Ok(())
}

/// Sidebar listing; the selected scene is marked with `*`
pub fn render_list(session: &Session) -> String {
    let scenes = session.visible_scenes();
    let mut lines = Vec::with_capacity(scenes.len() + 1);
    if session.is_creating() {
        lines.push("Creating a new scene…".to_string());
    }
    if scenes.is_empty() {
        lines.push("No scenes found.".to_string());
    }
    let selected = session.library().selection();
    lines.extend(scenes.iter().map(|s| {
        let marker = if selected.as_ref() == Some(&s.id) { '*' } else { ' ' };
        format!("{} {}  {}", marker, s.id, s.display_title())
    }));
    lines.join("\n")
}

/// Open scene with word count and banner
pub fn render_editor(session: &Session) -> String {
    let view = session.view();
    let mut out = match view.phase {
        EditorPhase::Empty => "No scene open.".to_string(),
        EditorPhase::Loading => "Loading…".to_string(),
        EditorPhase::Ready => format!(
            "# {}\n{}\n({})",
            if view.title.is_empty() { "Untitled scene" } else { view.title.as_str() },
            view.content,
            word_label(view.word_count)
        ),
    };
    if let Some(error) = &view.error {
        out.push_str(&format!("\n! {}", error));
    }
    out
}

pub fn render_status(session: &Session) -> String {
    let editor = session.editor();
    match editor.save_status() {
        SaveStatus::Idle if editor.has_pending_save() => "Unsaved changes".to_string(),
        status => status.label(),
    }
}

/// Line to print for an event that arrives outside of a command, if any.
///
/// Autosaves finish in the background, so their outcome is reported here;
/// everything else is already visible in the command output.
pub fn describe_event(event: &Event) -> Option<String> {
    match event {
        Event::SaveStatusChanged(status @ (SaveStatus::Saved(_) | SaveStatus::Error(_))) => {
            Some(format!("[autosave] {}", status.label()))
        }
        _ => None,
    }
}
