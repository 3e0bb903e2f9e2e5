//! Scenewright
//!
//! Main application entry point: loads the configuration, sets up logging,
//! builds the store adapter and runs the terminal view.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scenewright::build_store;
use scenewright::commands::{self, Command};
use scenewright_core::config::LoggingConfig;
use scenewright_core::{AppConfig, EventBus, APP_NAME, VERSION};
use scenewright_editor::{ConfirmGate, Session};

/// Asks on the terminal
struct StdinConfirm;

impl ConfirmGate for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().await?;
    init_logging(&config.logging);

    info!("{} v{} starting...", APP_NAME, VERSION);

    let store = build_store(&config.store)?;
    let session = Session::new(store, &config.editor, Arc::new(EventBus::new()));

    if let Err(err) = session.start().await {
        warn!("Starting without a scene list: {}", err);
    }

    // Autosaves complete in the background; report their outcome as it lands.
    let updates = session.events().subscribe();
    std::thread::spawn(move || {
        while let Ok(event) = updates.recv() {
            if let Some(line) = commands::describe_event(&event) {
                println!("{}", line);
            }
        }
    });

    println!("{}", commands::render_list(&session));
    println!("{}", commands::render_editor(&session));
    println!("Type 'help' for commands.");

    // The main future runs on this thread, so blocking on stdin here leaves
    // the runtime workers free to fire autosaves.
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        match commands::execute(&session, command, &StdinConfirm).await {
            Ok(output) => println!("{}", output),
            Err(err) => println!("{}", err),
        }
    }

    wait_for_autosave(&session, config.editor.autosave_delay()).await;
    info!("Goodbye");
    Ok(())
}

/// Install the fmt subscriber; `RUST_LOG` overrides the configured level
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_file(config.show_location)
        .with_line_number(config.show_location)
        .init();
}

/// Give a pending or in-flight autosave the chance to land before exit
async fn wait_for_autosave(session: &Session, delay: Duration) {
    let deadline = tokio::time::Instant::now() + delay * 2 + Duration::from_secs(5);
    while session.editor().has_outstanding_save() {
        if tokio::time::Instant::now() >= deadline {
            warn!("Exiting with an autosave still outstanding");
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
