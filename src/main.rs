mod cli;
mod config;
mod core;
mod error;
mod logging;
mod tui;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::core::{ChatBackend, ChatSession, HttpBackend, Submission, VideoId};
use crate::error::{Error, Result};
use crate::logging::{LogTarget, init_logging};
use crate::tui::{App, EventHandler, init as tui_init, restore as tui_restore, ui};
use clap::Parser;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{}", error_report(&e));
        std::process::exit(1);
    }
}

/// Text printed to stderr when a command fails.
fn error_report(e: &Error) -> String {
    match e {
        Error::InvalidVideo => e.to_string(),
        _ => format!("Error: {e}"),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref(), cli.backend_url.as_deref())?;

    match cli.command {
        Some(Commands::Ask { video, question }) => {
            init_logging(LogTarget::Stderr, &config.log_filter)?;
            let backend = HttpBackend::new(&config.backend_url)?;
            info!(backend = %backend.endpoint(), "asking single question");
            let answer = run_cli_ask(&backend, &video, &question.join(" ")).await?;
            println!("{answer}");
            Ok(())
        }
        Some(Commands::Resolve { input, json }) => {
            println!("{}", run_cli_resolve(&input, json)?);
            Ok(())
        }
        Some(Commands::Chat { video }) => run_tui(&config, video.as_deref()).await,
        None => run_tui(&config, None).await,
    }
}

/// Ask one question about `video` and return the answer text.
async fn run_cli_ask(backend: &dyn ChatBackend, video: &str, question: &str) -> Result<String> {
    let video_id = VideoId::resolve(video).ok_or(Error::InvalidVideo)?;
    info!(%video_id, "asking single question");

    let mut session = ChatSession::new();
    let submission = session.submit(backend, Some(&video_id), question).await;
    if !matches!(submission, Submission::Dispatched(_)) {
        return Err(Error::custom("question was not sent"));
    }

    match session.last_message() {
        Some(reply) if !reply.is_error => Ok(reply.content.clone()),
        Some(reply) => Err(Error::custom(&reply.content)),
        None => Err(Error::custom("no reply recorded")),
    }
}

fn run_cli_resolve(input: &str, as_json: bool) -> Result<String> {
    let video_id = VideoId::resolve(input).ok_or(Error::InvalidVideo)?;

    if as_json {
        let output = json!({
            "video_id": video_id,
            "embed_url": video_id.embed_url(),
        });
        Ok(serde_json::to_string_pretty(&output)?)
    } else {
        Ok(format!(
            "Video ID:  {video_id}\nEmbed URL: {}",
            video_id.embed_url()
        ))
    }
}

async fn run_tui(config: &Config, video: Option<&str>) -> Result<()> {
    init_logging(LogTarget::File(&Config::log_path()?), &config.log_filter)?;
    let backend = HttpBackend::new(&config.backend_url)?;
    info!(backend = %backend.endpoint(), "starting interactive chat");

    let mut app = App::new(Arc::new(backend));
    if video.is_some() {
        app.open_chat(video);
    }

    // Initialize terminal; `init` leaves the terminal restored if it fails
    let mut terminal = tui_init()?;
    tui::install_panic_hook();
    let event_handler = EventHandler::new();

    // Main event loop
    let result = loop {
        let event = match event_handler.next_event() {
            Ok(event) => event,
            Err(e) => break Err(e),
        };
        if let Err(e) = app.handle_event(event) {
            break Err(e);
        }

        if let Err(e) = terminal.draw(|f| ui::draw(f, &mut app)) {
            break Err(e.into());
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    tui_restore()?;
    result
}
