use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use lynk_chat_core::{ChatController, Config, HttpTransport, Message};
use tokio::sync::mpsc;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser, Debug)]
#[command(name = "lynk-chat")]
#[command(about = "Chat with the Lynk feature backend to build feature YAML", version)]
struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(short, long)]
    backend_url: Option<String>,

    /// Where to write diagnostic logs
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Persist the effective backend URL to the config file
    #[arg(long)]
    save_config: bool,
}

/// Command line flags win over the config file
fn resolve_config(cli: &Cli, mut config: Config) -> Config {
    if let Some(url) = &cli.backend_url {
        config.backend_url = Some(url.clone());
    }
    if let Some(path) = &cli.log_file {
        config.log_file = Some(path.clone());
    }
    config
}

fn build_transport(config: &Config) -> Result<HttpTransport> {
    Ok(match config.request_timeout() {
        Some(timeout) => HttpTransport::with_timeout(config.backend_url(), timeout)?,
        None => HttpTransport::new(config.backend_url()),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(&cli, Config::load().unwrap_or_else(|_| Config::new()));

    let log_file = match &config.log_file {
        Some(path) => path.clone(),
        None => logging::default_log_path()?,
    };
    logging::init(&log_file)?;

    if cli.save_config {
        let mut stored = Config::load().unwrap_or_else(|_| Config::new());
        stored.backend_url = Some(config.backend_url().to_string());
        stored.save()?;
    }

    tracing::info!(backend = config.backend_url(), "starting lynk-chat");

    let (tx, mut inbox) = mpsc::unbounded_channel::<Message>();
    let controller = ChatController::new(Arc::new(tx), Arc::new(build_transport(&config)?));
    let mut app = App::new(controller);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    app.start();

    let result = run(&mut app, &mut terminal, &mut events, &mut inbox).await;

    tui::restore()?;
    result
}

async fn run(
    app: &mut App,
    terminal: &mut tui::Tui,
    events: &mut EventHandler,
    inbox: &mut mpsc::UnboundedReceiver<Message>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            Some(event) = events.next() => handler::handle_event(app, event)?,
            Some(message) = inbox.recv() => {
                app.receive(message);
                // Drain anything else that arrived in the same burst
                while let Ok(message) = inbox.try_recv() {
                    app.receive(message);
                }
            }
            else => break,
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["lynk-chat", "--backend-url", "http://backend:9000"]);
        let config = Config {
            backend_url: Some("http://localhost:8000".to_string()),
            request_timeout_secs: Some(10),
            log_file: None,
        };

        let resolved = resolve_config(&cli, config);
        assert_eq!(resolved.backend_url(), "http://backend:9000");
        assert_eq!(resolved.request_timeout_secs, Some(10));
    }

    #[test]
    fn test_defaults_without_flags() {
        let cli = Cli::parse_from(["lynk-chat"]);
        let resolved = resolve_config(&cli, Config::new());
        assert_eq!(resolved.backend_url(), "http://localhost:8000");
        assert!(!cli.save_config);
    }

    #[test]
    fn test_build_transport_uses_resolved_url() {
        let config = Config {
            backend_url: Some("http://backend:9000/".to_string()),
            request_timeout_secs: Some(5),
            log_file: None,
        };
        let transport = build_transport(&config).unwrap();
        assert_eq!(lynk_chat_core::Transport::base_url(&transport), "http://backend:9000");
    }
}
