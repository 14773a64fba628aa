mod auth;
mod config;
mod controller;
mod error;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use config::Config;
use controller::AppController;
use model::{AppModel, FileTokenStore, RedirectFragment, SpotifyClient};
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    if let Err(e) = logging::init_logging(&config.log_dir) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Spotify Playlist Generator Starting ===");
    tracing::debug!(
        token_path = %config.token_path.display(),
        search_limit = config.search_limit,
        "Configuration loaded"
    );

    let store = Arc::new(FileTokenStore::new(config.token_path.clone()));
    let api = Arc::new(SpotifyClient::new());
    let app_model = AppModel::new(&config, api, store);

    // The redirect URL from the authorize page may be handed over on the command line
    let redirect = std::env::args().nth(1).unwrap_or_default();
    let mut navigation = RedirectFragment::from_redirect(&redirect);
    if app_model.session.restore_or_capture(&mut navigation).await {
        tracing::info!("Session ready");
    } else {
        tracing::info!("No session yet, login required");
    }

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let controller = AppController::new(app_model.clone());

    let res = run_app(&mut terminal, app_model, controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Spotify Playlist Generator shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: AppModel,
    controller: AppController,
) -> io::Result<()> {
    loop {
        let snapshot = model.snapshot().await;

        terminal.draw(|f| {
            AppView::render(f, &snapshot);
        })?;

        if snapshot.ui.should_quit {
            break;
        }

        // Short poll keeps notifications and export progress fresh
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if let Err(e) = controller.handle_key_event(key).await {
                        tracing::warn!(error = %e, "Key handling failed");
                    }
                }
                Event::Paste(text) => controller.handle_paste(&text).await,
                _ => {}
            }
        }
    }

    Ok(())
}
