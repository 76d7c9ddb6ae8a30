mod app;
mod bell;
mod config;
mod ui;

use std::io;
use std::sync::Arc;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use quiz_client::HttpQuestionClient;
use ratatui::{backend::CrosstermBackend, Terminal};
use session::HistoryStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to a file: the alternate screen belongs to the UI.
    let log_dir = "logs";
    std::fs::create_dir_all(log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(log_dir, "quickdrill-tui");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("quickdrill starting up");

    let service = Arc::new(HttpQuestionClient::new(config::server_url()));
    let history = Arc::new(HistoryStore::new(config::history_path()));
    let handle = session::spawn_controller(
        service,
        Arc::clone(&history),
        Arc::new(bell::BellNotify),
    );

    let (snapshot, events) = handle.subscribe().await?;
    let app = app::App::new(handle.clone(), history, snapshot);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app::run(&mut terminal, app, events).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    handle.shutdown().await;
    tracing::info!("quickdrill shutting down");
    result
}
