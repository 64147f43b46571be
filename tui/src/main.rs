mod app;
mod ui;

use std::{fs::OpenOptions, io, sync::Arc, sync::Mutex};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use todo_core::{ClientConfig, HttpTodoApi};
use tracing_subscriber::EnvFilter;

use crate::app::App;

/// Logs go to a file; the terminal belongs to the UI.
const LOG_FILE: &str = "todo-tui.log";
const LOG_ENV: &str = "TODO_LOG";

fn init_tracing() -> anyhow::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(LOG_FILE)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config = ClientConfig::from_env()?;
    tracing::info!(base_url = config.base_url(), "starting todo-tui");
    let api = Arc::new(HttpTodoApi::from_config(&config)?);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = App::new(api).run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "todo-tui exited with an error");
    }
    result
}
