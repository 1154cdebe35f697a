mod api;
mod app;
mod cli;
mod config;
mod error;
mod kanban_board;
mod task;
#[cfg(test)]
mod test_helpers;
mod ui;
mod worker;

use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::sync::{Arc, Mutex};

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::HttpTaskApi;
use crate::app::App;
use crate::cli::Cli;
use crate::config::Config;
use crate::kanban_board::KanbanBoard;
use crate::worker::Worker;

/// Logs go to a file; the terminal belongs to the board.
fn init_logging(log_file: &str) -> error::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)
}

/// Runs `setup` once raw mode is on; if it fails, `restore` puts the terminal
/// back before the setup error is returned.
fn setup_or_restore<T>(
    setup: impl FnOnce() -> io::Result<T>,
    restore: impl FnOnce() -> io::Result<()>,
) -> io::Result<T> {
    setup().or_else(|e| {
        if let Err(restore_err) = restore() {
            error!(error = %restore_err, "failed to restore terminal");
        }
        Err(e)
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = init_logging(&config.log_file) {
        eprintln!("error: cannot open log file {}: {e}", config.log_file);
        std::process::exit(1);
    }
    info!(?config, "taskboard starting");

    let worker = Worker::new(Arc::new(HttpTaskApi::new(&config.base_url)));
    let mut app = App::new(KanbanBoard::new());

    // Terminal setup
    enable_raw_mode()?;
    let mut terminal = setup_or_restore(setup_terminal, restore_terminal)?;

    let result = ui::run_app(&mut terminal, &mut app, &worker, config.tick_rate());

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = %err, "board exited with error");
        eprintln!("{err:?}");
    }
    info!("taskboard stopped");
    Ok(())
}
