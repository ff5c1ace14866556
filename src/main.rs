//! Vocab Cycle - offline vocabulary flashcard TUI
//!
//! Multiple-choice vocabulary review driven by a simple weakness-first
//! selection heuristic. All data lives in a local SQLite file.

mod config;
mod models;
mod review;
mod storage;
mod ui;

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use storage::WordStore;
use ui::App;

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "vocy")]
#[command(author, version, about = "Offline vocabulary flashcard TUI", long_about = None)]
struct Args {
    /// Path to the word database file
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// Import words from a JSON file and exit
    #[arg(short, long)]
    import: Option<PathBuf>,

    /// Export the library to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Wipe all local data (words, statistics and the seed marker)
    #[arg(long)]
    reset: bool,
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

fn main() -> Result<()> {
    let args = Args::parse();

    let db_path = args.db.unwrap_or_else(WordStore::default_path);
    let store = WordStore::open(&db_path)?;

    if args.reset {
        store.reset()?;
        println!("✓ Cleared all local data");
        return Ok(());
    }

    if let Some(path) = args.import {
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read import file: {:?}", path))?;
        let count = store.import_json(&json)?;
        println!("✓ Imported {} words from {}", count, path.display());
        return Ok(());
    }

    if let Some(path) = args.export {
        let json = store.export_json()?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write export file: {:?}", path))?;
        println!("✓ Exported library to {}", path.display());
        return Ok(());
    }

    // First launch installs the bundled starter vocabulary.
    store.ensure_seeded()?;

    run_tui(store)
}

fn run_tui(store: WordStore) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Load config
    let config = config::Config::load().unwrap_or_default();

    // Create app
    let mut app = App::new(store, config);

    // Run main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {}", err);
        return Err(err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| app.render(frame))?;
        app.handle_events()?;
    }
    Ok(())
}
