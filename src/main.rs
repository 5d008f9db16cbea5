//! Sherlock Bia
//!
//! A detective mini-game for children: find clues around the school,
//! crack little puzzles, question suspects and name the culprit.

use anyhow::Context;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use sherlock_bia::config::GameConfig;
use sherlock_bia::data::Catalog;
use sherlock_bia::game::{SessionStore, SystemClock};
use sherlock_bia::store::FileStore;
use sherlock_bia::tui::App;
use sherlock_bia::{Game, Result, VERSION};
use std::fs::{self, OpenOptions};
use std::io::{self, stdout};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Log to a file; the terminal belongs to the game
fn init_logging(config: &GameConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sherlock_bia=info"));
    let path = config.log_path();
    let file = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));

    match file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init(),
        Err(e) => {
            eprintln!("Could not open log file {}: {e}", path.display());
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .init();
        }
    }
}

fn build_game(config: &GameConfig) -> Result<Game> {
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("Failed to load case catalog from {}", path.display()))?,
        None => Catalog::builtin().context("Built-in case catalog is broken")?,
    };

    let store = FileStore::new(config.data_dir());
    let sessions = SessionStore::open(Box::new(store), &config.storage_key, &config.player_name);

    Ok(Game::new(catalog, sessions, Box::new(SystemClock))
        .with_rules(config.rules())
        .with_hints(config.hints()))
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    while app.running {
        terminal.draw(|frame| app.render(frame))?;

        if !app.handle_input(terminal)? {
            break;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let (config, config_source) = GameConfig::load();
    init_logging(&config);
    config_source.log();
    info!(version = VERSION, data_dir = %config.data_dir().display(), "starting");

    let game = build_game(&config)?;
    let mut app = App::new(game, config.tick_interval());

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = run(&mut terminal, &mut app);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome.context("Terminal error")?;

    info!("exiting");
    println!("\n╔════════════════════════════════════════════════╗");
    println!("║  Obrigado por jogares Sherlock Bia!            ║");
    println!("║  Até ao próximo mistério, detetive.            ║");
    println!("╚════════════════════════════════════════════════╝\n");

    Ok(())
}
