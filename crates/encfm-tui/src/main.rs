//! encfm — browse a directory tree, inspect file encodings, bulk-convert.
//!
//! This binary initialises the terminal, runs the main event loop,
//! and restores the terminal on exit or panic.

mod app;
mod input;
mod render;

use std::io;
use std::panic;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use encfm_core::{Config, CoreError};

use crate::app::App;

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Installs a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Loads the user config from `~/.config/encfm/config.toml`.
///
/// A missing file is normal and falls back to defaults; anything else is
/// worth a log line but never blocks startup.
fn load_config() -> Config {
    let Some(home) = std::env::var_os("HOME") else {
        return Config::default();
    };
    let path = PathBuf::from(home)
        .join(".config")
        .join("encfm")
        .join("config.toml");
    match Config::load(&path) {
        Ok(config) => config,
        Err(CoreError::NotFound(_)) => Config::default(),
        Err(e) => {
            tracing::warn!("ignoring config {}: {e}", path.display());
            Config::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Log to a file to avoid terminal interference
    tracing_subscriber::fmt()
        .with_writer(|| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open("/tmp/encfm.log")
                .expect("failed to open log file")
        })
        .with_max_level(tracing::Level::INFO)
        .init();

    install_panic_hook();

    let config = load_config();

    let start_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| {
            let configured = &config.general.start_dir;
            if configured.is_empty() {
                None
            } else {
                Some(PathBuf::from(configured))
            }
        })
        .unwrap_or_else(|| {
            std::env::current_dir().expect("failed to get current directory")
        });

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, start_dir, config);
    restore_terminal(&mut terminal)?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    start_dir: PathBuf,
    config: Config,
) -> anyhow::Result<()> {
    let mut app = App::new(&start_dir, config)?;

    loop {
        terminal.draw(|f| render::render(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                input::handle_key(&mut app, key);
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
