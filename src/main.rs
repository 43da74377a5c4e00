mod config;
mod error;
mod keybindings;
mod logging;
mod services;
mod ui;
mod utils;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::builder::PossibleValuesParser;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::config::Settings;
use crate::ui::app::App;
use crate::ui::theme::{Theme, THEME_NAMES};

#[derive(Parser, Debug)]
#[command(name = "nimbus", version)]
#[command(about = "Three-pane terminal file browser", long_about = None)]
struct Args {
    /// Directory to open (default: start_path from settings, else home)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Colour theme, overriding settings.json
    #[arg(long, value_name = "NAME", value_parser = PossibleValuesParser::new(THEME_NAMES))]
    theme: Option<String>,

    /// Log file (default: ~/.nimbus/logs/nimbus.log)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let _log_guard = logging::init(args.log_file.as_deref());

    let settings = Settings::load();
    let theme_name = args.theme.clone().unwrap_or_else(|| settings.theme.name.clone());
    let theme = Theme::load(&theme_name);
    let start = settings.resolve_start_path(args.path.as_deref());
    tracing::info!(start = %start.display(), theme = %theme.name, "opening");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
        crossterm::cursor::MoveTo(0, 0),
        EnterAlternateScreen,
        EnableMouseCapture
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(start, settings, theme);
    let result = run_app(&mut terminal, &mut app);
    app.save_settings();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
        crossterm::cursor::MoveTo(0, 0),
        crossterm::cursor::Show
    )?;

    if let Err(err) = result {
        tracing::error!(error = %err, "terminal failure");
        eprintln!("Error: {}", err);
    }
    tracing::info!("nimbus exiting");

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    // Polling keeps transient status messages expiring without input
    let poll_timeout = Duration::from_millis(250);

    loop {
        terminal.draw(|f| ui::draw::draw(f, app))?;

        if !event::poll(poll_timeout)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if ui::events::handle_key(app, key.code, key.modifiers) {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => ui::events::handle_mouse(app, mouse),
            _ => {}
        }
    }
}
