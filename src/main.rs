//! tootline: Mastodon client for the terminal.

use std::fs::OpenOptions;
use std::sync::Mutex;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use tracing_subscriber::EnvFilter;

use tootline::app::App;
use tootline::config::config_dir;
use tootline::error::Result;

/// With `TOOTLINE_LOG` set (e.g. `tootline=debug`), write logs to `<config dir>/tootline.log`.
/// The terminal belongs to the UI, so nothing is ever logged to stdout or stderr.
fn init_logging() -> Result<()> {
    let Ok(directives) = std::env::var("TOOTLINE_LOG") else {
        return Ok(());
    };
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("tootline.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let mut app = App::new()?;
    ratatui::run(|terminal| run_app(terminal, &mut app))?;
    Ok(())
}

fn run_app(terminal: &mut DefaultTerminal, app: &mut App) -> std::io::Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| app.draw(f))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Ctrl+Q or Ctrl+C quits from any screen (plain 'q' may be text input).
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('q' | 'c'))
                {
                    break;
                }
                if app.handle_key(key.code).map_err(std::io::Error::other)? {
                    break;
                }
            }
        }
    }
    Ok(())
}
