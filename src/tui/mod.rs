//! Terminal dashboard built on ratatui + crossterm.
//!
//! Raw-mode alternate-screen event loop: draw the frame, poll for input
//! with a fixed tick rate, dispatch key events to the app state.

pub mod app;
pub mod editor;
pub mod event;
pub mod gradient;
pub mod themes;
pub mod ui;

use std::io;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::io::SourceSpec;
use app::AppState;
use event::{handle_key, poll_event, AppEvent};

/// Run the interactive dashboard until the user quits.
pub fn run_dashboard(source: SourceSpec, theme_name: &str) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = AppState::new(source, theme_name);
    app.refresh();

    let result = run_event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> io::Result<()> {
    while app.running {
        terminal.draw(|f| ui::render_ui(f, app))?;

        match poll_event(Duration::from_millis(app.tick_rate_ms))? {
            AppEvent::Quit => app.running = false,
            AppEvent::Key(key) => {
                handle_key(&key, app);
            }
            AppEvent::Resize(_, _) => {
                terminal.autoresize()?;
            }
            AppEvent::Tick => app.tick(),
        }
    }

    Ok(())
}
