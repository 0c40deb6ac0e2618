//! Interactive terminal dashboard for the load forecast.
//!
//! Feature-gated behind `tui`. Launch with `--tui` on the CLI.

mod controls;
mod layout;
/// Dashboard application state.
pub mod runtime;
mod style;

use std::io;

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::dataset::Dataset;
use runtime::{App, DashboardSettings};

/// Launches the dashboard over `dataset`.
///
/// Sets up the terminal (raw mode, alternate screen), runs the event loop,
/// and restores the terminal on exit.
pub fn run(dataset: Dataset, settings: DashboardSettings) {
    if let Err(e) = enable_raw_mode() {
        fail("failed to enable raw mode", e);
    }

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        log_restore_err("disable raw mode", disable_raw_mode());
        fail("failed to enter alternate screen", e);
    }

    let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(t) => t,
        Err(e) => {
            log_restore_err("leave alternate screen", execute!(io::stdout(), LeaveAlternateScreen));
            log_restore_err("disable raw mode", disable_raw_mode());
            fail("failed to create terminal", e);
        }
    };

    let mut app = App::new(dataset, settings);
    let result = event_loop(&mut terminal, &mut app);

    log_restore_err("disable raw mode", disable_raw_mode());
    log_restore_err(
        "leave alternate screen",
        execute!(terminal.backend_mut(), LeaveAlternateScreen),
    );
    log_restore_err("show cursor", terminal.show_cursor());

    if let Err(e) = result {
        fail("dashboard crashed", e);
    }
}

fn fail(context: &str, e: io::Error) -> ! {
    eprintln!("error: {context}: {e}");
    std::process::exit(1);
}

/// Reports a terminal restore step that failed; the remaining steps still run.
fn log_restore_err(step: &str, result: io::Result<()>) {
    if let Err(e) = result {
        tracing::error!(error = %e, "terminal restore failed: could not {step}");
    }
}

/// Blocks on input and redraws after every key.
fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| layout::render(frame, app))?;

        if app.quit {
            return Ok(());
        }

        if let Event::Key(key) = event::read()? {
            controls::handle_key(app, key);
        }
    }
}
