//! Full-screen terminal session.
//!
//! This module owns terminal setup/teardown and the single-threaded event
//! loop. One input or completion event is delivered at a time: keyboard and
//! paste events come from crossterm, job outcomes and the readiness report
//! arrive over channels from worker threads. Everything is translated into
//! [`WizardEvent`] before it reaches the state machines, which keeps those
//! machines free of terminal concerns and directly drivable from tests.

pub mod app;
pub mod compress_wizard;
pub mod file_select;
pub mod format_wizard;
pub mod pdf_wizard;
pub mod theme;

use std::io::{stdout, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::Receiver;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::deps::ToolReport;
use crate::jobs::{Dispatch, JobOutcome};

use app::App;

/// One unit of input for the router and the sequencers.
#[derive(Debug, Clone)]
pub enum WizardEvent {
    /// A key press (release/repeat events are filtered out before this).
    Key(KeyEvent),
    /// Bracketed-paste content, delivered as a single string.
    Paste(String),
    /// Completion of a dispatched job.
    Job(JobOutcome),
    /// The startup readiness probe reporting in.
    Readiness(ToolReport),
}

impl WizardEvent {
    /// Plain key event without modifiers. Convenience for tests and for the
    /// few places that synthesize input.
    pub fn key(code: KeyCode) -> Self {
        WizardEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }
}

/// Parse-or-default policy for numeric step inputs: empty or unparseable
/// input falls back to the configured default, anything else is clamped into
/// the domain. The result is never outside `min..=max`.
pub fn numeric_or_default(input: &str, default: u32, min: u32, max: u32) -> u32 {
    let value = match input.trim() {
        "" => default,
        s => s.parse::<u32>().unwrap_or(default),
    };
    value.clamp(min, max)
}

/// Setup terminal for TUI rendering with panic-safe cleanup
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableBracketedPaste)?;

    // Install panic hook for clean terminal restoration
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        teardown_terminal();
        original_hook(panic_info);
    }));

    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
pub fn teardown_terminal() {
    let _ = stdout().execute(DisableBracketedPaste);
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
}

/// Run the application until the user quits.
pub fn run(
    app: &mut App,
    dispatcher: &dyn Dispatch,
    jobs_rx: &Receiver<JobOutcome>,
    readiness_rx: &Receiver<ToolReport>,
) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, app, dispatcher, jobs_rx, readiness_rx);
    teardown_terminal();
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    dispatcher: &dyn Dispatch,
    jobs_rx: &Receiver<JobOutcome>,
    readiness_rx: &Receiver<ToolReport>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        // Worker messages re-enter the same routing path as keyboard input.
        while let Ok(report) = readiness_rx.try_recv() {
            app.handle(WizardEvent::Readiness(report));
        }
        while let Ok(outcome) = jobs_rx.try_recv() {
            app.handle(WizardEvent::Job(outcome));
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle(WizardEvent::Key(key));
                }
                Event::Paste(text) => {
                    app.handle(WizardEvent::Paste(text));
                }
                _ => {}
            }
        }

        // A confirmed wizard leaves its job description behind; submit it
        // and let the completion flow back through the channel above.
        if let Some(job) = app.take_job() {
            dispatcher.dispatch(job);
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
