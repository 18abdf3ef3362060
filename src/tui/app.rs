//! Top-level router.
//!
//! Holds whichever screen is active (the readiness check, the main menu, or
//! one of the three wizards) and forwards each event to it. Entering a
//! wizard always constructs a fresh instance; a finished wizard transitions
//! back to the menu only when it also asked for the menu, otherwise its quit
//! request is honored. Global quit is accepted only on the readiness screen
//! and in the menu, never while a wizard is mid-flow.

use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, Paragraph};
use tracing::info;

use crate::deps::{ToolReport, ToolStatus};
use crate::files::FolderOpener;
use crate::jobs::JobRequest;
use crate::settings::Settings;

use super::compress_wizard::CompressWizard;
use super::format_wizard::FormatWizard;
use super::pdf_wizard::PdfWizard;
use super::theme;
use super::WizardEvent;

/// Discriminant of the active screen, exposed for the router's callers and
/// tests; the wizards themselves stay private to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Readiness,
    Menu,
    PdfWizard,
    FormatWizard,
    CompressWizard,
}

enum AppState {
    /// Blocking until the environment probe reports in; `None` while the
    /// probe is still running.
    Readiness(Option<ToolReport>),
    Menu,
    Pdf(PdfWizard),
    Format(FormatWizard),
    Compress(CompressWizard),
}

const MENU_ITEMS: &[(&str, &str)] = &[
    (
        "PDF to Image Converter",
        "Convert PDF pages to images (PNG, JPG, etc.)",
    ),
    (
        "Convert Image Format",
        "Convert images between formats (WebP, AVIF, etc.)",
    ),
    (
        "Compress Image/PDF",
        "Reduce file size by percentage or target size",
    ),
    ("Exit", "Quit the application"),
];

pub struct App {
    state: AppState,
    menu_cursor: usize,
    settings: Settings,
    start_dir: PathBuf,
    opener: Arc<dyn FolderOpener>,
    status_line: String,
    should_quit: bool,
}

impl App {
    pub fn new(settings: Settings, start_dir: PathBuf, opener: Arc<dyn FolderOpener>) -> Self {
        Self {
            state: AppState::Readiness(None),
            menu_cursor: 0,
            settings,
            start_dir,
            opener,
            status_line: String::new(),
            should_quit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        match &self.state {
            AppState::Readiness(_) => Screen::Readiness,
            AppState::Menu => Screen::Menu,
            AppState::Pdf(_) => Screen::PdfWizard,
            AppState::Format(_) => Screen::FormatWizard,
            AppState::Compress(_) => Screen::CompressWizard,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle(&mut self, event: WizardEvent) {
        match &mut self.state {
            AppState::Readiness(report) => match event {
                WizardEvent::Readiness(new_report) => {
                    if new_report.all_ok() {
                        self.status_line = "\u{2714} ImageMagick & Ghostscript detected".into();
                        self.state = AppState::Menu;
                    } else {
                        info!("required tools missing, blocking at readiness screen");
                        *report = Some(new_report);
                    }
                }
                WizardEvent::Key(key) => {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
                    {
                        self.should_quit = true;
                    }
                }
                _ => {}
            },

            AppState::Menu => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Up | KeyCode::Char('k') => {
                            if self.menu_cursor > 0 {
                                self.menu_cursor -= 1;
                            } else {
                                self.menu_cursor = MENU_ITEMS.len() - 1;
                            }
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            if self.menu_cursor + 1 < MENU_ITEMS.len() {
                                self.menu_cursor += 1;
                            } else {
                                self.menu_cursor = 0;
                            }
                        }
                        KeyCode::Enter => self.enter_menu_item(),
                        KeyCode::Char('q') | KeyCode::Char('Q') => {
                            self.should_quit = true;
                        }
                        _ => {}
                    }
                }
            }

            AppState::Pdf(wizard) => {
                wizard.update(&event);
                if wizard.is_finished() {
                    if wizard.wants_menu() {
                        self.state = AppState::Menu;
                    } else if wizard.wants_quit() {
                        self.should_quit = true;
                    }
                }
            }

            AppState::Format(wizard) => {
                wizard.update(&event);
                if wizard.is_finished() {
                    if wizard.wants_menu() {
                        self.state = AppState::Menu;
                    } else if wizard.wants_quit() {
                        self.should_quit = true;
                    }
                }
            }

            AppState::Compress(wizard) => {
                wizard.update(&event);
                if wizard.is_finished() {
                    if wizard.wants_menu() {
                        self.state = AppState::Menu;
                    } else if wizard.wants_quit() {
                        self.should_quit = true;
                    }
                }
            }
        }
    }

    /// Construct a fresh wizard for the selected entry, discarding any prior
    /// instance.
    fn enter_menu_item(&mut self) {
        match self.menu_cursor {
            0 => {
                self.state = AppState::Pdf(PdfWizard::new(
                    self.start_dir.clone(),
                    &self.settings,
                    Arc::clone(&self.opener),
                ));
            }
            1 => {
                self.state = AppState::Format(FormatWizard::new(self.start_dir.clone()));
            }
            2 => {
                self.state = AppState::Compress(CompressWizard::new(
                    self.start_dir.clone(),
                    &self.settings,
                ));
            }
            _ => {
                self.should_quit = true;
            }
        }
    }

    /// A job description left behind by the active wizard's confirm step.
    pub fn take_job(&mut self) -> Option<JobRequest> {
        match &mut self.state {
            AppState::Pdf(w) => w.take_job(),
            AppState::Format(w) => w.take_job(),
            AppState::Compress(w) => w.take_job(),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        match &self.state {
            AppState::Readiness(report) => self.render_readiness(frame, area, report.as_ref()),
            AppState::Menu => self.render_menu(frame, area),
            AppState::Pdf(w) => w.render(frame, area),
            AppState::Format(w) => w.render(frame, area),
            AppState::Compress(w) => w.render(frame, area),
        }
    }

    fn render_readiness(&self, frame: &mut Frame, area: Rect, report: Option<&ToolReport>) {
        let mut content = vec![
            Line::from(""),
            Line::from(Span::styled(" Imgforge ", theme::header_style())),
            Line::from(""),
        ];

        match report {
            None => {
                content.push(Line::from(Span::styled(
                    "  Checking external tools...",
                    theme::dim_style(),
                )));
            }
            Some(report) => {
                content.push(Line::from(Span::styled(
                    "  Missing dependencies",
                    theme::error_style().bold(),
                )));
                content.push(Line::from(""));
                for check in report.checks() {
                    let (symbol, style) = match check.status {
                        ToolStatus::Ok => ("\u{2714}", theme::success_style()),
                        ToolStatus::NotFound => ("\u{2717}", theme::error_style()),
                        ToolStatus::VersionProblem => ("\u{26a0}", theme::warning_style()),
                    };
                    content.push(Line::from(Span::styled(
                        format!("  {} {} \u{2014} {}", symbol, check.name, check.detail),
                        style,
                    )));
                    if check.status != ToolStatus::Ok {
                        content.push(Line::from(Span::styled(
                            format!("      Purpose:  {}", check.purpose),
                            theme::dim_style(),
                        )));
                        content.push(Line::from(Span::styled(
                            format!("      Download: {}", check.download_url),
                            theme::dim_style(),
                        )));
                    }
                }
                content.push(Line::from(""));
                content.push(Line::from(Span::styled(
                    "  After installation, restart this application.",
                    theme::dim_style(),
                )));
                content.push(Line::from(Span::styled(
                    "  Make sure the tools are added to your system PATH.",
                    theme::dim_style(),
                )));
            }
        }

        content.push(Line::from(""));
        content.push(theme::help_line(&[("q", "quit")]));
        frame.render_widget(Paragraph::new(content), area);
    }

    fn render_menu(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(1),
                Constraint::Length(2),
            ])
            .split(area);

        let header = vec![
            Line::from(""),
            Line::from(Span::styled(" Imgforge ", theme::header_style())),
            Line::from(Span::styled(
                "  Use \u{2191}\u{2193} to navigate, Enter to select, q to quit",
                theme::dim_style(),
            )),
        ];
        frame.render_widget(Paragraph::new(header), chunks[0]);

        let items: Vec<ListItem> = MENU_ITEMS
            .iter()
            .enumerate()
            .flat_map(|(i, (title, desc))| {
                let style = if i == self.menu_cursor {
                    theme::selected_style()
                } else {
                    theme::item_style()
                };
                let mut rows = vec![ListItem::new(format!("  {}", title)).style(style)];
                if i == self.menu_cursor {
                    rows.push(ListItem::new(format!("    {}", desc)).style(theme::dim_style()));
                }
                rows
            })
            .collect();

        // Description rows are interleaved with the items, so the list is
        // rendered stateless with manual highlight styling.
        frame.render_widget(List::new(items), chunks[1]);

        if !self.status_line.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    format!("  {}", self.status_line),
                    theme::success_style(),
                ))),
                chunks[2],
            );
        }
    }
}
