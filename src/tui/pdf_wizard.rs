//! PDF-to-image conversion wizard.
//!
//! Walks the user from file selection through format, density, quality and
//! prefix to a confirm/dispatch/result cycle. Output images land in a
//! sibling directory named `<input-stem>_images`.

use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::files::{self, FolderOpener};
use crate::jobs::JobRequest;
use crate::settings::{Settings, MAX_DENSITY, MIN_DENSITY, PDF_OUTPUT_FORMATS};

use super::file_select::{FileSelector, SelectorOutcome};
use super::theme;
use super::{numeric_or_default, WizardEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfStep {
    SelectFile,
    SelectFormat,
    SetDensity,
    SetQuality,
    SetPrefix,
    Confirm,
    Working,
    Done,
}

pub struct PdfWizard {
    step: PdfStep,
    selector: FileSelector,
    settings: Settings,

    format_cursor: usize,
    density_input: String,
    quality_input: String,
    prefix_input: String,

    input_file: Option<PathBuf>,
    output_format: String,
    density: u32,
    quality: u32,
    prefix: String,
    output_dir: Option<PathBuf>,

    pending_job: Option<JobRequest>,
    result: String,
    result_is_error: bool,
    page_count: usize,

    finished: bool,
    wants_menu: bool,
    quit_requested: bool,

    opener: Arc<dyn FolderOpener>,
}

impl PdfWizard {
    pub fn new(start_dir: PathBuf, settings: &Settings, opener: Arc<dyn FolderOpener>) -> Self {
        Self {
            step: PdfStep::SelectFile,
            selector: FileSelector::new(start_dir, files::FileFilter::Pdf),
            format_cursor: default_format_cursor(settings),
            density_input: String::new(),
            quality_input: String::new(),
            prefix_input: String::new(),
            input_file: None,
            output_format: settings.output_format.clone(),
            density: settings.density,
            quality: settings.quality,
            prefix: settings.prefix.clone(),
            output_dir: None,
            pending_job: None,
            result: String::new(),
            result_is_error: false,
            page_count: 0,
            finished: false,
            wants_menu: false,
            quit_requested: false,
            settings: settings.clone(),
            opener,
        }
    }

    pub fn update(&mut self, event: &WizardEvent) {
        match self.step {
            PdfStep::SelectFile => match self.selector.update(event) {
                SelectorOutcome::Chosen(path) => {
                    self.output_dir = Some(files::pdf_output_dir(&path));
                    self.input_file = Some(path);
                    self.step = PdfStep::SelectFormat;
                }
                SelectorOutcome::Cancelled => {
                    self.finished = true;
                    self.wants_menu = true;
                }
                SelectorOutcome::Pending => {}
            },

            PdfStep::SelectFormat => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Up => {
                            if self.format_cursor > 0 {
                                self.format_cursor -= 1;
                            } else {
                                self.format_cursor = PDF_OUTPUT_FORMATS.len() - 1;
                            }
                        }
                        KeyCode::Down => {
                            if self.format_cursor + 1 < PDF_OUTPUT_FORMATS.len() {
                                self.format_cursor += 1;
                            } else {
                                self.format_cursor = 0;
                            }
                        }
                        KeyCode::Enter => {
                            self.output_format = PDF_OUTPUT_FORMATS[self.format_cursor].to_string();
                            self.step = PdfStep::SetDensity;
                        }
                        KeyCode::Esc | KeyCode::Backspace => {
                            self.selector.reset();
                            self.step = PdfStep::SelectFile;
                        }
                        _ => {}
                    }
                }
            }

            PdfStep::SetDensity => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Enter => {
                            self.density = numeric_or_default(
                                &self.density_input,
                                self.settings.density,
                                MIN_DENSITY,
                                MAX_DENSITY,
                            );
                            self.step = PdfStep::SetQuality;
                        }
                        KeyCode::Esc => self.step = PdfStep::SelectFormat,
                        KeyCode::Backspace => {
                            self.density_input.pop();
                        }
                        KeyCode::Char(c) if c.is_ascii_digit() => {
                            if self.density_input.len() < 4 {
                                self.density_input.push(c);
                            }
                        }
                        _ => {}
                    }
                }
            }

            PdfStep::SetQuality => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Enter => {
                            self.quality = numeric_or_default(
                                &self.quality_input,
                                self.settings.quality,
                                1,
                                100,
                            );
                            self.step = PdfStep::SetPrefix;
                        }
                        KeyCode::Esc => self.step = PdfStep::SetDensity,
                        KeyCode::Backspace => {
                            self.quality_input.pop();
                        }
                        KeyCode::Char(c) if c.is_ascii_digit() => {
                            if self.quality_input.len() < 3 {
                                self.quality_input.push(c);
                            }
                        }
                        _ => {}
                    }
                }
            }

            PdfStep::SetPrefix => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Enter => {
                            self.prefix = if self.prefix_input.is_empty() {
                                self.settings.prefix.clone()
                            } else {
                                self.prefix_input.clone()
                            };
                            self.step = PdfStep::Confirm;
                        }
                        KeyCode::Esc => self.step = PdfStep::SetQuality,
                        KeyCode::Backspace => {
                            self.prefix_input.pop();
                        }
                        KeyCode::Char(c) => {
                            if self.prefix_input.len() < 50 {
                                self.prefix_input.push(c);
                            }
                        }
                        _ => {}
                    }
                }
            }

            PdfStep::Confirm => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                            if let (Some(input), Some(output_dir)) =
                                (self.input_file.clone(), self.output_dir.clone())
                            {
                                self.pending_job = Some(JobRequest::PdfConvert {
                                    input,
                                    format: self.output_format.clone(),
                                    density: self.density,
                                    quality: self.quality,
                                    prefix: self.prefix.clone(),
                                    output_dir,
                                });
                                self.step = PdfStep::Working;
                            }
                        }
                        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                            self.step = PdfStep::SetPrefix;
                        }
                        KeyCode::Char('b') => {
                            self.finished = true;
                            self.wants_menu = true;
                        }
                        _ => {}
                    }
                }
            }

            // One job in flight; everything except its completion is ignored.
            PdfStep::Working => {
                if let WizardEvent::Job(outcome) = event {
                    self.result_is_error = !outcome.success;
                    if outcome.success {
                        self.page_count = outcome.outputs.len();
                        self.result =
                            format!("Successfully converted {} page(s)", self.page_count);
                    } else {
                        self.result = outcome.message.clone();
                    }
                    self.step = PdfStep::Done;
                }
            }

            PdfStep::Done => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Enter | KeyCode::Char('m') => {
                            self.finished = true;
                            self.wants_menu = true;
                        }
                        KeyCode::Char('a') => self.restart(),
                        KeyCode::Char('o') => {
                            if let Some(dir) = &self.output_dir {
                                self.opener.reveal(dir);
                            }
                        }
                        KeyCode::Char('q') => {
                            self.finished = true;
                            self.quit_requested = true;
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Back to file selection for another run. File, result and collected
    /// parameters all return to their configured defaults.
    fn restart(&mut self) {
        self.selector.reset();
        self.step = PdfStep::SelectFile;
        self.input_file = None;
        self.output_dir = None;
        self.pending_job = None;
        self.result.clear();
        self.result_is_error = false;
        self.page_count = 0;
        self.format_cursor = default_format_cursor(&self.settings);
        self.density_input.clear();
        self.quality_input.clear();
        self.prefix_input.clear();
        self.output_format = self.settings.output_format.clone();
        self.density = self.settings.density;
        self.quality = self.settings.quality;
        self.prefix = self.settings.prefix.clone();
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn wants_menu(&self) -> bool {
        self.wants_menu
    }

    pub fn wants_quit(&self) -> bool {
        self.quit_requested
    }

    pub fn take_job(&mut self) -> Option<JobRequest> {
        self.pending_job.take()
    }

    pub fn step(&self) -> PdfStep {
        self.step
    }

    pub fn density(&self) -> u32 {
        self.density
    }

    pub fn quality(&self) -> u32 {
        self.quality
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn output_format(&self) -> &str {
        &self.output_format
    }

    pub fn output_dir(&self) -> Option<&PathBuf> {
        self.output_dir.as_ref()
    }

    pub fn result_line(&self) -> &str {
        &self.result
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(area);

        theme::render_header(frame, chunks[0], "PDF to Image Converter");
        let body = chunks[1];

        match self.step {
            PdfStep::SelectFile => self.selector.render(frame, body),
            PdfStep::SelectFormat => self.render_format_select(frame, body),
            PdfStep::SetDensity => render_input_field(
                frame,
                body,
                "Set DPI/Density (72-600):",
                &self.density_input,
                &format!(
                    "Higher = better quality, larger files. Default: {}",
                    self.settings.density
                ),
            ),
            PdfStep::SetQuality => render_input_field(
                frame,
                body,
                "Set Quality (1-100):",
                &self.quality_input,
                &format!("100 = best quality. Default: {}", self.settings.quality),
            ),
            PdfStep::SetPrefix => render_input_field(
                frame,
                body,
                "Set filename prefix:",
                &self.prefix_input,
                &format!(
                    "Output: {p}0.{f}, {p}1.{f}, ... Default: {d}",
                    p = if self.prefix_input.is_empty() {
                        self.settings.prefix.as_str()
                    } else {
                        self.prefix_input.as_str()
                    },
                    f = self.output_format,
                    d = self.settings.prefix
                ),
            ),
            PdfStep::Confirm => self.render_confirm(frame, body),
            PdfStep::Working => render_working(frame, body, "Converting... Please wait"),
            PdfStep::Done => self.render_done(frame, body),
        }
    }

    fn render_format_select(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "  Select output format:",
                theme::label_style(),
            ))),
            chunks[0],
        );

        let items: Vec<ListItem> = PDF_OUTPUT_FORMATS
            .iter()
            .enumerate()
            .map(|(i, format)| {
                let style = if i == self.format_cursor {
                    theme::selected_style()
                } else {
                    theme::item_style()
                };
                ListItem::new(format!("  {}", format.to_uppercase())).style(style)
            })
            .collect();

        let list = List::new(items);
        let mut list_state = ListState::default();
        list_state.select(Some(self.format_cursor));
        frame.render_stateful_widget(list, chunks[1], &mut list_state);

        frame.render_widget(
            Paragraph::new(theme::help_line(&[
                ("\u{2191}\u{2193}", "navigate"),
                ("Enter", "select"),
                ("Esc", "back"),
            ])),
            chunks[2],
        );
    }

    fn render_confirm(&self, frame: &mut Frame, area: Rect) {
        let input_name = self
            .input_file
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output_dir = self
            .output_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let lines = vec![
            format!("Input:    {}", input_name),
            format!("Format:   {}", self.output_format.to_uppercase()),
            format!("Density:  {} DPI", self.density),
            format!("Quality:  {}", self.quality),
            format!("Prefix:   {}", self.prefix),
            format!("Output:   {}", output_dir),
        ];
        render_summary(
            frame,
            area,
            "Conversion Summary",
            &lines,
            "Proceed with conversion? (Y/n)",
            None,
        );
    }

    fn render_done(&self, frame: &mut Frame, area: Rect) {
        let mut content = vec![Line::from("")];
        if self.result_is_error {
            content.push(Line::from(Span::styled(
                format!("  \u{2717} {}", self.result),
                theme::error_style(),
            )));
        } else {
            content.push(Line::from(Span::styled(
                format!("  \u{2714} {}", self.result),
                theme::success_style(),
            )));
            if let Some(dir) = &self.output_dir {
                content.push(Line::from(""));
                content.push(Line::from(Span::styled(
                    format!("  Output folder: {}", dir.display()),
                    theme::dim_style(),
                )));
            }
        }
        content.push(Line::from(""));
        content.push(theme::help_line(&[
            ("Enter/m", "menu"),
            ("a", "convert another"),
            ("o", "open folder"),
            ("q", "quit"),
        ]));
        frame.render_widget(Paragraph::new(content), area);
    }
}

fn default_format_cursor(settings: &Settings) -> usize {
    PDF_OUTPUT_FORMATS
        .iter()
        .position(|f| *f == settings.output_format)
        .unwrap_or(0)
}

/// Single-field input screen shared by the parameter steps.
pub(super) fn render_input_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    input: &str,
    description: &str,
) {
    let content = vec![
        Line::from(Span::styled(format!("  {}", label), theme::label_style())),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(input.to_string(), theme::item_style().bold()),
            theme::cursor_span(),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", description),
            theme::dim_style(),
        )),
        Line::from(""),
        theme::help_line(&[("Enter", "confirm"), ("Esc", "back")]),
    ];
    frame.render_widget(Paragraph::new(content), area);
}

pub(super) fn render_working(frame: &mut Frame, area: Rect, message: &str) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  \u{23f3} {}", message),
            theme::warning_style().bold(),
        )),
    ];
    frame.render_widget(Paragraph::new(content), area);
}

pub(super) fn render_summary(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: &[String],
    prompt: &str,
    warning: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(lines.len() as u16 + 2),
            Constraint::Min(1),
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!("  {}", title),
            theme::label_style(),
        ))),
        chunks[0],
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::dim_style());
    let box_lines: Vec<Line> = lines
        .iter()
        .map(|l| Line::from(Span::styled(format!(" {}", l), theme::item_style())))
        .collect();
    frame.render_widget(Paragraph::new(box_lines).block(block), chunks[1]);

    let mut tail = vec![Line::from("")];
    if let Some(warn) = warning {
        tail.push(Line::from(Span::styled(
            format!("  \u{26a0} {}", warn),
            theme::warning_style(),
        )));
        tail.push(Line::from(""));
    }
    tail.push(Line::from(Span::styled(
        format!("  {}", prompt),
        theme::warning_style().bold(),
    )));
    tail.push(Line::from(""));
    tail.push(theme::help_line(&[
        ("Y/Enter", "proceed"),
        ("N/Esc", "back"),
        ("b", "menu"),
    ]));
    frame.render_widget(Paragraph::new(tail), chunks[2]);
}
