//! Image format conversion wizard.
//!
//! Shortest of the three flows: pick a file, pick a target format (or type
//! a custom extension), confirm. The output lands next to the input as
//! `<stem>_conv.<format>`.

use std::path::PathBuf;

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use crate::files::{self, format_size};
use crate::jobs::JobRequest;
use crate::settings::IMAGE_FORMATS;

use super::file_select::{FileSelector, SelectorOutcome};
use super::pdf_wizard::{render_summary, render_working};
use super::theme;
use super::WizardEvent;

/// Index of the trailing "custom" entry in the format list.
const CUSTOM_INDEX: usize = IMAGE_FORMATS.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatStep {
    SelectFile,
    SelectFormat,
    Confirm,
    Working,
    Done,
}

pub struct FormatWizard {
    step: FormatStep,
    selector: FileSelector,

    format_cursor: usize,
    custom_mode: bool,
    custom_input: String,

    input_file: Option<PathBuf>,
    output_format: String,
    output_file: Option<PathBuf>,

    pending_job: Option<JobRequest>,
    result: String,
    result_is_error: bool,
    output_size: Option<u64>,

    finished: bool,
    wants_menu: bool,
    quit_requested: bool,
}

impl FormatWizard {
    pub fn new(start_dir: PathBuf) -> Self {
        Self {
            step: FormatStep::SelectFile,
            selector: FileSelector::new(start_dir, files::FileFilter::Image),
            format_cursor: 0,
            custom_mode: false,
            custom_input: String::new(),
            input_file: None,
            output_format: String::new(),
            output_file: None,
            pending_job: None,
            result: String::new(),
            result_is_error: false,
            output_size: None,
            finished: false,
            wants_menu: false,
            quit_requested: false,
        }
    }

    pub fn update(&mut self, event: &WizardEvent) {
        match self.step {
            FormatStep::SelectFile => match self.selector.update(event) {
                SelectorOutcome::Chosen(path) => {
                    self.input_file = Some(path);
                    self.step = FormatStep::SelectFormat;
                }
                SelectorOutcome::Cancelled => {
                    self.finished = true;
                    self.wants_menu = true;
                }
                SelectorOutcome::Pending => {}
            },

            FormatStep::SelectFormat => {
                if self.custom_mode {
                    self.update_custom_entry(event);
                } else {
                    self.update_format_list(event);
                }
            }

            FormatStep::Confirm => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                            if let (Some(input), Some(output)) =
                                (self.input_file.clone(), self.output_file.clone())
                            {
                                self.pending_job = Some(JobRequest::FormatConvert {
                                    input,
                                    format: self.output_format.clone(),
                                    output,
                                });
                                self.step = FormatStep::Working;
                            }
                        }
                        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                            self.step = FormatStep::SelectFormat;
                        }
                        KeyCode::Char('b') => {
                            self.finished = true;
                            self.wants_menu = true;
                        }
                        _ => {}
                    }
                }
            }

            FormatStep::Working => {
                if let WizardEvent::Job(outcome) = event {
                    self.result_is_error = !outcome.success;
                    self.output_size = outcome.output_size;
                    self.result = if outcome.success {
                        "Image converted successfully".to_string()
                    } else {
                        outcome.message.clone()
                    };
                    self.step = FormatStep::Done;
                }
            }

            FormatStep::Done => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Enter | KeyCode::Char('m') => {
                            self.finished = true;
                            self.wants_menu = true;
                        }
                        KeyCode::Char('a') => self.restart(),
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

    fn update_format_list(&mut self, event: &WizardEvent) {
        let option_count = IMAGE_FORMATS.len() + 1;
        if let WizardEvent::Key(key) = event {
            match key.code {
                KeyCode::Up => {
                    if self.format_cursor > 0 {
                        self.format_cursor -= 1;
                    } else {
                        self.format_cursor = option_count - 1;
                    }
                }
                KeyCode::Down => {
                    if self.format_cursor + 1 < option_count {
                        self.format_cursor += 1;
                    } else {
                        self.format_cursor = 0;
                    }
                }
                KeyCode::Enter => {
                    if self.format_cursor == CUSTOM_INDEX {
                        self.custom_mode = true;
                        self.custom_input.clear();
                    } else {
                        self.output_format = IMAGE_FORMATS[self.format_cursor].to_string();
                        self.build_output_path();
                        self.step = FormatStep::Confirm;
                    }
                }
                KeyCode::Esc | KeyCode::Backspace => {
                    self.selector.reset();
                    self.step = FormatStep::SelectFile;
                }
                _ => {}
            }
        }
    }

    fn update_custom_entry(&mut self, event: &WizardEvent) {
        if let WizardEvent::Key(key) = event {
            match key.code {
                KeyCode::Enter => {
                    let value = self.custom_input.trim();
                    // Empty input keeps the field open; a leading dot is
                    // stripped, the case the user typed is preserved.
                    if !value.is_empty() {
                        self.output_format =
                            value.strip_prefix('.').unwrap_or(value).to_string();
                        self.custom_mode = false;
                        self.build_output_path();
                        self.step = FormatStep::Confirm;
                    }
                }
                KeyCode::Esc => {
                    self.custom_mode = false;
                    self.custom_input.clear();
                }
                KeyCode::Backspace => {
                    self.custom_input.pop();
                }
                KeyCode::Char(c) => {
                    if self.custom_input.len() < 10 {
                        self.custom_input.push(c);
                    }
                }
                _ => {}
            }
        }
    }

    fn build_output_path(&mut self) {
        if let Some(input) = &self.input_file {
            self.output_file = Some(files::output_path_with_suffix(
                input,
                "_conv",
                &self.output_format,
            ));
        }
    }

    fn restart(&mut self) {
        self.selector.reset();
        self.step = FormatStep::SelectFile;
        self.format_cursor = 0;
        self.custom_mode = false;
        self.custom_input.clear();
        self.input_file = None;
        self.output_format.clear();
        self.output_file = None;
        self.pending_job = None;
        self.result.clear();
        self.result_is_error = false;
        self.output_size = None;
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

    pub fn step(&self) -> FormatStep {
        self.step
    }

    pub fn in_custom_entry(&self) -> bool {
        self.custom_mode
    }

    pub fn output_format(&self) -> &str {
        &self.output_format
    }

    pub fn output_file(&self) -> Option<&PathBuf> {
        self.output_file.as_ref()
    }

    pub fn result_line(&self) -> &str {
        &self.result
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(area);

        theme::render_header(frame, chunks[0], "Convert Image Format");
        let body = chunks[1];

        match self.step {
            FormatStep::SelectFile => self.selector.render(frame, body),
            FormatStep::SelectFormat => {
                if self.custom_mode {
                    self.render_custom_entry(frame, body);
                } else {
                    self.render_format_list(frame, body);
                }
            }
            FormatStep::Confirm => self.render_confirm(frame, body),
            FormatStep::Working => render_working(frame, body, "Converting... Please wait"),
            FormatStep::Done => self.render_done(frame, body),
        }
    }

    fn render_format_list(&self, frame: &mut Frame, area: Rect) {
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

        let mut items: Vec<ListItem> = IMAGE_FORMATS
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
        let custom_style = if self.format_cursor == CUSTOM_INDEX {
            theme::selected_style()
        } else {
            theme::item_style()
        };
        items.push(ListItem::new("  Custom (enter any format)").style(custom_style));

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

    fn render_custom_entry(&self, frame: &mut Frame, area: Rect) {
        let content = vec![
            Line::from(Span::styled("  Enter custom format:", theme::label_style())),
            Line::from(""),
            Line::from(vec![
                Span::raw("  "),
                Span::styled(self.custom_input.clone(), theme::item_style().bold()),
                theme::cursor_span(),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "  Examples: avif, webp, heic, ico, svg",
                theme::dim_style(),
            )),
            Line::from(""),
            theme::help_line(&[("Enter", "confirm"), ("Esc", "back")]),
        ];
        frame.render_widget(Paragraph::new(content), area);
    }

    fn render_confirm(&self, frame: &mut Frame, area: Rect) {
        let input_name = self
            .input_file
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let input_size = self
            .input_file
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);
        let input_ext = self
            .input_file
            .as_ref()
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_uppercase();
        let output_name = self
            .output_file
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let lines = vec![
            format!("Input:   {} ({})", input_name, format_size(input_size)),
            format!(
                "Format:  {} \u{2192} {}",
                input_ext,
                self.output_format.to_uppercase()
            ),
            format!("Output:  {}", output_name),
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
            if let Some(output) = &self.output_file {
                let size = self
                    .output_size
                    .map(format_size)
                    .unwrap_or_else(|| "unknown size".to_string());
                content.push(Line::from(""));
                content.push(Line::from(Span::styled(
                    format!("  Output: {} ({})", output.display(), size),
                    theme::dim_style(),
                )));
            }
        }
        content.push(Line::from(""));
        content.push(theme::help_line(&[
            ("Enter/m", "menu"),
            ("a", "convert another"),
            ("q", "quit"),
        ]));
        frame.render_widget(Paragraph::new(content), area);
    }
}
