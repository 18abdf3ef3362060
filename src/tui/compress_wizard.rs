//! Image/PDF compression wizard.
//!
//! Two target methods: a percentage of the original size, or a fixed byte
//! target entered as value + unit. PDFs keep their extension; any other
//! input is redirected to `.jpg`, which is what the size-targeted encoder
//! can actually hit.

use std::fs;
use std::path::PathBuf;

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, Paragraph};

use crate::files::{self, format_size, is_pdf_file};
use crate::jobs::{percent_target_bytes, unit_target_bytes, JobRequest};
use crate::settings::Settings;

use super::file_select::{FileSelector, SelectorOutcome};
use super::pdf_wizard::{render_input_field, render_summary, render_working};
use super::theme;
use super::{numeric_or_default, WizardEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressStep {
    SelectFile,
    SelectMethod,
    SetPercent,
    SetSizeValue,
    SetSizeUnit,
    Confirm,
    Working,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressMethod {
    Percent,
    FixedSize,
}

const METHODS: &[(&str, &str)] = &[
    (
        "By Percentage",
        "Compress to a percentage of original size (e.g., 50%)",
    ),
    (
        "Fixed File Size",
        "Compress to exact target size (e.g., 100KB)",
    ),
];

pub struct CompressWizard {
    step: CompressStep,
    selector: FileSelector,
    settings: Settings,

    method_cursor: usize,
    method: CompressMethod,
    percent_input: String,
    size_input: String,
    unit_input: String,

    input_file: Option<PathBuf>,
    input_size: u64,
    percent: u32,
    size_value: u64,
    size_unit: String,
    target_bytes: u64,
    output_file: Option<PathBuf>,

    pending_job: Option<JobRequest>,
    result: String,
    result_is_error: bool,
    output_size: Option<u64>,

    finished: bool,
    wants_menu: bool,
    quit_requested: bool,
}

impl CompressWizard {
    pub fn new(start_dir: PathBuf, settings: &Settings) -> Self {
        Self {
            step: CompressStep::SelectFile,
            selector: FileSelector::new(start_dir, files::FileFilter::ImageOrPdf),
            settings: settings.clone(),
            method_cursor: 0,
            method: CompressMethod::Percent,
            percent_input: String::new(),
            size_input: String::new(),
            unit_input: String::new(),
            input_file: None,
            input_size: 0,
            percent: settings.compress_percent,
            size_value: 100,
            size_unit: "KB".to_string(),
            target_bytes: 0,
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
            CompressStep::SelectFile => match self.selector.update(event) {
                SelectorOutcome::Chosen(path) => {
                    self.input_size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                    self.output_file = Some(files::compress_output_path(&path));
                    self.input_file = Some(path);
                    self.step = CompressStep::SelectMethod;
                }
                SelectorOutcome::Cancelled => {
                    self.finished = true;
                    self.wants_menu = true;
                }
                SelectorOutcome::Pending => {}
            },

            CompressStep::SelectMethod => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Up => {
                            if self.method_cursor > 0 {
                                self.method_cursor -= 1;
                            } else {
                                self.method_cursor = METHODS.len() - 1;
                            }
                        }
                        KeyCode::Down => {
                            if self.method_cursor + 1 < METHODS.len() {
                                self.method_cursor += 1;
                            } else {
                                self.method_cursor = 0;
                            }
                        }
                        KeyCode::Enter => {
                            if self.method_cursor == 0 {
                                self.method = CompressMethod::Percent;
                                self.step = CompressStep::SetPercent;
                            } else {
                                self.method = CompressMethod::FixedSize;
                                self.step = CompressStep::SetSizeValue;
                            }
                        }
                        KeyCode::Esc | KeyCode::Backspace => {
                            self.selector.reset();
                            self.step = CompressStep::SelectFile;
                        }
                        _ => {}
                    }
                }
            }

            CompressStep::SetPercent => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Enter => {
                            self.percent = numeric_or_default(
                                &self.percent_input,
                                self.settings.compress_percent,
                                1,
                                100,
                            );
                            self.target_bytes =
                                percent_target_bytes(self.input_size, self.percent);
                            self.step = CompressStep::Confirm;
                        }
                        KeyCode::Esc => self.step = CompressStep::SelectMethod,
                        KeyCode::Backspace => {
                            self.percent_input.pop();
                        }
                        KeyCode::Char(c) if c.is_ascii_digit() => {
                            if self.percent_input.len() < 3 {
                                self.percent_input.push(c);
                            }
                        }
                        _ => {}
                    }
                }
            }

            CompressStep::SetSizeValue => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Enter => {
                            self.size_value = parse_size_value(&self.size_input);
                            self.step = CompressStep::SetSizeUnit;
                        }
                        KeyCode::Esc => self.step = CompressStep::SelectMethod,
                        KeyCode::Backspace => {
                            self.size_input.pop();
                        }
                        // Unit-letter shortcuts skip the separate unit step,
                        // but only once the numeric field actually parses.
                        KeyCode::Char('k') | KeyCode::Char('K') => self.finish_size_with_unit("KB"),
                        KeyCode::Char('m') | KeyCode::Char('M') => self.finish_size_with_unit("MB"),
                        KeyCode::Char('b') | KeyCode::Char('B') => self.finish_size_with_unit("B"),
                        KeyCode::Char(c) if c.is_ascii_digit() => {
                            if self.size_input.len() < 10 {
                                self.size_input.push(c);
                            }
                        }
                        _ => {}
                    }
                }
            }

            CompressStep::SetSizeUnit => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Enter => {
                            let unit = self.unit_input.trim().to_uppercase();
                            self.size_unit = if unit.is_empty() {
                                "KB".to_string()
                            } else {
                                unit
                            };
                            self.target_bytes =
                                unit_target_bytes(self.size_value, &self.size_unit);
                            self.step = CompressStep::Confirm;
                        }
                        KeyCode::Esc => {
                            self.unit_input.clear();
                            self.step = CompressStep::SetSizeValue;
                        }
                        KeyCode::Backspace => {
                            self.unit_input.pop();
                        }
                        KeyCode::Char(c) if c.is_ascii_alphabetic() => {
                            if self.unit_input.len() < 2 {
                                self.unit_input.push(c);
                            }
                        }
                        _ => {}
                    }
                }
            }

            CompressStep::Confirm => {
                if let WizardEvent::Key(key) = event {
                    match key.code {
                        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                            if let (Some(input), Some(output)) =
                                (self.input_file.clone(), self.output_file.clone())
                            {
                                self.pending_job = Some(JobRequest::Compress {
                                    input,
                                    input_size: self.input_size,
                                    target_bytes: self.target_bytes,
                                    output,
                                });
                                self.step = CompressStep::Working;
                            }
                        }
                        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                            self.step = match self.method {
                                CompressMethod::Percent => CompressStep::SetPercent,
                                CompressMethod::FixedSize => CompressStep::SetSizeValue,
                            };
                        }
                        KeyCode::Char('b') => {
                            self.finished = true;
                            self.wants_menu = true;
                        }
                        _ => {}
                    }
                }
            }

            CompressStep::Working => {
                if let WizardEvent::Job(outcome) = event {
                    self.result_is_error = !outcome.success;
                    self.output_size = outcome.output_size;
                    self.result = if outcome.success {
                        self.compose_success_message(outcome.output_size.unwrap_or(0))
                    } else {
                        outcome.message.clone()
                    };
                    self.step = CompressStep::Done;
                }
            }

            CompressStep::Done => {
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

    fn finish_size_with_unit(&mut self, unit: &str) {
        if let Ok(value) = self.size_input.trim().parse::<u64>() {
            self.size_value = value.max(1);
            self.size_unit = unit.to_string();
            self.target_bytes = unit_target_bytes(self.size_value, unit);
            self.step = CompressStep::Confirm;
        }
    }

    /// Honest reporting: the target-miss case is not an error, just a fact
    /// about what the encoder could achieve.
    fn compose_success_message(&self, output_size: u64) -> String {
        if output_size > self.target_bytes {
            return format!(
                "Compressed, but couldn't reach target. Best possible: {}",
                format_size(output_size)
            );
        }
        let reduction = if self.input_size > 0 {
            (self.input_size.saturating_sub(output_size)) as f64 / self.input_size as f64 * 100.0
        } else {
            0.0
        };
        format!("Compressed successfully! Reduced by {:.1}%", reduction)
    }

    fn restart(&mut self) {
        self.selector.reset();
        self.step = CompressStep::SelectFile;
        self.method_cursor = 0;
        self.method = CompressMethod::Percent;
        self.percent_input.clear();
        self.size_input.clear();
        self.unit_input.clear();
        self.input_file = None;
        self.input_size = 0;
        self.percent = self.settings.compress_percent;
        self.size_value = 100;
        self.size_unit = "KB".to_string();
        self.target_bytes = 0;
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

    pub fn step(&self) -> CompressStep {
        self.step
    }

    pub fn method(&self) -> CompressMethod {
        self.method
    }

    pub fn target_bytes(&self) -> u64 {
        self.target_bytes
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

        theme::render_header(frame, chunks[0], "Compress Image/PDF");
        let body = chunks[1];

        match self.step {
            CompressStep::SelectFile => self.selector.render(frame, body),
            CompressStep::SelectMethod => self.render_method_select(frame, body),
            CompressStep::SetPercent => self.render_percent_input(frame, body),
            CompressStep::SetSizeValue => self.render_size_value(frame, body),
            CompressStep::SetSizeUnit => render_input_field(
                frame,
                body,
                &format!("Size: {} \u{2014} enter unit:", self.size_value),
                &self.unit_input,
                "B, KB, or MB (default KB)",
            ),
            CompressStep::Confirm => self.render_confirm(frame, body),
            CompressStep::Working => render_working(frame, body, "Compressing... Please wait"),
            CompressStep::Done => self.render_done(frame, body),
        }
    }

    fn render_method_select(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        let input_name = self
            .input_file
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let intro = vec![
            Line::from(Span::styled(
                "  Select compression method:",
                theme::label_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("  Input file: {} ({})", input_name, format_size(self.input_size)),
                theme::dim_style(),
            )),
        ];
        frame.render_widget(Paragraph::new(intro), chunks[0]);

        let items: Vec<ListItem> = METHODS
            .iter()
            .enumerate()
            .flat_map(|(i, (title, desc))| {
                let style = if i == self.method_cursor {
                    theme::selected_style()
                } else {
                    theme::item_style()
                };
                let mut rows = vec![ListItem::new(format!("  {}", title)).style(style)];
                if i == self.method_cursor {
                    rows.push(
                        ListItem::new(format!("    {}", desc)).style(theme::dim_style()),
                    );
                }
                rows
            })
            .collect();
        frame.render_widget(List::new(items), chunks[1]);

        frame.render_widget(
            Paragraph::new(theme::help_line(&[
                ("\u{2191}\u{2193}", "navigate"),
                ("Enter", "select"),
                ("Esc", "back"),
            ])),
            chunks[2],
        );
    }

    fn render_percent_input(&self, frame: &mut Frame, area: Rect) {
        // Live preview of the target for whatever is currently typed.
        let preview_pct = match self.percent_input.trim().parse::<u32>() {
            Ok(p) if (1..=100).contains(&p) => p,
            _ => self.settings.compress_percent,
        };
        let preview = percent_target_bytes(self.input_size, preview_pct);
        render_input_field(
            frame,
            area,
            "Target percentage (1-100):",
            &self.percent_input,
            &format!(
                "Current: {} \u{2192} Target: ~{}",
                format_size(self.input_size),
                format_size(preview)
            ),
        );
    }

    fn render_size_value(&self, frame: &mut Frame, area: Rect) {
        render_input_field(
            frame,
            area,
            "Target file size:",
            &self.size_input,
            &format!(
                "Current: {} | Enter number, then K for KB, M for MB, B for bytes, or Enter to pick a unit",
                format_size(self.input_size)
            ),
        );
    }

    fn render_confirm(&self, frame: &mut Frame, area: Rect) {
        let input_name = self
            .input_file
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output_name = self
            .output_file
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (method_str, target_str) = match self.method {
            CompressMethod::Percent => (
                "Percentage",
                format!("{}% of original", self.percent),
            ),
            CompressMethod::FixedSize => (
                "Fixed Size",
                format!("{} {}", self.size_value, self.size_unit),
            ),
        };

        let lines = vec![
            format!("Input:   {} ({})", input_name, format_size(self.input_size)),
            format!("Method:  {}", method_str),
            format!(
                "Target:  {} ({})",
                target_str,
                format_size(self.target_bytes)
            ),
            format!("Output:  {}", output_name),
        ];

        let is_pdf = self
            .input_file
            .as_ref()
            .map(|p| is_pdf_file(&p.to_string_lossy()))
            .unwrap_or(false);
        let warning = is_pdf.then_some("PDF compression may rasterize content");

        render_summary(
            frame,
            area,
            "Compression Summary",
            &lines,
            "Proceed with compression? (Y/n)",
            warning,
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
            content.push(Line::from(""));
            let compressed = self
                .output_size
                .map(format_size)
                .unwrap_or_else(|| "unknown".to_string());
            content.push(Line::from(Span::styled(
                format!(
                    "  Original: {} \u{2192} Compressed: {}",
                    format_size(self.input_size),
                    compressed
                ),
                theme::dim_style(),
            )));
            if let Some(output) = &self.output_file {
                content.push(Line::from(Span::styled(
                    format!("  Output: {}", output.display()),
                    theme::dim_style(),
                )));
            }
        }
        content.push(Line::from(""));
        content.push(theme::help_line(&[
            ("Enter/m", "menu"),
            ("a", "compress another"),
            ("q", "quit"),
        ]));
        frame.render_widget(Paragraph::new(content), area);
    }
}

/// Empty or unparseable size input falls back to 100; zero is bumped to the
/// minimum of 1.
fn parse_size_value(input: &str) -> u64 {
    let value = match input.trim() {
        "" => 100,
        s => s.parse::<u64>().unwrap_or(100),
    };
    value.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_value_parse_or_default() {
        assert_eq!(parse_size_value(""), 100);
        assert_eq!(parse_size_value("junk"), 100);
        assert_eq!(parse_size_value("0"), 1);
        assert_eq!(parse_size_value("250"), 250);
    }
}
