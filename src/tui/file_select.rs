//! Shared file-selection component.
//!
//! Every wizard starts by choosing an input file. The selector offers the
//! matching files of one directory as a navigable list and, alternatively, a
//! free-text mode for typed or pasted paths. Pasting something that looks
//! like a filesystem path flips into text mode automatically, seeded with
//! the pasted content.

use std::fs;
use std::path::PathBuf;

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use thiserror::Error;
use tracing::debug;

use crate::files::{self, FileEntry, FileFilter};

use super::theme;
use super::WizardEvent;

const INPUT_LIMIT: usize = 500;
const VISIBLE_ROWS: usize = 15;

/// Step-local selection failures. Shown persistently until the user corrects
/// the input or cancels; never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("'{0}' is a directory, not a file")]
    IsDirectory(String),
    #[error("unsupported file type for this operation")]
    UnsupportedType,
    #[error("cannot read directory: {0}")]
    DirUnreadable(String),
}

/// What one `update` call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorOutcome {
    /// Still collecting input.
    Pending,
    /// The user picked this file.
    Chosen(PathBuf),
    /// The user backed out of selection entirely.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectorMode {
    List,
    TextEntry,
}

pub struct FileSelector {
    dir: PathBuf,
    filter: FileFilter,
    entries: Vec<FileEntry>,
    cursor: usize,
    mode: SelectorMode,
    input: String,
    error: Option<SelectError>,
}

impl FileSelector {
    /// The filter is fixed for the lifetime of the selector; the owning
    /// wizard decides it at construction.
    pub fn new(dir: PathBuf, filter: FileFilter) -> Self {
        let mut selector = Self {
            dir,
            filter,
            entries: Vec::new(),
            cursor: 0,
            mode: SelectorMode::List,
            input: String::new(),
            error: None,
        };
        selector.refresh();
        selector
    }

    /// Recompute the listing. Called on construction and whenever the
    /// directory changes; the list is never patched incrementally.
    fn refresh(&mut self) {
        self.cursor = 0;
        match files::list_files(&self.dir, self.filter) {
            Ok(entries) => {
                self.entries = entries;
            }
            Err(e) => {
                self.entries = Vec::new();
                self.error = Some(SelectError::DirUnreadable(e.to_string()));
            }
        }
    }

    pub fn set_directory(&mut self, dir: PathBuf) {
        self.dir = dir;
        self.error = None;
        self.refresh();
    }

    /// Clear chosen/cancelled/error state and the cursor without touching
    /// directory or filter. Used when a wizard restarts for another file.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.mode = SelectorMode::List;
        self.input.clear();
        self.error = None;
    }

    pub fn update(&mut self, event: &WizardEvent) -> SelectorOutcome {
        match self.mode {
            SelectorMode::List => self.update_list(event),
            SelectorMode::TextEntry => self.update_text(event),
        }
    }

    fn update_list(&mut self, event: &WizardEvent) -> SelectorOutcome {
        match event {
            WizardEvent::Paste(text) => {
                if files::looks_like_path(text) {
                    debug!(input = %text, "auto-detected pasted path");
                    self.enter_text_mode(text);
                }
                SelectorOutcome::Pending
            }
            WizardEvent::Key(key) => match key.code {
                KeyCode::Up => {
                    if self.cursor > 0 {
                        self.cursor -= 1;
                    } else if !self.entries.is_empty() {
                        self.cursor = self.entries.len() - 1;
                    }
                    SelectorOutcome::Pending
                }
                KeyCode::Down => {
                    if self.cursor + 1 < self.entries.len() {
                        self.cursor += 1;
                    } else {
                        self.cursor = 0;
                    }
                    SelectorOutcome::Pending
                }
                KeyCode::Enter => {
                    if let Some(entry) = self.entries.get(self.cursor) {
                        SelectorOutcome::Chosen(entry.path.clone())
                    } else {
                        SelectorOutcome::Pending
                    }
                }
                KeyCode::Char('p') => {
                    self.enter_text_mode("");
                    SelectorOutcome::Pending
                }
                KeyCode::Esc | KeyCode::Backspace => SelectorOutcome::Cancelled,
                _ => SelectorOutcome::Pending,
            },
            _ => SelectorOutcome::Pending,
        }
    }

    fn update_text(&mut self, event: &WizardEvent) -> SelectorOutcome {
        match event {
            WizardEvent::Paste(text) => {
                if self.input.len() + text.len() <= INPUT_LIMIT {
                    self.input.push_str(text);
                }
                SelectorOutcome::Pending
            }
            WizardEvent::Key(key) => match key.code {
                KeyCode::Enter => self.confirm_text(),
                KeyCode::Esc => {
                    self.mode = SelectorMode::List;
                    self.input.clear();
                    self.error = None;
                    SelectorOutcome::Pending
                }
                KeyCode::Backspace => {
                    self.input.pop();
                    SelectorOutcome::Pending
                }
                KeyCode::Char(c) => {
                    if self.input.len() < INPUT_LIMIT {
                        self.input.push(c);
                    }
                    SelectorOutcome::Pending
                }
                _ => SelectorOutcome::Pending,
            },
            _ => SelectorOutcome::Pending,
        }
    }

    fn enter_text_mode(&mut self, seed: &str) {
        self.mode = SelectorMode::TextEntry;
        self.error = None;
        self.input = seed.to_string();
    }

    /// Validate the typed path: it must exist, be a file, and pass the
    /// filter. On failure the typed value is kept and the error exposed.
    fn confirm_text(&mut self) -> SelectorOutcome {
        let raw = self.input.trim().trim_matches(['"', '\'', '`']).to_string();
        if raw.is_empty() {
            return SelectorOutcome::Pending;
        }

        let path = PathBuf::from(&raw);
        match fs::metadata(&path) {
            Err(_) => {
                self.error = Some(SelectError::NotFound(raw));
                SelectorOutcome::Pending
            }
            Ok(meta) if meta.is_dir() => {
                self.error = Some(SelectError::IsDirectory(raw));
                SelectorOutcome::Pending
            }
            Ok(_) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if self.filter.matches(&name) {
                    debug!(path = %path.display(), "file selected via manual path");
                    SelectorOutcome::Chosen(path)
                } else {
                    self.error = Some(SelectError::UnsupportedType);
                    SelectorOutcome::Pending
                }
            }
        }
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn error(&self) -> Option<&SelectError> {
        self.error.as_ref()
    }

    pub fn in_text_mode(&self) -> bool {
        self.mode == SelectorMode::TextEntry
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // directory line
                Constraint::Length(2), // error line
                Constraint::Min(1),    // list / input
                Constraint::Length(1), // help
            ])
            .split(area);

        let dir_line = Line::from(vec![
            Span::styled("  Directory: ", theme::label_style()),
            Span::styled(self.dir.display().to_string(), theme::dim_style()),
        ]);
        frame.render_widget(Paragraph::new(dir_line), chunks[0]);

        if let Some(err) = &self.error {
            let err_line = Line::from(Span::styled(format!("  {}", err), theme::error_style()));
            frame.render_widget(Paragraph::new(err_line), chunks[1]);
        }

        if self.in_text_mode() {
            self.render_text_entry(frame, chunks[2], chunks[3]);
        } else {
            self.render_list(frame, chunks[2], chunks[3]);
        }
    }

    fn render_text_entry(&self, frame: &mut Frame, body: Rect, help: Rect) {
        let content = vec![
            Line::from(Span::styled("  Enter file path:", theme::label_style())),
            Line::from(""),
            Line::from(vec![
                Span::raw("  "),
                Span::styled(self.input.clone(), theme::item_style()),
                theme::cursor_span(),
            ]),
        ];
        frame.render_widget(Paragraph::new(content), body);
        frame.render_widget(
            Paragraph::new(theme::help_line(&[
                ("Enter", "confirm"),
                ("Esc", "back to list"),
            ])),
            help,
        );
    }

    fn render_list(&self, frame: &mut Frame, body: Rect, help: Rect) {
        if self.entries.is_empty() {
            let msg = format!(
                "  No {} file(s) found in this directory.",
                self.filter.describe()
            );
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(msg, theme::warning_style()))),
                body,
            );
            frame.render_widget(
                Paragraph::new(theme::help_line(&[
                    ("p", "enter path manually"),
                    ("Esc", "back"),
                ])),
                help,
            );
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(body);

        let heading = format!(
            "  Found {} {} file(s):",
            self.entries.len(),
            self.filter.describe()
        );
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                heading,
                Style::default().fg(theme::ACCENT).bold(),
            ))),
            chunks[0],
        );

        let visible = VISIBLE_ROWS.min(chunks[1].height as usize).max(1);
        let start = theme::window_start(self.cursor, visible);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .skip(start)
            .take(visible)
            .map(|(i, entry)| {
                let style = if i == self.cursor {
                    theme::selected_style()
                } else {
                    theme::item_style()
                };
                let text = format!(
                    "  {:2}. {} ({})",
                    i + 1,
                    entry.name,
                    files::format_size(entry.size)
                );
                ListItem::new(text).style(style)
            })
            .collect();

        let list = List::new(items);
        let mut list_state = ListState::default();
        list_state.select(Some(self.cursor.saturating_sub(start)));
        frame.render_stateful_widget(list, chunks[1], &mut list_state);

        frame.render_widget(
            Paragraph::new(theme::help_line(&[
                ("\u{2191}\u{2193}", "navigate"),
                ("Enter", "select"),
                ("p", "enter path"),
                ("Esc", "back"),
            ])),
            help,
        );
    }
}
