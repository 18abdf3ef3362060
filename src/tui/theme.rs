//! Shared styles and small rendering helpers for the wizard screens.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub const ACCENT: Color = Color::Cyan;

pub fn header_style() -> Style {
    Style::default().fg(Color::Black).bg(ACCENT).bold()
}

pub fn label_style() -> Style {
    Style::default().fg(Color::DarkGray).bold()
}

pub fn dim_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn selected_style() -> Style {
    Style::default().fg(Color::Black).bg(ACCENT).bold()
}

pub fn error_style() -> Style {
    Style::default().fg(Color::Red)
}

pub fn success_style() -> Style {
    Style::default().fg(Color::Green)
}

pub fn warning_style() -> Style {
    Style::default().fg(Color::Yellow)
}

/// Render a screen header bar: ` Title ` on the accent background.
pub fn render_header(frame: &mut Frame, area: Rect, title: &str) {
    let line = Line::from(Span::styled(format!(" {} ", title), header_style()));
    frame.render_widget(Paragraph::new(line), area);
}

/// Key-hint line: alternating accent keys and dim descriptions.
pub fn help_line(entries: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(entries.len() * 2 + 1);
    spans.push(Span::raw("  "));
    for (key, desc) in entries {
        spans.push(Span::styled(key.to_string(), Style::default().fg(ACCENT)));
        spans.push(Span::styled(
            format!(" {}  ", desc),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

/// Block cursor appended to live text inputs.
pub fn cursor_span() -> Span<'static> {
    Span::styled("\u{258c}", Style::default().fg(ACCENT))
}

/// First visible index for a list window of `height` rows keeping `selected`
/// in view.
pub fn window_start(selected: usize, height: usize) -> usize {
    if height > 0 && selected >= height {
        selected - height + 1
    } else {
        0
    }
}
