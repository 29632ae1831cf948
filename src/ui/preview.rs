use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use super::styles;
use super::utils::format_bytes;
use crate::app::{App, PreviewState};

/// Render the preview panel (right column, only laid out while open).
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(preview) = &app.preview else { return };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    render_content(f, rows[0], app, preview);
    render_footer(f, rows[1], preview);
}

fn render_content(f: &mut Frame, area: Rect, app: &App, preview: &PreviewState) {
    let mut lines: Vec<Line> = Vec::new();

    if preview.is_binary {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " [Binary file cannot be previewed]",
            ratatui::style::Style::default().fg(styles::MUTED),
        )));
    } else if let Some(err) = &preview.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" [Error reading file: {}]", err),
            styles::error_style(),
        )));
    } else if let Some(content) = &preview.content {
        let gutter = app.config.display.line_numbers;
        let gutter_width = content.lines().count().to_string().len().max(3);
        for (idx, text_line) in content.lines().enumerate() {
            let mut spans = Vec::new();
            if gutter {
                spans.push(Span::styled(
                    format!("{:>width$} ", idx + 1, width = gutter_width),
                    ratatui::style::Style::default().fg(styles::DIM),
                ));
            }
            spans.push(Span::styled(
                text_line,
                ratatui::style::Style::default().fg(styles::TEXT),
            ));
            lines.push(Line::from(spans));
        }
    }

    let block = Block::default()
        .title(Span::styled(
            format!(" {} (r refresh · p close) ", preview.path),
            ratatui::style::Style::default().fg(styles::CYAN),
        ))
        .borders(Borders::LEFT)
        .border_style(ratatui::style::Style::default().fg(styles::BORDER))
        .style(ratatui::style::Style::default().bg(styles::SURFACE))
        .padding(Padding::new(0, 1, 0, 0));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((preview.scroll, 0));
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, area: Rect, preview: &PreviewState) {
    let mut spans = vec![Span::styled(
        format!(" Size: {}", format_bytes(preview.size)),
        ratatui::style::Style::default().fg(styles::DIM),
    )];
    if preview.truncated {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(" TRUNCATED ", styles::truncated_style()));
    }
    let bar = Paragraph::new(Line::from(spans))
        .style(ratatui::style::Style::default().bg(styles::PANEL));
    f.render_widget(bar, area);
}
