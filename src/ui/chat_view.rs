use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use super::styles;
use super::utils::wrap_ranges;
use crate::app::{App, Focus, InputMode};
use crate::chat::annotate::{annotate, segments, Match, Segment};
use crate::chat::Role;

/// Render the conversation pane (middle column) plus the composer line.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    render_messages(f, rows[0], app);
    render_composer(f, rows[1], app);
}

fn render_messages(f: &mut Frame, area: Rect, app: &App) {
    let known_paths = app.session.selection.known_paths();
    let wrap_width = area.width.saturating_sub(3) as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut ref_base = 0usize;

    if app.session.conversation().is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Session-only chat (cleared on exit).",
            ratatui::style::Style::default().fg(styles::MUTED),
        )));
        lines.push(Line::from(Span::styled(
            " Select files, then press i to ask about them.",
            ratatui::style::Style::default().fg(styles::DIM),
        )));
    }

    for msg in app.session.conversation() {
        let (label, label_style) = match msg.role {
            Role::User => ("you", styles::user_style()),
            Role::Assistant => ("assistant", styles::assistant_style()),
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", label), label_style),
            Span::styled(
                clock_of(&msg.timestamp),
                ratatui::style::Style::default().fg(styles::DIM),
            ),
        ]));

        match msg.role {
            Role::User => {
                let body = ratatui::style::Style::default().fg(styles::TEXT);
                for (start, end) in wrap_ranges(&msg.text, wrap_width) {
                    lines.push(Line::from(Span::styled(
                        format!(" {}", &msg.text[start..end]),
                        body,
                    )));
                }
            }
            Role::Assistant => {
                let matches = annotate(&msg.text, &known_paths);
                let body = if is_error_text(&msg.text) {
                    styles::error_style()
                } else {
                    ratatui::style::Style::default().fg(styles::TEXT)
                };
                lines.extend(annotated_lines(
                    &msg.text,
                    &matches,
                    body,
                    ref_base,
                    app.ref_focus,
                    wrap_width,
                ));
                ref_base += matches.len();
            }
        }
        lines.push(Line::from(""));
    }

    if app.session.request_in_flight {
        lines.push(Line::from(Span::styled(
            " Waiting for model...",
            ratatui::style::Style::default().fg(styles::YELLOW),
        )));
    }

    let focused = app.focus == Focus::Chat;
    let title_style = if focused {
        ratatui::style::Style::default().fg(styles::BLUE)
    } else {
        ratatui::style::Style::default().fg(styles::MUTED)
    };

    let block = Block::default()
        .title(Span::styled(" CHAT ", title_style))
        .borders(Borders::NONE)
        .style(styles::default_style())
        .padding(Padding::new(0, 1, 0, 0));

    // Pin to the latest messages unless the user scrolled up
    let total = lines.len() as u16;
    let visible = area.height.saturating_sub(1);
    let bottom = total.saturating_sub(visible);
    let scroll = bottom.saturating_sub(app.chat_scroll);

    let paragraph = Paragraph::new(lines).block(block).scroll((scroll, 0));
    f.render_widget(paragraph, area);
}

/// Build wrapped lines for assistant text from the annotator's partition,
/// styling reference spans in place. A reference broken across a wrap
/// boundary keeps its styling on both fragments.
fn annotated_lines<'a>(
    text: &'a str,
    matches: &[Match],
    body: ratatui::style::Style,
    ref_base: usize,
    ref_focus: Option<usize>,
    wrap_width: usize,
) -> Vec<Line<'a>> {
    // Partition with absolute offsets: (start, end, reference index)
    let mut pieces: Vec<(usize, usize, Option<usize>)> = Vec::new();
    let mut pos = 0usize;
    let mut ref_idx = 0usize;
    for seg in segments(text, matches) {
        match seg {
            Segment::Text(t) => {
                pieces.push((pos, pos + t.len(), None));
                pos += t.len();
            }
            Segment::Reference { text: t, .. } => {
                pieces.push((pos, pos + t.len(), Some(ref_idx)));
                pos += t.len();
                ref_idx += 1;
            }
        }
    }

    let mut lines = Vec::new();
    for (start, end) in wrap_ranges(text, wrap_width) {
        let mut spans: Vec<Span> = vec![Span::raw(" ")];
        for (piece_start, piece_end, reference) in &pieces {
            let s = (*piece_start).max(start);
            let e = (*piece_end).min(end);
            if s >= e {
                continue;
            }
            let style = match reference {
                Some(i) if ref_focus == Some(ref_base + i) => styles::reference_focus_style(),
                Some(_) => styles::reference_style(),
                None => body,
            };
            spans.push(Span::styled(&text[s..e], style));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn render_composer(f: &mut Frame, area: Rect, app: &App) {
    let composing = app.input_mode == InputMode::Compose;

    let (title, title_style) = if app.session.request_in_flight {
        (
            " ASK · waiting ",
            ratatui::style::Style::default().fg(styles::YELLOW),
        )
    } else if composing {
        (
            " ASK (Enter send · Esc cancel) ",
            ratatui::style::Style::default().fg(styles::CYAN),
        )
    } else {
        (
            " ASK (i) ",
            ratatui::style::Style::default().fg(styles::MUTED),
        )
    };

    let mut spans = vec![Span::styled(
        " › ",
        ratatui::style::Style::default().fg(styles::CYAN),
    )];
    if composing {
        spans.push(Span::styled(
            app.compose_input.as_str(),
            ratatui::style::Style::default().fg(styles::BRIGHT),
        ));
        spans.push(Span::styled(
            "▏",
            ratatui::style::Style::default().fg(styles::CYAN),
        ));
    } else {
        spans.push(Span::styled(
            app.compose_input.as_str(),
            ratatui::style::Style::default().fg(styles::DIM),
        ));
    }

    let block = Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::TOP)
        .border_style(ratatui::style::Style::default().fg(styles::BORDER))
        .style(styles::default_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    f.render_widget(paragraph, area);
}

/// Assistant entries carrying a formatted request failure
fn is_error_text(text: &str) -> bool {
    text.starts_with("Server error: ") || text.starts_with("Network error: ")
}

/// HH:MM:SS slice of an ISO 8601 timestamp, or the raw string if shorter
fn clock_of(timestamp: &str) -> String {
    if timestamp.len() >= 19 {
        timestamp[11..19].to_string()
    } else {
        timestamp.to_string()
    }
}
