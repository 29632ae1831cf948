use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::styles;
use crate::app::{App, InputMode};

/// Render the top status bar: app name · root · include-all badge · tone
pub fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let panel_bg = ratatui::style::Style::default().bg(styles::PANEL);

    let root_label = app
        .root
        .as_ref()
        .map(|r| r.to_string_lossy().to_string())
        .unwrap_or_else(|| "no folder open".to_string());

    let mut spans: Vec<Span> = vec![
        Span::styled(
            " askcode",
            ratatui::style::Style::default()
                .fg(styles::CYAN)
                .add_modifier(ratatui::style::Modifier::BOLD),
        ),
        Span::styled(" · ", ratatui::style::Style::default().fg(styles::BORDER)),
        Span::styled(
            root_label,
            ratatui::style::Style::default().fg(styles::GREEN),
        ),
    ];

    if app.include_all {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            " ALL ",
            ratatui::style::Style::default()
                .fg(styles::BG)
                .bg(styles::YELLOW)
                .add_modifier(ratatui::style::Modifier::BOLD),
        ));
    }

    if app.pending_scans > 0 {
        spans.push(Span::styled(
            "  scanning…",
            ratatui::style::Style::default().fg(styles::YELLOW),
        ));
    }

    spans.push(Span::styled(
        format!("  tone: {}", app.config.request.tone),
        ratatui::style::Style::default().fg(styles::DIM),
    ));
    if app.config.request.allow_pseudocode {
        spans.push(Span::styled(
            "  pseudocode ok",
            ratatui::style::Style::default().fg(styles::DIM),
        ));
    }

    let bar = Paragraph::new(Line::from(spans)).style(panel_bg);
    f.render_widget(bar, area);
}

/// Render the bottom bar: key hints (left) + timing / notice (right)
pub fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let panel_bg = ratatui::style::Style::default().bg(styles::PANEL);

    let hints: &[(&str, &str)] = match app.input_mode {
        InputMode::Compose => &[("Enter", "send"), ("Esc", "cancel")],
        InputMode::Normal => &[
            ("o", "open folder"),
            ("F", "add files"),
            ("Space", "toggle"),
            ("a/A", "all/none"),
            ("i", "ask"),
            ("Tab", "focus"),
            ("]", "refs"),
            ("q", "quit"),
        ],
    };

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(*key, styles::key_hint_style()));
        spans.push(Span::styled(
            format!(" {}  ", label),
            ratatui::style::Style::default().fg(styles::DIM),
        ));
    }

    // Right side: notification wins over timing
    let right_text = if let Some(notice) = &app.notice {
        Some((notice.clone(), ratatui::style::Style::default().fg(styles::YELLOW)))
    } else {
        app.session.last_response_ms.map(|ms| {
            (
                format!("Response in {} ms", ms),
                ratatui::style::Style::default().fg(styles::DIM),
            )
        })
    };

    if let Some((text, style)) = right_text {
        let left_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let total = area.width as usize;
        let pad = total
            .saturating_sub(left_width)
            .saturating_sub(text.chars().count() + 1);
        spans.push(Span::raw(" ".repeat(pad)));
        spans.push(Span::styled(text, style));
    }

    let bar = Paragraph::new(Line::from(spans)).style(panel_bg);
    f.render_widget(bar, area);
}
