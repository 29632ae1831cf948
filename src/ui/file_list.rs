use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding},
    Frame,
};

use super::styles;
use super::utils::format_bytes;
use crate::app::{App, Focus};

/// Render the selection list (left column).
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let entries = app.session.selection.entries();
    let focused = app.focus == Focus::Files;

    let title = if entries.is_empty() {
        " FILES ".to_string()
    } else {
        format!(
            " FILES {}/{} included ",
            app.session.selection.included_count(),
            entries.len()
        )
    };

    let mut items: Vec<ListItem> = Vec::new();

    if entries.is_empty() {
        items.push(
            ListItem::new(Line::from(Span::styled(
                " No files selected.",
                ratatui::style::Style::default().fg(styles::MUTED),
            )))
            .style(styles::surface_style()),
        );
        items.push(
            ListItem::new(Line::from(Span::styled(
                " Press o to open a folder.",
                ratatui::style::Style::default().fg(styles::DIM),
            )))
            .style(styles::surface_style()),
        );
    }

    let path_width = area.width.saturating_sub(14) as usize;

    for (idx, entry) in entries.iter().enumerate() {
        let is_sel = focused && idx == app.selected_file;
        let marker = if is_sel { "▶ " } else { "  " };
        let checkbox = if entry.included { "[x] " } else { "[ ] " };

        let mut spans = vec![
            Span::styled(marker, ratatui::style::Style::default().fg(styles::CYAN)),
            Span::styled(
                checkbox,
                if entry.included {
                    styles::included_style()
                } else {
                    ratatui::style::Style::default().fg(styles::DIM)
                },
            ),
            Span::styled(
                shorten_path(&entry.path, path_width),
                if is_sel {
                    ratatui::style::Style::default().fg(styles::BRIGHT)
                } else if entry.included {
                    ratatui::style::Style::default().fg(styles::TEXT)
                } else {
                    ratatui::style::Style::default().fg(styles::MUTED)
                },
            ),
        ];

        if entry.truncated {
            spans.push(Span::raw(" "));
            spans.push(Span::styled("TRUNC", styles::truncated_style()));
        }

        let line_style = if is_sel {
            styles::selected_style()
        } else {
            styles::surface_style()
        };

        let mut rows = vec![ListItem::new(Line::from(spans)).style(line_style)];

        // Secondary row: name · size · media type
        if app.config.display.show_sizes {
            let mut detail = format!("      {} · {}", entry.name, format_bytes(entry.size));
            if let Some(mime) = &entry.mime_hint {
                detail.push_str(" · ");
                detail.push_str(mime);
            }
            let detail = Line::from(Span::styled(
                detail,
                ratatui::style::Style::default().fg(styles::DIM),
            ));
            rows.push(ListItem::new(detail).style(line_style));
        }

        items.extend(rows);
    }

    let border_style = if focused {
        ratatui::style::Style::default().fg(styles::BLUE)
    } else {
        ratatui::style::Style::default().fg(styles::BORDER)
    };

    let block = Block::default()
        .title(Span::styled(
            title,
            ratatui::style::Style::default().fg(styles::MUTED),
        ))
        .borders(Borders::RIGHT)
        .border_style(border_style)
        .style(ratatui::style::Style::default().bg(styles::SURFACE))
        .padding(Padding::new(0, 0, 0, 0));

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}

/// Shorten a path to fit within max_width, keeping the tail (the filename
/// end) visible.
fn shorten_path(path: &str, max_width: usize) -> String {
    let count = path.chars().count();
    if count <= max_width {
        return path.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let keep = max_width - 1;
    let tail: String = path
        .chars()
        .skip(count - keep)
        .collect();
    format!("…{}", tail)
}

#[cfg(test)]
mod tests {
    use super::shorten_path;

    #[test]
    fn short_path_is_unchanged() {
        assert_eq!(shorten_path("src/main.rs", 30), "src/main.rs");
    }

    #[test]
    fn path_exactly_at_width_is_unchanged() {
        assert_eq!(shorten_path("src/main.rs", 11), "src/main.rs");
    }

    #[test]
    fn long_path_keeps_the_tail() {
        let shortened = shorten_path("src/very/long/nested/path/main.rs", 12);
        assert_eq!(shortened.chars().count(), 12);
        assert!(shortened.starts_with('…'));
        assert!(shortened.ends_with("main.rs"));
    }

    #[test]
    fn zero_width_does_not_panic() {
        assert_eq!(shorten_path("src/main.rs", 0), "");
    }

    #[test]
    fn width_one_is_just_the_ellipsis() {
        assert_eq!(shorten_path("src/main.rs", 1), "…");
    }

    #[test]
    fn multibyte_paths_are_counted_in_chars() {
        let shortened = shorten_path("répertoire/éléphant.py", 10);
        assert_eq!(shortened.chars().count(), 10);
    }
}
