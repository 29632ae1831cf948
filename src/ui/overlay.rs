use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};
use std::path::PathBuf;

use super::styles;
use super::utils::centered_rect;
use crate::app::{DirEntry, OverlayData};

/// Render the active overlay on top of the main UI.
/// Note: Settings overlay is rendered separately in ui/mod.rs since it needs App access.
pub fn render_overlay(f: &mut Frame, area: Rect, overlay: &OverlayData) {
    match overlay {
        OverlayData::DirectoryBrowser {
            current_path,
            entries,
            selected,
        } => {
            render_browser(
                f,
                area,
                current_path,
                entries,
                *selected,
                &[],
                " (Enter=descend, o=scan here, Bksp=up, Esc=close) ",
            );
        }
        OverlayData::FilePicker {
            current_path,
            entries,
            selected,
            picked,
        } => {
            render_browser(
                f,
                area,
                current_path,
                entries,
                *selected,
                picked,
                " (Space=mark, Enter=add, Bksp=up, Esc=close) ",
            );
        }
        OverlayData::Settings { .. } => {
            // Handled in ui/mod.rs draw()
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn render_browser(
    f: &mut Frame,
    area: Rect,
    current_path: &str,
    entries: &[DirEntry],
    selected: usize,
    picked: &[PathBuf],
    help: &str,
) {
    let popup_height = (entries.len() as u16 + 2)
        .min(area.height.saturating_sub(6))
        .max(5);
    let popup_width = 70u16.min(area.width.saturating_sub(6));
    let popup = centered_rect(popup_width, popup_height, area);

    f.render_widget(Clear, popup);

    let title = format!(" {}{} ", shorten_left(current_path, 24), help);

    if entries.is_empty() {
        let block = overlay_block(&title);
        let empty = Paragraph::new(Line::from(Span::styled(
            "  (empty directory)",
            ratatui::style::Style::default().fg(styles::MUTED),
        )))
        .block(block);
        f.render_widget(empty, popup);
        return;
    }

    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let is_sel = idx == selected;
            let marker = if is_sel { "▶ " } else { "  " };

            let full = PathBuf::from(format!("{}/{}", current_path, entry.name));
            let is_picked = picked.contains(&full);

            let name_style = if entry.is_dir {
                ratatui::style::Style::default().fg(styles::BLUE)
            } else if is_picked {
                ratatui::style::Style::default().fg(styles::GREEN)
            } else {
                ratatui::style::Style::default().fg(styles::TEXT)
            };

            let mut spans = vec![
                Span::styled(marker, ratatui::style::Style::default().fg(styles::CYAN)),
                Span::styled(
                    if is_picked { "[x] " } else { "    " },
                    styles::included_style(),
                ),
                Span::styled(
                    entry.name.clone(),
                    if is_sel {
                        ratatui::style::Style::default().fg(styles::BRIGHT)
                    } else {
                        name_style
                    },
                ),
            ];
            if entry.is_dir {
                spans.push(Span::styled(
                    "/",
                    ratatui::style::Style::default().fg(styles::DIM),
                ));
            }

            let style = if is_sel {
                styles::selected_style()
            } else {
                ratatui::style::Style::default().bg(styles::PANEL)
            };

            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let list = List::new(items).block(overlay_block(&title));
    f.render_widget(list, popup);
}

fn overlay_block(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(
            title,
            ratatui::style::Style::default().fg(styles::CYAN),
        ))
        .borders(Borders::ALL)
        .border_style(ratatui::style::Style::default().fg(styles::CYAN))
        .style(ratatui::style::Style::default().bg(styles::PANEL))
}

/// Keep the tail of a long path for the overlay title (char-aware).
fn shorten_left(path: &str, max_width: usize) -> String {
    let count = path.chars().count();
    if count <= max_width {
        return path.to_string();
    }
    let suffix: String = path.chars().skip(count - max_width).collect();
    format!("…{}", suffix)
}
