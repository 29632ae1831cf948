use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem},
    Frame,
};

use super::styles;
use super::utils::centered_rect;
use crate::app::App;
use crate::config::{self, SettingsItem};

/// Render the settings overlay
pub fn render_settings(f: &mut Frame, area: Rect, app: &App, selected: usize) {
    let items = config::settings_items();

    let content_height = items.len() as u16 + 4; // items + help line + padding
    let popup_height = content_height.min(area.height.saturating_sub(6)).max(10);
    let popup_width = 54u16.min(area.width.saturating_sub(6));
    let popup = centered_rect(popup_width, popup_height, area);

    f.render_widget(Clear, popup);

    let mut list_items: Vec<ListItem> = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        let is_sel = idx == selected;
        let marker = if is_sel { "▸ " } else { "  " };
        let row_style = if is_sel {
            styles::selected_style()
        } else {
            ratatui::style::Style::default().bg(styles::PANEL)
        };
        let label_style = if is_sel {
            ratatui::style::Style::default().fg(styles::BRIGHT)
        } else {
            ratatui::style::Style::default().fg(styles::TEXT)
        };

        match item {
            SettingsItem::SectionHeader(title) => {
                let line = Line::from(vec![Span::styled(
                    format!("  {}", title),
                    ratatui::style::Style::default()
                        .fg(styles::CYAN)
                        .add_modifier(ratatui::style::Modifier::BOLD),
                )]);
                list_items.push(
                    ListItem::new(line).style(ratatui::style::Style::default().bg(styles::PANEL)),
                );
            }
            SettingsItem::BoolToggle { label, get, .. } => {
                let value = get(&app.config);
                let checkbox = if value { "[x]" } else { "[ ]" };
                let line = Line::from(vec![
                    Span::styled(marker, ratatui::style::Style::default().fg(styles::CYAN)),
                    Span::styled(
                        format!("{} ", checkbox),
                        ratatui::style::Style::default().fg(if value {
                            styles::GREEN
                        } else {
                            styles::DIM
                        }),
                    ),
                    Span::styled(label.as_str(), label_style),
                ]);
                list_items.push(ListItem::new(line).style(row_style));
            }
            SettingsItem::Cycle { label, get, .. } => {
                let value = get(&app.config);
                let line = Line::from(vec![
                    Span::styled(marker, ratatui::style::Style::default().fg(styles::CYAN)),
                    Span::styled(label.as_str(), label_style),
                    Span::styled(
                        format!(": ‹{}›", value),
                        ratatui::style::Style::default().fg(styles::YELLOW),
                    ),
                ]);
                list_items.push(ListItem::new(line).style(row_style));
            }
            SettingsItem::StringDisplay { label, get } => {
                let value = get(&app.config);
                let line = Line::from(vec![
                    Span::styled(marker, ratatui::style::Style::default().fg(styles::CYAN)),
                    Span::styled(
                        label.as_str(),
                        ratatui::style::Style::default().fg(styles::DIM),
                    ),
                    Span::styled(
                        format!(": {}", value),
                        ratatui::style::Style::default().fg(styles::TEXT),
                    ),
                ]);
                list_items.push(ListItem::new(line).style(row_style));
            }
        }
    }

    // Help line at the bottom
    let help_line = Line::from(vec![
        Span::styled(" j/k", styles::key_hint_style()),
        Span::styled(" nav  ", ratatui::style::Style::default().fg(styles::DIM)),
        Span::styled("Space/Enter", styles::key_hint_style()),
        Span::styled(" toggle  ", ratatui::style::Style::default().fg(styles::DIM)),
        Span::styled("s", styles::key_hint_style()),
        Span::styled(" save  ", ratatui::style::Style::default().fg(styles::DIM)),
        Span::styled("Esc", styles::key_hint_style()),
        Span::styled(" cancel", ratatui::style::Style::default().fg(styles::DIM)),
    ]);
    list_items.push(
        ListItem::new(Line::from("")).style(ratatui::style::Style::default().bg(styles::PANEL)),
    );
    list_items
        .push(ListItem::new(help_line).style(ratatui::style::Style::default().bg(styles::PANEL)));

    let block = Block::default()
        .title(Span::styled(
            " Settings ",
            ratatui::style::Style::default()
                .fg(styles::CYAN)
                .add_modifier(ratatui::style::Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(ratatui::style::Style::default().fg(styles::CYAN))
        .style(ratatui::style::Style::default().bg(styles::PANEL));

    let list = List::new(list_items).block(block);
    f.render_widget(list, popup);
}
