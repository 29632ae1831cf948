mod chat_view;
mod file_list;
mod overlay;
mod preview;
mod settings;
mod status_bar;
mod styles;
mod utils;

use crate::app::{App, OverlayData};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

/// Render the entire UI
pub fn draw(f: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // top bar
            Constraint::Min(1),    // main content
            Constraint::Length(1), // bottom bar
        ])
        .split(f.area());

    status_bar::render_top_bar(f, outer[0], app);

    // Main content: file list + chat, with the preview panel claiming a
    // third of the width while open
    if app.preview.is_some() && outer[1].width >= 100 {
        let main_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(36), // file list
                Constraint::Fill(2),    // chat (2/3 of remaining)
                Constraint::Fill(1),    // preview (1/3 of remaining)
            ])
            .split(outer[1]);

        file_list::render(f, main_area[0], app);
        chat_view::render(f, main_area[1], app);
        preview::render(f, main_area[2], app);
    } else if app.preview.is_some() {
        // Narrow terminal: preview replaces the chat column
        let main_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(36), Constraint::Min(1)])
            .split(outer[1]);

        file_list::render(f, main_area[0], app);
        preview::render(f, main_area[1], app);
    } else {
        let main_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(36), Constraint::Min(1)])
            .split(outer[1]);

        file_list::render(f, main_area[0], app);
        chat_view::render(f, main_area[1], app);
    }

    status_bar::render_bottom_bar(f, outer[2], app);

    // Popup overlay (directory browser, file picker, settings)
    if let Some(ref overlay_data) = app.overlay {
        match overlay_data {
            OverlayData::Settings { selected, .. } => {
                settings::render_settings(f, f.area(), app, *selected);
            }
            _ => {
                overlay::render_overlay(f, f.area(), overlay_data);
            }
        }
    }
}
