use ratatui::style::{Color, Modifier, Style};

// ── Background colors ──
pub const BG: Color = Color::Rgb(12, 12, 12);
pub const SURFACE: Color = Color::Rgb(20, 20, 20);
pub const PANEL: Color = Color::Rgb(26, 26, 26);
pub const BORDER: Color = Color::Rgb(42, 42, 42);

// ── Text colors ──
pub const TEXT: Color = Color::Rgb(200, 200, 200);
pub const DIM: Color = Color::Rgb(102, 102, 102);
pub const MUTED: Color = Color::Rgb(136, 136, 136);
pub const BRIGHT: Color = Color::Rgb(232, 232, 232);

// ── Accent colors ──
pub const BLUE: Color = Color::Rgb(96, 165, 250);
pub const CYAN: Color = Color::Rgb(34, 211, 238);
pub const GREEN: Color = Color::Rgb(74, 222, 128);
pub const YELLOW: Color = Color::Rgb(250, 204, 21);
pub const RED: Color = Color::Rgb(248, 113, 113);
pub const PURPLE: Color = Color::Rgb(167, 139, 250);

// ── Composed styles ──

pub fn default_style() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface_style() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn selected_style() -> Style {
    Style::default().fg(BLUE).bg(Color::Rgb(26, 42, 58))
}

pub fn key_hint_style() -> Style {
    Style::default().fg(MUTED).add_modifier(Modifier::BOLD)
}

/// Prefix/label style for user-authored messages
pub fn user_style() -> Style {
    Style::default().fg(GREEN).add_modifier(Modifier::BOLD)
}

/// Prefix/label style for assistant messages
pub fn assistant_style() -> Style {
    Style::default().fg(PURPLE).add_modifier(Modifier::BOLD)
}

/// Clickable file reference inside assistant text
pub fn reference_style() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::UNDERLINED)
}

/// Focused file reference (keyboard cursor)
pub fn reference_focus_style() -> Style {
    Style::default()
        .fg(BG)
        .bg(CYAN)
        .add_modifier(Modifier::BOLD)
}

/// Assistant entries that carry a request failure
pub fn error_style() -> Style {
    Style::default().fg(RED)
}

/// Included-file checkbox marker
pub fn included_style() -> Style {
    Style::default().fg(GREEN).add_modifier(Modifier::BOLD)
}

/// TRUNCATED badge in list and preview footer
pub fn truncated_style() -> Style {
    Style::default()
        .fg(BG)
        .bg(YELLOW)
        .add_modifier(Modifier::BOLD)
}
