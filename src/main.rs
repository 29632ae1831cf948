mod app;
mod chat;
mod config;
mod scan;
mod ui;

use anyhow::{Context, Result};
use app::{App, Focus, InputMode, OverlayData};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::time::Duration;

/// Terminal chat assistant for exploring a local codebase
#[derive(Parser)]
#[command(name = "ac", version, about)]
struct Cli {
    /// Source tree to scan on startup (omit to pick one with 'o')
    root: Option<String>,

    /// Descend into ignored directories and include every file by default
    #[arg(long)]
    include_all: bool,

    /// Assistant endpoint URL (overrides config)
    #[arg(long)]
    endpoint: Option<String>,

    /// Reply tone sent with each request (overrides config)
    #[arg(long)]
    tone: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // Config comes from the tree being opened (falling back to cwd)
    let config_root = cli.root.clone().unwrap_or_else(|| ".".to_string());
    let mut cfg = config::load_config(&config_root);
    if let Some(endpoint) = cli.endpoint {
        cfg.request.endpoint = endpoint;
    }
    if let Some(tone) = cli.tone {
        cfg.request.tone = tone;
    }

    let mut app = App::new(cfg, cli.include_all);

    if let Some(root) = cli.root {
        let canonical =
            std::fs::canonicalize(&root).with_context(|| format!("Path not found: {}", root))?;
        app.start_scan(canonical);
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let result = run_app(&mut terminal, &mut app);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    loop {
        // Draw
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for keys with a timeout so worker results keep flowing
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Route keys: overlay takes priority, then compose, then normal
                if app.overlay.is_some() {
                    handle_overlay_input(app, key);
                } else {
                    match app.input_mode {
                        InputMode::Compose => handle_compose_input(app, key),
                        InputMode::Normal => handle_normal_input(app, key),
                    }
                }
            }
        }

        // Drain worker results (scan completions, assistant replies).
        // Stale scan results are recognized and dropped inside.
        while let Ok(event) = app.worker_rx.try_recv() {
            app.handle_worker_event(event);
        }

        // Tick, used for auto-clearing notifications
        app.tick();

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_normal_input(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        KeyCode::Char('q') => {
            app.should_quit = true;
        }

        // Compose a message
        KeyCode::Char('i') => {
            app.input_mode = InputMode::Compose;
        }

        // Pane focus
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::Files => Focus::Chat,
                Focus::Chat => Focus::Files,
            };
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            Focus::Files => app.next_file(),
            Focus::Chat => app.scroll_down(1),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            Focus::Files => app.prev_file(),
            Focus::Chat => app.scroll_up(1),
        },

        // Inclusion toggles
        KeyCode::Char(' ') => app.toggle_selected_file(),
        KeyCode::Char('a') => app.include_all_files(),
        KeyCode::Char('A') => app.exclude_all_files(),

        // Include-all default for the next scan
        KeyCode::Char('I') => app.toggle_include_all(),

        // Preview
        KeyCode::Enter => match app.focus {
            Focus::Files => app.preview_selected_file(),
            Focus::Chat => app.open_focused_reference(),
        },
        KeyCode::Char('r') => app.refresh_preview(),
        KeyCode::Char('p') => {
            if app.preview.is_some() {
                app.close_preview();
            } else {
                app.preview_selected_file();
            }
        }

        // Reference cycling in the chat pane
        KeyCode::Char(']') => app.cycle_reference(true),
        KeyCode::Char('[') => app.cycle_reference(false),

        // Pickers
        KeyCode::Char('o') => app.open_directory_browser(),
        KeyCode::Char('F') => app.open_file_picker(),
        KeyCode::Char('c') => app.clear_selection(),

        // Scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(10);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(10);
        }
        KeyCode::PageDown => app.scroll_down(20),
        KeyCode::PageUp => app.scroll_up(20),

        // Settings
        KeyCode::Char(',') => app.open_settings(),

        // Close preview first, then drop reference focus
        KeyCode::Esc => {
            if app.preview.is_some() {
                app.close_preview();
            } else {
                app.ref_focus = None;
            }
        }

        _ => {}
    }
}

fn handle_compose_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.send_message(),
        KeyCode::Esc => {
            // Keep the draft; 'i' resumes it
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.compose_input.clear();
        }
        KeyCode::Char(c) => {
            app.compose_input.push(c);
        }
        KeyCode::Backspace => {
            app.compose_input.pop();
        }
        _ => {}
    }
}

fn handle_overlay_input(app: &mut App, key: KeyEvent) {
    // Settings overlay has additional keybindings
    if matches!(app.overlay, Some(OverlayData::Settings { .. })) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.overlay_next(),
            KeyCode::Char('k') | KeyCode::Up => app.overlay_prev(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                // Space and Enter both toggle the current item
                app.settings_toggle();
            }
            KeyCode::Char('s') => {
                app.settings_save();
            }
            KeyCode::Esc | KeyCode::Char('q') => app.overlay_close(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.overlay_next(),
        KeyCode::Char('k') | KeyCode::Up => app.overlay_prev(),
        KeyCode::Enter => app.overlay_select(),
        KeyCode::Char(' ') => app.overlay_toggle_pick(),
        KeyCode::Char('o') => app.overlay_open_current(),
        KeyCode::Backspace => app.overlay_go_up(),
        KeyCode::Esc | KeyCode::Char('q') => app.overlay_close(),
        _ => {}
    }
}
