use super::session::Session;
use crate::chat::api::{ApiClient, QueryError, RequestOptions};
use crate::chat::{annotate, Role};
use crate::config::{self, AcConfig};
use crate::scan::{self, Classifier, FileEntry, LoadLimits, ScanOptions};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;

// ── Enums ──

/// Which pane keyboard navigation applies to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Files,
    Chat,
}

/// Whether we're navigating or typing a message
#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Compose,
}

// ── Overlay types ──

/// A directory entry for the filesystem browser overlays
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Active overlay popup state
#[derive(Debug, Clone)]
pub enum OverlayData {
    /// Pick a directory to scan as the new source tree
    DirectoryBrowser {
        current_path: String,
        entries: Vec<DirEntry>,
        selected: usize,
    },
    /// Pick individual files to append to the selection
    FilePicker {
        current_path: String,
        entries: Vec<DirEntry>,
        selected: usize,
        picked: Vec<PathBuf>,
    },
    Settings {
        selected: usize,
        /// Snapshot of config at overlay open time, for Cancel revert
        saved_config: AcConfig,
    },
}

// ── Worker events ──

/// Results delivered from worker threads to the event loop
pub enum WorkerEvent {
    ScanDone {
        /// Monotonic scan number; only the most recent scan may apply
        seq: u64,
        /// Selection generation captured when the scan was spawned
        generation: u64,
        root: PathBuf,
        entries: Vec<FileEntry>,
    },
    Reply {
        outcome: Result<String, QueryError>,
        elapsed_ms: u64,
    },
}

// ── Preview ──

/// Content shown in the preview pane for one file
#[derive(Debug, Clone)]
pub struct PreviewState {
    pub path: String,
    pub content: Option<String>,
    pub truncated: bool,
    pub is_binary: bool,
    pub error: Option<String>,
    pub size: Option<u64>,
    pub scroll: u16,
}

// ── App ──

pub struct App {
    /// Selection + conversation; the only mutable session state
    pub session: Session,

    /// Application configuration (loaded from .ac-config.toml)
    pub config: AcConfig,

    /// Root of the currently scanned tree (None until a directory is picked)
    pub root: Option<PathBuf>,

    /// Descend into ignored dirs and default new entries to included
    pub include_all: bool,

    pub input_mode: InputMode,
    pub focus: Focus,
    pub should_quit: bool,

    /// Active overlay popup (None = no overlay)
    pub overlay: Option<OverlayData>,

    /// Cursor in the file list
    pub selected_file: usize,

    /// Vertical scroll offset of the chat pane
    pub chat_scroll: u16,

    /// Focused reference index (flat across assistant messages)
    pub ref_focus: Option<usize>,

    /// Open preview pane content (None = closed)
    pub preview: Option<PreviewState>,

    /// Text buffer for the message being typed
    pub compose_input: String,

    /// Last notification message + ticks since shown (for auto-clearing)
    pub notice: Option<String>,
    pub notice_ticks: u8,

    /// Number of scans still running on worker threads
    pub pending_scans: usize,

    /// Monotonic scan counter; a result from any but the latest scan is stale
    scan_seq: u64,

    worker_tx: mpsc::Sender<WorkerEvent>,
    pub worker_rx: mpsc::Receiver<WorkerEvent>,
}

impl App {
    pub fn new(config: AcConfig, include_all: bool) -> Self {
        let (worker_tx, worker_rx) = mpsc::channel();
        App {
            session: Session::new(),
            config,
            root: None,
            include_all,
            input_mode: InputMode::Normal,
            focus: Focus::Files,
            should_quit: false,
            overlay: None,
            selected_file: 0,
            chat_scroll: 0,
            ref_focus: None,
            preview: None,
            compose_input: String::new(),
            notice: None,
            notice_ticks: 0,
            pending_scans: 0,
            scan_seq: 0,
            worker_tx,
            worker_rx,
        }
    }

    fn limits(&self) -> LoadLimits {
        LoadLimits::from(&self.config.limits)
    }

    // ── Scanning ──

    /// Kick off a traversal of `root` on a worker thread. The result is
    /// tagged with the current selection generation; by the time it
    /// arrives the store may have been replaced or cleared, in which case
    /// it is dropped (stale-write guard).
    pub fn start_scan(&mut self, root: PathBuf) {
        if !root.is_dir() {
            self.notify(&format!("Not a directory: {}", root.display()));
            return;
        }
        self.scan_seq += 1;
        let seq = self.scan_seq;
        let generation = self.session.selection.generation();
        let classifier = Classifier::from_config(&self.config.scan);
        let opts = ScanOptions {
            base_path: String::new(),
            include_all: self.include_all,
        };
        let tx = self.worker_tx.clone();
        self.pending_scans += 1;
        self.notify(&format!("Scanning {} ...", root.display()));
        std::thread::spawn(move || {
            let entries = scan::traverse(&root, &classifier, &opts);
            let _ = tx.send(WorkerEvent::ScanDone {
                seq,
                generation,
                root,
                entries,
            });
        });
    }

    /// Apply a worker result to current state.
    pub fn handle_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::ScanDone {
                seq,
                generation,
                root,
                entries,
            } => {
                self.pending_scans = self.pending_scans.saturating_sub(1);
                // Stale if the store moved on while the walk ran, or if a
                // newer scan has been started since
                if seq != self.scan_seq || generation != self.session.selection.generation() {
                    log::info!("Dropping stale scan result for {}", root.display());
                    return;
                }
                let count = entries.len();
                self.session.selection.replace_all(entries);
                self.root = Some(root);
                self.selected_file = 0;
                self.preview = None;
                self.ref_focus = None;
                self.notify(&format!(
                    "Found {} file{}",
                    count,
                    if count == 1 { "" } else { "s" }
                ));
            }
            WorkerEvent::Reply {
                outcome,
                elapsed_ms,
            } => {
                self.session.request_in_flight = false;
                self.session.last_response_ms = Some(elapsed_ms);
                self.session.push_outcome(outcome);
            }
        }
    }

    // ── Selection commands ──

    pub fn next_file(&mut self) {
        let len = self.session.selection.len();
        if len > 0 && self.selected_file + 1 < len {
            self.selected_file += 1;
        }
    }

    pub fn prev_file(&mut self) {
        if self.selected_file > 0 {
            self.selected_file -= 1;
        }
    }

    pub fn toggle_selected_file(&mut self) {
        self.session.selection.toggle_included(self.selected_file);
    }

    pub fn include_all_files(&mut self) {
        self.session.selection.set_all_included(true);
        self.notify("All files included");
    }

    pub fn exclude_all_files(&mut self) {
        self.session.selection.set_all_included(false);
        self.notify("All files excluded");
    }

    pub fn clear_selection(&mut self) {
        self.session.selection.clear();
        self.selected_file = 0;
        self.preview = None;
        self.ref_focus = None;
        self.notify("Selection cleared");
    }

    /// Flip the include-all default; takes effect on the next scan.
    pub fn toggle_include_all(&mut self) {
        self.include_all = !self.include_all;
        self.notify(if self.include_all {
            "Include-all: on (next scan)"
        } else {
            "Include-all: off (next scan)"
        });
    }

    /// Append manually picked files. The allow-list still applies; a pick
    /// uses the file name alone as its path, matching single-file picks
    /// being additions rather than tree opens.
    pub fn append_files(&mut self, paths: Vec<PathBuf>) {
        let classifier = Classifier::from_config(&self.config.scan);
        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for abs_path in paths {
            let name = match abs_path.file_name() {
                Some(n) => n.to_string_lossy().to_string(),
                None => continue,
            };
            if classifier.skip(&name, false, false) {
                skipped += 1;
                continue;
            }
            let size = match std::fs::metadata(&abs_path) {
                Ok(m) => Some(m.len()),
                Err(e) => {
                    log::warn!("Cannot stat picked file {}: {}", abs_path.display(), e);
                    skipped += 1;
                    continue;
                }
            };
            entries.push(FileEntry {
                path: name.clone(),
                mime_hint: scan::mime_hint_for(&name),
                name,
                abs_path,
                size,
                included: true,
                cached_content: None,
                truncated: false,
            });
        }
        let added = self.session.selection.append_picked(entries);
        if skipped > 0 {
            self.notify(&format!("Added {} file(s), skipped {}", added, skipped));
        } else {
            self.notify(&format!("Added {} file(s)", added));
        }
    }

    // ── Preview ──

    pub fn open_preview(&mut self, path: &str, force_refresh: bool) {
        let limits = self.limits();
        match self.session.load_for_preview(path, &limits, force_refresh) {
            Some(res) => {
                self.preview = Some(PreviewState {
                    path: path.to_string(),
                    content: res.content,
                    truncated: res.truncated,
                    is_binary: res.is_binary,
                    error: res.error,
                    size: res.size,
                    scroll: 0,
                });
            }
            None => {
                self.notify(&format!("File not found in selection: {}", path));
            }
        }
    }

    pub fn preview_selected_file(&mut self) {
        if let Some(entry) = self.session.selection.get(self.selected_file) {
            let path = entry.path.clone();
            self.open_preview(&path, false);
        }
    }

    pub fn refresh_preview(&mut self) {
        if let Some(preview) = &self.preview {
            let path = preview.path.clone();
            self.open_preview(&path, true);
        }
    }

    pub fn close_preview(&mut self) {
        self.preview = None;
    }

    // ── Chat ──

    /// Send the composed query. The user half is appended synchronously,
    /// the payload is assembled from the current selection, and the HTTP
    /// exchange runs on a worker thread. Sends are serialized: a second
    /// send while one is outstanding is rejected, so replies can never
    /// interleave out of query order.
    pub fn send_message(&mut self) {
        let query = self.compose_input.trim().to_string();
        if query.is_empty() {
            return;
        }
        if self.session.request_in_flight {
            self.notify("A request is already in flight");
            return;
        }
        self.compose_input.clear();
        self.input_mode = InputMode::Normal;

        let started = Instant::now();
        self.session.push_user(&query);
        let options = RequestOptions {
            allow_pseudocode: self.config.request.allow_pseudocode,
            tone: self.config.request.tone.clone(),
        };
        let limits = self.limits();
        let payload = self.session.build_payload(&query, options, &limits, false);

        let client = ApiClient::new(
            self.config.request.endpoint.clone(),
            self.config.request.timeout_secs,
        );
        let tx = self.worker_tx.clone();
        self.session.request_in_flight = true;
        std::thread::spawn(move || {
            let outcome = client.send_query(&payload);
            let _ = tx.send(WorkerEvent::Reply {
                outcome,
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        });
    }

    // ── References ──

    /// All reference paths across assistant messages, in display order.
    pub fn reference_paths(&self) -> Vec<String> {
        let known = self.session.selection.known_paths();
        self.session
            .conversation()
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .flat_map(|m| annotate::annotate(&m.text, &known))
            .map(|m| m.path)
            .collect()
    }

    /// Cycle keyboard focus through references in the chat pane.
    pub fn cycle_reference(&mut self, forward: bool) {
        let count = self.reference_paths().len();
        if count == 0 {
            self.ref_focus = None;
            return;
        }
        self.ref_focus = Some(match self.ref_focus {
            None => {
                if forward {
                    0
                } else {
                    count - 1
                }
            }
            Some(current) => {
                if forward {
                    (current + 1) % count
                } else {
                    (current + count - 1) % count
                }
            }
        });
    }

    /// Open the preview for the focused reference, if its path is known.
    pub fn open_focused_reference(&mut self) {
        let paths = self.reference_paths();
        let Some(idx) = self.ref_focus else { return };
        let Some(path) = paths.get(idx) else { return };
        if self.session.selection.by_path(path).is_some() {
            let path = path.clone();
            self.open_preview(&path, false);
        } else {
            self.notify(&format!("File not found in selection: {}", path));
        }
    }

    // ── Scrolling ──

    // chat_scroll counts lines scrolled up from the bottom of the log, so
    // the view stays pinned to the newest message at zero

    pub fn scroll_down(&mut self, amount: u16) {
        match self.focus {
            Focus::Chat => self.chat_scroll = self.chat_scroll.saturating_sub(amount),
            Focus::Files => {
                if let Some(p) = &mut self.preview {
                    p.scroll = p.scroll.saturating_add(amount);
                }
            }
        }
    }

    pub fn scroll_up(&mut self, amount: u16) {
        match self.focus {
            Focus::Chat => self.chat_scroll = self.chat_scroll.saturating_add(amount),
            Focus::Files => {
                if let Some(p) = &mut self.preview {
                    p.scroll = p.scroll.saturating_sub(amount);
                }
            }
        }
    }

    // ── Overlay: directory browser & file picker ──

    fn browse_start_path(&self) -> String {
        self.root
            .as_ref()
            .map(|r| r.to_string_lossy().to_string())
            .or_else(|| {
                std::env::current_dir()
                    .ok()
                    .map(|d| d.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| "/".to_string())
    }

    /// Open the directory browser overlay (pick a new tree to scan)
    pub fn open_directory_browser(&mut self) {
        let start_path = self.browse_start_path();
        let entries = read_directory(&start_path, true);
        self.overlay = Some(OverlayData::DirectoryBrowser {
            current_path: start_path,
            entries,
            selected: 0,
        });
    }

    /// Open the file picker overlay (append individual files)
    pub fn open_file_picker(&mut self) {
        let start_path = self.browse_start_path();
        let entries = read_directory(&start_path, false);
        self.overlay = Some(OverlayData::FilePicker {
            current_path: start_path,
            entries,
            selected: 0,
            picked: Vec::new(),
        });
    }

    // ── Overlay: settings ──

    /// Open the settings overlay
    pub fn open_settings(&mut self) {
        let items = config::settings_items();
        let first_selectable = items
            .iter()
            .position(|item| !matches!(item, config::SettingsItem::SectionHeader(_)))
            .unwrap_or(0);
        self.overlay = Some(OverlayData::Settings {
            selected: first_selectable,
            saved_config: self.config.clone(),
        });
    }

    /// Toggle / cycle the currently selected setting
    pub fn settings_toggle(&mut self) {
        let items = config::settings_items();
        if let Some(OverlayData::Settings { selected, .. }) = &self.overlay {
            match items.get(*selected) {
                Some(config::SettingsItem::BoolToggle { get, set, .. }) => {
                    let current = get(&self.config);
                    set(&mut self.config, !current);
                }
                Some(config::SettingsItem::Cycle {
                    options, get, set, ..
                }) => {
                    let current = get(&self.config);
                    let idx = options.iter().position(|o| *o == current).unwrap_or(0);
                    let next = options[(idx + 1) % options.len()];
                    set(&mut self.config, next.to_string());
                }
                _ => {}
            }
        }
    }

    /// Save settings to disk and close the overlay
    pub fn settings_save(&mut self) {
        if let Err(e) = config::save_config(&self.config) {
            self.notify(&format!("Failed to save: {}", e));
        } else {
            self.notify("Settings saved");
        }
        self.overlay = None;
    }

    /// Revert settings to the saved snapshot and close the overlay
    pub fn settings_cancel(&mut self) {
        if let Some(OverlayData::Settings { saved_config, .. }) = self.overlay.take() {
            self.config = saved_config;
        }
    }

    // ── Overlay: navigation ──

    pub fn overlay_next(&mut self) {
        match &mut self.overlay {
            Some(OverlayData::DirectoryBrowser {
                entries, selected, ..
            })
            | Some(OverlayData::FilePicker {
                entries, selected, ..
            }) => {
                if *selected + 1 < entries.len() {
                    *selected += 1;
                }
            }
            Some(OverlayData::Settings { selected, .. }) => {
                let items = config::settings_items();
                let mut next = *selected + 1;
                while next < items.len() {
                    if !matches!(items[next], config::SettingsItem::SectionHeader(_)) {
                        break;
                    }
                    next += 1;
                }
                if next < items.len() {
                    *selected = next;
                }
            }
            None => {}
        }
    }

    pub fn overlay_prev(&mut self) {
        match &mut self.overlay {
            Some(OverlayData::DirectoryBrowser { selected, .. })
            | Some(OverlayData::FilePicker { selected, .. }) => {
                if *selected > 0 {
                    *selected -= 1;
                }
            }
            Some(OverlayData::Settings { selected, .. }) => {
                let items = config::settings_items();
                if *selected > 0 {
                    let mut prev = *selected - 1;
                    while prev > 0 && matches!(items[prev], config::SettingsItem::SectionHeader(_))
                    {
                        prev -= 1;
                    }
                    if !matches!(items[prev], config::SettingsItem::SectionHeader(_)) {
                        *selected = prev;
                    }
                }
            }
            None => {}
        }
    }

    /// Handle Enter in an overlay
    pub fn overlay_select(&mut self) {
        // Settings overlay: Enter toggles the selected item, or saves on
        // non-toggleable items
        if let Some(OverlayData::Settings { selected, .. }) = &self.overlay {
            let items = config::settings_items();
            match items.get(*selected) {
                Some(config::SettingsItem::BoolToggle { .. })
                | Some(config::SettingsItem::Cycle { .. }) => self.settings_toggle(),
                _ => self.settings_save(),
            }
            return;
        }

        let overlay = match self.overlay.take() {
            Some(o) => o,
            None => return,
        };

        match overlay {
            OverlayData::DirectoryBrowser {
                current_path,
                entries,
                selected,
            } => {
                match entries.get(selected) {
                    Some(entry) if entry.is_dir => {
                        // Descend
                        let full_path = format!("{}/{}", current_path, entry.name);
                        let new_entries = read_directory(&full_path, true);
                        self.overlay = Some(OverlayData::DirectoryBrowser {
                            current_path: full_path,
                            entries: new_entries,
                            selected: 0,
                        });
                    }
                    _ => {
                        self.overlay = Some(OverlayData::DirectoryBrowser {
                            current_path,
                            entries,
                            selected,
                        });
                    }
                }
            }
            OverlayData::FilePicker {
                current_path,
                entries,
                selected,
                mut picked,
            } => {
                match entries.get(selected) {
                    Some(entry) if entry.is_dir => {
                        let full_path = format!("{}/{}", current_path, entry.name);
                        let new_entries = read_directory(&full_path, false);
                        self.overlay = Some(OverlayData::FilePicker {
                            current_path: full_path,
                            entries: new_entries,
                            selected: 0,
                            picked,
                        });
                    }
                    Some(entry) => {
                        // Enter on a file confirms: that file plus any marked ones
                        let full = PathBuf::from(format!("{}/{}", current_path, entry.name));
                        if !picked.contains(&full) {
                            picked.push(full);
                        }
                        self.append_files(picked);
                    }
                    None => {
                        if picked.is_empty() {
                            self.overlay = Some(OverlayData::FilePicker {
                                current_path,
                                entries,
                                selected,
                                picked,
                            });
                        } else {
                            self.append_files(picked);
                        }
                    }
                }
            }
            OverlayData::Settings { .. } => {
                // Already handled above
            }
        }
    }

    /// Scan the directory currently shown in the browser overlay
    pub fn overlay_open_current(&mut self) {
        if !matches!(self.overlay, Some(OverlayData::DirectoryBrowser { .. })) {
            return;
        }
        if let Some(OverlayData::DirectoryBrowser { current_path, .. }) = self.overlay.take() {
            self.start_scan(PathBuf::from(current_path));
        }
    }

    /// Toggle the pick mark on the selected file-picker entry
    pub fn overlay_toggle_pick(&mut self) {
        if let Some(OverlayData::FilePicker {
            current_path,
            entries,
            selected,
            picked,
        }) = &mut self.overlay
        {
            if let Some(entry) = entries.get(*selected) {
                if !entry.is_dir {
                    let full = PathBuf::from(format!("{}/{}", current_path, entry.name));
                    if let Some(pos) = picked.iter().position(|p| *p == full) {
                        picked.remove(pos);
                    } else {
                        picked.push(full);
                    }
                }
            }
        }
    }

    /// Go up one directory in a browser overlay
    pub fn overlay_go_up(&mut self) {
        let (current_path, dirs_only) = match &self.overlay {
            Some(OverlayData::DirectoryBrowser { current_path, .. }) => {
                (current_path.clone(), true)
            }
            Some(OverlayData::FilePicker { current_path, .. }) => (current_path.clone(), false),
            _ => return,
        };
        if let Some(parent) = Path::new(&current_path).parent() {
            let parent_str = parent.to_string_lossy().to_string();
            if parent_str.is_empty() {
                return;
            }
            let entries = read_directory(&parent_str, dirs_only);
            match &mut self.overlay {
                Some(OverlayData::DirectoryBrowser {
                    current_path,
                    entries: e,
                    selected,
                }) => {
                    *current_path = parent_str;
                    *e = entries;
                    *selected = 0;
                }
                Some(OverlayData::FilePicker {
                    current_path,
                    entries: e,
                    selected,
                    ..
                }) => {
                    *current_path = parent_str;
                    *e = entries;
                    *selected = 0;
                }
                _ => {}
            }
        }
    }

    /// Close the overlay (reverts settings changes if in Settings overlay)
    pub fn overlay_close(&mut self) {
        if matches!(self.overlay, Some(OverlayData::Settings { .. })) {
            self.settings_cancel();
        } else {
            self.overlay = None;
        }
    }

    // ── Notifications ──

    pub fn notify(&mut self, msg: &str) {
        self.notice = Some(msg.to_string());
        self.notice_ticks = 0;
    }

    /// Tick called on every event loop iteration, used for notification auto-clear
    pub fn tick(&mut self) {
        if self.notice.is_some() {
            self.notice_ticks += 1;
            if self.notice_ticks > 30 {
                self.notice = None;
                self.notice_ticks = 0;
            }
        }
    }
}

// ── Helpers ──

/// Read directory entries, sorted: directories first, then files by name.
/// Hidden entries are skipped. With `dirs_only`, files are omitted.
fn read_directory(path: &str, dirs_only: bool) -> Vec<DirEntry> {
    let mut entries = Vec::new();
    if let Ok(read_dir) = std::fs::read_dir(path) {
        for entry in read_dir.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                let is_dir = metadata.is_dir();
                if dirs_only && !is_dir {
                    continue;
                }
                entries.push(DirEntry { name, is_dir });
            }
        }
    }
    entries.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn app() -> App {
        App::new(AcConfig::default(), false)
    }

    fn scanned_entry(dir: &Path, path: &str, content: &str, included: bool) -> FileEntry {
        let abs = dir.join(path);
        if let Some(parent) = abs.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&abs, content).unwrap();
        let name = path.rsplit('/').next().unwrap().to_string();
        FileEntry {
            path: path.to_string(),
            mime_hint: None,
            name,
            abs_path: abs,
            size: Some(content.len() as u64),
            included,
            cached_content: None,
            truncated: false,
        }
    }

    #[test]
    fn matching_scan_result_replaces_the_store() {
        let dir = TempDir::new().unwrap();
        let mut app = app();
        let generation = app.session.selection.generation();
        app.handle_worker_event(WorkerEvent::ScanDone {
            seq: 0,
            generation,
            root: dir.path().to_path_buf(),
            entries: vec![scanned_entry(dir.path(), "a.py", "a", false)],
        });
        assert_eq!(app.session.selection.len(), 1);
        assert_eq!(app.root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn stale_scan_result_is_dropped() {
        let dir = TempDir::new().unwrap();
        let mut app = app();
        let old_generation = app.session.selection.generation();
        // The user cleared (or re-picked) while the walk ran
        app.session.selection.clear();
        app.handle_worker_event(WorkerEvent::ScanDone {
            seq: 0,
            generation: old_generation,
            root: dir.path().to_path_buf(),
            entries: vec![scanned_entry(dir.path(), "a.py", "a", false)],
        });
        assert!(app.session.selection.is_empty());
        assert!(app.root.is_none());
    }

    #[test]
    fn superseded_scan_result_is_dropped() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let mut app = app();
        // Two quick picks: both walks run against the same store generation
        app.start_scan(dir.path().to_path_buf());
        app.start_scan(other.path().to_path_buf());
        let generation = app.session.selection.generation();
        // The first walk finishing after the second was started must lose
        app.handle_worker_event(WorkerEvent::ScanDone {
            seq: 1,
            generation,
            root: dir.path().to_path_buf(),
            entries: vec![scanned_entry(dir.path(), "a.py", "a", false)],
        });
        assert!(app.session.selection.is_empty());
        assert!(app.root.is_none());
    }

    #[test]
    fn reply_event_appends_and_clears_the_in_flight_flag() {
        let mut app = app();
        app.session.request_in_flight = true;
        app.handle_worker_event(WorkerEvent::Reply {
            outcome: Ok("answer".into()),
            elapsed_ms: 321,
        });
        assert!(!app.session.request_in_flight);
        assert_eq!(app.session.last_response_ms, Some(321));
        assert_eq!(app.session.conversation().last().unwrap().text, "answer");
    }

    #[test]
    fn error_reply_lands_in_the_conversation_log() {
        let mut app = app();
        app.handle_worker_event(WorkerEvent::Reply {
            outcome: Err(QueryError::Server("rate limited".into())),
            elapsed_ms: 10,
        });
        let last = app.session.conversation().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.text, "Server error: rate limited");
    }

    #[test]
    fn second_send_while_in_flight_is_rejected_before_logging() {
        let mut app = app();
        app.session.request_in_flight = true;
        app.compose_input = "another question".into();
        app.send_message();
        assert!(app.session.conversation().is_empty());
        assert_eq!(app.compose_input, "another question");
        assert!(app.notice.as_deref().unwrap_or("").contains("in flight"));
    }

    #[test]
    fn empty_compose_input_is_not_sent() {
        let mut app = app();
        app.compose_input = "   ".into();
        app.send_message();
        assert!(app.session.conversation().is_empty());
        assert!(!app.session.request_in_flight);
    }

    #[test]
    fn scan_of_a_missing_root_is_reported_not_fatal() {
        let mut app = app();
        app.start_scan(PathBuf::from("/definitely/not/here"));
        assert_eq!(app.pending_scans, 0);
        assert!(app.notice.as_deref().unwrap_or("").contains("Not a directory"));
    }

    #[test]
    fn append_files_applies_the_allow_list() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "a").unwrap();
        fs::write(dir.path().join("image.png"), "p").unwrap();
        let mut app = app();
        app.append_files(vec![dir.path().join("a.py"), dir.path().join("image.png")]);
        assert_eq!(app.session.selection.len(), 1);
        assert_eq!(app.session.selection.entries()[0].path, "a.py");
        assert!(app.session.selection.entries()[0].included);
    }

    #[test]
    fn clear_selection_resets_cursor_and_preview() {
        let dir = TempDir::new().unwrap();
        let mut app = app();
        app.session
            .selection
            .replace_all(vec![scanned_entry(dir.path(), "a.py", "hello", true)]);
        app.preview_selected_file();
        assert!(app.preview.is_some());
        app.clear_selection();
        assert!(app.preview.is_none());
        assert!(app.session.selection.is_empty());
    }

    #[test]
    fn preview_of_selected_file_fills_content() {
        let dir = TempDir::new().unwrap();
        let mut app = app();
        app.session
            .selection
            .replace_all(vec![scanned_entry(dir.path(), "a.py", "hello", false)]);
        app.preview_selected_file();
        let preview = app.preview.as_ref().unwrap();
        assert_eq!(preview.path, "a.py");
        assert_eq!(preview.content.as_deref(), Some("hello"));
        assert!(!preview.is_binary);
    }

    #[test]
    fn reference_cycling_wraps_in_both_directions() {
        let dir = TempDir::new().unwrap();
        let mut app = app();
        app.session.selection.replace_all(vec![
            scanned_entry(dir.path(), "a.py", "x", true),
            scanned_entry(dir.path(), "b.py", "y", true),
        ]);
        app.session
            .push_assistant("Look at a.py and then b.py".into());
        assert_eq!(app.reference_paths(), vec!["a.py", "b.py"]);

        app.cycle_reference(true);
        assert_eq!(app.ref_focus, Some(0));
        app.cycle_reference(true);
        assert_eq!(app.ref_focus, Some(1));
        app.cycle_reference(true);
        assert_eq!(app.ref_focus, Some(0));
        app.cycle_reference(false);
        assert_eq!(app.ref_focus, Some(1));
    }

    #[test]
    fn focused_reference_opens_its_preview() {
        let dir = TempDir::new().unwrap();
        let mut app = app();
        app.session
            .selection
            .replace_all(vec![scanned_entry(dir.path(), "a.py", "content", true)]);
        app.session.push_assistant("see a.py".into());
        app.cycle_reference(true);
        app.open_focused_reference();
        assert_eq!(app.preview.as_ref().unwrap().path, "a.py");
    }

    #[test]
    fn notifications_age_out_after_enough_ticks() {
        let mut app = app();
        app.notify("hello");
        for _ in 0..=30 {
            app.tick();
        }
        assert!(app.notice.is_none());
    }

    #[test]
    fn settings_toggle_flips_and_cancel_reverts() {
        let mut app = app();
        let before = app.config.request.allow_pseudocode;
        app.open_settings();
        app.settings_toggle();
        assert_eq!(app.config.request.allow_pseudocode, !before);
        app.overlay_close();
        assert_eq!(app.config.request.allow_pseudocode, before);
    }

    #[test]
    fn settings_cycle_advances_the_tone() {
        let mut app = app();
        app.open_settings();
        // Move to the Tone item (first item is the pseudocode toggle)
        app.overlay_next();
        app.settings_toggle();
        assert_eq!(app.config.request.tone, "detailed");
    }
}
