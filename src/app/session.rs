use crate::chat::api::{PayloadFile, QueryError, QueryPayload, RequestOptions};
use crate::chat::{ChatMessage, Role};
use crate::scan::{load_content, FileEntry, LoadLimits, ReadResult};

// ── Selection store ──

/// Ordered collection of selectable files.
///
/// A directory pick replaces the sequence wholesale (no merge-by-path);
/// manual file picks append. The generation counter advances on every
/// wholesale mutation so results of a scan that started against an older
/// store can be recognized as stale and dropped.
#[derive(Debug, Default)]
pub struct Selection {
    entries: Vec<FileEntry>,
    generation: u64,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, index: usize) -> Option<&FileEntry> {
        self.entries.get(index)
    }

    pub fn by_path(&self, path: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    fn by_path_mut(&mut self, path: &str) -> Option<&mut FileEntry> {
        self.entries.iter_mut().find(|e| e.path == path)
    }

    /// Discard the previous sequence wholesale (a new directory pick).
    pub fn replace_all(&mut self, entries: Vec<FileEntry>) {
        self.entries = entries;
        self.generation += 1;
    }

    /// Empty the store ("clear selection").
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    /// Append manually picked files to the existing sequence, skipping
    /// paths already present so paths stay unique. Returns how many were
    /// actually added.
    pub fn append_picked(&mut self, entries: Vec<FileEntry>) -> usize {
        let mut added = 0;
        for entry in entries {
            if self.by_path(&entry.path).is_none() {
                self.entries.push(entry);
                added += 1;
            }
        }
        added
    }

    /// Bulk toggle: set `included` on every current entry.
    pub fn set_all_included(&mut self, included: bool) {
        for entry in &mut self.entries {
            entry.included = included;
        }
    }

    pub fn toggle_included(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.included = !entry.included;
        }
    }

    pub fn included_count(&self) -> usize {
        self.entries.iter().filter(|e| e.included).count()
    }

    /// Paths the reference annotator should recognize.
    pub fn known_paths(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }
}

// ── Session ──

/// The in-memory session: selection plus the append-only conversation.
/// Created once at startup, passed explicitly to everything that needs
/// it, and never persisted.
#[derive(Debug, Default)]
pub struct Session {
    pub selection: Selection,
    conversation: Vec<ChatMessage>,
    /// A send is outstanding; further sends are rejected until it resolves
    pub request_in_flight: bool,
    /// Round-trip time of the last completed request
    pub last_response_ms: Option<u64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation(&self) -> &[ChatMessage] {
        &self.conversation
    }

    pub fn push_user(&mut self, text: &str) {
        self.conversation.push(ChatMessage {
            role: Role::User,
            text: text.to_string(),
            timestamp: chrono_now(),
        });
    }

    pub fn push_assistant(&mut self, text: String) {
        self.conversation.push(ChatMessage {
            role: Role::Assistant,
            text,
            timestamp: chrono_now(),
        });
    }

    /// Append the result of a request. Failures become assistant-role
    /// entries carrying the formatted error; they are conversation
    /// content, not separate UI state.
    pub fn push_outcome(&mut self, outcome: Result<String, QueryError>) {
        match outcome {
            Ok(reply) => self.push_assistant(reply),
            Err(err) => self.push_assistant(err.to_string()),
        }
    }

    /// Fill an entry's content cache for preview. Cached content is reused
    /// unless `force_refresh`; binary and failed reads are never cached so
    /// a later attempt retries. Returns None when the path left the store.
    pub fn load_for_preview(
        &mut self,
        path: &str,
        limits: &LoadLimits,
        force_refresh: bool,
    ) -> Option<ReadResult> {
        let entry = self.selection.by_path_mut(path)?;
        if !force_refresh {
            if let Some(cached) = &entry.cached_content {
                return Some(ReadResult {
                    content: Some(cached.clone()),
                    truncated: entry.truncated,
                    is_binary: false,
                    size: entry.size,
                    error: None,
                });
            }
        }
        let res = load_content(&entry.abs_path, limits);
        if !res.is_binary && res.error.is_none() {
            entry.cached_content = res.content.clone();
            entry.truncated = res.truncated;
        }
        Some(res)
    }

    /// Assemble the outbound request from every included entry, loading
    /// content where the cache is empty (or unconditionally with
    /// `force_refresh`). Binary files contribute an empty-content entry;
    /// per-file read failures degrade the same way; neither ever blocks
    /// the request. Output order is selection order.
    pub fn build_payload(
        &mut self,
        query: &str,
        options: RequestOptions,
        limits: &LoadLimits,
        force_refresh: bool,
    ) -> QueryPayload {
        let mut files = Vec::new();
        for entry in &mut self.selection.entries {
            if !entry.included {
                continue;
            }
            if entry.cached_content.is_none() || force_refresh {
                let res = load_content(&entry.abs_path, limits);
                if res.is_binary {
                    files.push(PayloadFile {
                        path: entry.path.clone(),
                        size: res.size.or(entry.size),
                        content: String::new(),
                        truncated: false,
                    });
                    entry.cached_content = None;
                    entry.truncated = false;
                    continue;
                }
                if let Some(err) = &res.error {
                    log::warn!("Including {} with empty content: {}", entry.path, err);
                    files.push(PayloadFile {
                        path: entry.path.clone(),
                        size: entry.size,
                        content: String::new(),
                        truncated: false,
                    });
                    continue;
                }
                entry.cached_content = res.content;
                entry.truncated = res.truncated;
            }
            files.push(PayloadFile {
                path: entry.path.clone(),
                size: entry.size,
                content: entry.cached_content.clone().unwrap_or_default(),
                truncated: entry.truncated,
            });
        }

        QueryPayload {
            query: query.to_string(),
            files,
            options,
        }
    }
}

// ── Helpers ──

/// Simple ISO 8601 UTC timestamp (no external crate needed).
pub(crate) fn chrono_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let dur = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let secs = dur.as_secs();

    let days = secs / 86400;
    let remaining = secs % 86400;
    let hours = remaining / 3600;
    let minutes = (remaining % 3600) / 60;
    let seconds = remaining % 60;

    // Walk years from epoch, subtracting days per year (Gregorian rule)
    let mut y = 1970i64;
    let mut d = i64::try_from(days).unwrap_or(i64::MAX);
    loop {
        let days_in_year = if y % 4 == 0 && (y % 100 != 0 || y % 400 == 0) { 366 } else { 365 };
        if d < days_in_year {
            break;
        }
        d -= days_in_year;
        y += 1;
    }

    let leap = y % 4 == 0 && (y % 100 != 0 || y % 400 == 0);
    let month_days: [i64; 12] = [31, if leap { 29 } else { 28 }, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut m = 0usize;
    for md in &month_days {
        if d < *md {
            break;
        }
        d -= *md;
        m += 1;
    }
    if m >= 12 {
        m = 11;
        d = 0;
    }

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        y, m + 1, d + 1, hours, minutes, seconds
    )
}
