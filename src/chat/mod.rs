pub mod annotate;
pub mod api;

// ── Message types ──

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the append-only conversation log. Never mutated after
/// append; the log only resets with the process.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub timestamp: String,
}
