use chrono::Utc;

/// One line of chat history. `own` marks entries this side wrote, which are
/// appended optimistically before the relay confirms anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub author: String,
    pub text: String,
    pub timestamp_ms: u64,
    pub own: bool,
}

impl ChatEntry {
    pub fn own(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            timestamp_ms: now_ms(),
            own: true,
        }
    }

    pub fn remote(author: impl Into<String>, text: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            timestamp_ms,
            own: false,
        }
    }
}

/// Epoch milliseconds, the timestamp unit used on the wire.
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
