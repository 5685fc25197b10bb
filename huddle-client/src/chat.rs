use huddle_core::{ChatEntry, SignalMessage};

/// Per-room text history. Sends are optimistic: the entry lands in local
/// history the moment it is composed, with no acknowledgment from anyone.
/// Receives are appended in arrival order, no dedup, nothing persisted past
/// the session.
pub struct ChatLog {
    author: String,
    entries: Vec<ChatEntry>,
}

impl ChatLog {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            entries: Vec::new(),
        }
    }

    /// Appends an own entry and returns it together with the wire message.
    /// The caller is responsible for checking the transport first; a failed
    /// send must leave history untouched.
    pub fn compose(&mut self, text: impl Into<String>) -> (ChatEntry, SignalMessage) {
        let entry = ChatEntry::own(self.author.clone(), text);
        self.entries.push(entry.clone());
        let message = SignalMessage::Message {
            text: entry.text.clone(),
            username: entry.author.clone(),
            timestamp: entry.timestamp_ms,
        };
        (entry, message)
    }

    pub fn receive(&mut self, author: String, text: String, timestamp_ms: u64) -> ChatEntry {
        let entry = ChatEntry::remote(author, text, timestamp_ms);
        self.entries.push(entry.clone());
        entry
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
