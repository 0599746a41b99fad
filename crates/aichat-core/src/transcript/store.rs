use crate::message::{Message, MessageKey};
use std::collections::HashSet;

/// Ordered, deduplicated message sequence for the active conversation.
///
/// Entries are kept sorted by `(created_at, id)`; equal keys keep their
/// insertion order. No two entries share a [`MessageKey`], and a message
/// dropped by [`TranscriptStore::window_trim`] is not appended again.
#[derive(Debug, Clone, Default)]
pub struct TranscriptStore {
    messages: Vec<Message>,
    keys: HashSet<MessageKey>,
    /// Keys of messages trimmed out of the window
    evicted: HashSet<MessageKey>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole transcript. Input order is irrelevant; duplicates
    /// after the first occurrence are dropped. No windowing.
    pub fn replace(&mut self, messages: Vec<Message>) {
        let mut keys = HashSet::with_capacity(messages.len());
        let mut unique: Vec<Message> = messages
            .into_iter()
            .filter(|m| keys.insert(m.key()))
            .collect();
        // Stable sort preserves input order on ties.
        unique.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        self.messages = unique;
        self.keys = keys;
        self.evicted.clear();
    }

    /// Inserts one message at its sorted position.
    ///
    /// Returns `false` without touching the transcript if an entry with the
    /// same key is present or was trimmed out of the window.
    pub fn append(&mut self, message: Message) -> bool {
        let key = message.key();
        if self.evicted.contains(&key) || !self.keys.insert(key) {
            return false;
        }
        let sort_key = message.sort_key();
        let index = self.messages.partition_point(|m| m.sort_key() <= sort_key);
        self.messages.insert(index, message);
        true
    }

    /// Keeps only the `limit` most recent entries and returns the dropped
    /// ones, oldest first.
    pub fn window_trim(&mut self, limit: usize) -> Vec<Message> {
        if self.messages.len() <= limit {
            return Vec::new();
        }
        let excess = self.messages.len() - limit;
        let dropped: Vec<Message> = self.messages.drain(..excess).collect();
        for message in &dropped {
            let key = message.key();
            self.keys.remove(&key);
            self.evicted.insert(key);
        }
        dropped
    }

    pub fn contains_key(&self, key: &MessageKey) -> bool {
        self.keys.contains(key)
    }

    /// Whether an entry with the same `(sender, content, created_at)` exists,
    /// regardless of ids.
    pub fn contains_fingerprint(&self, message: &Message) -> bool {
        self.messages.iter().any(|m| m.same_fingerprint(message))
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.keys.clear();
        self.evicted.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.clone()
    }
}
