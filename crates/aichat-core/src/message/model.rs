//! Conversation message types.

use crate::conversation::ConversationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

/// A single message in a conversation transcript.
///
/// Messages are never mutated after creation; the transcript only appends
/// or drops them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Absent only on out-of-band poll payloads that omit it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    #[serde(rename = "conversation")]
    pub conversation_id: ConversationId,
    pub sender: Sender,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Identity used for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Id(MessageId),
    Fingerprint {
        sender: Sender,
        content: String,
        created_at: DateTime<Utc>,
    },
}

impl Message {
    pub fn key(&self) -> MessageKey {
        match self.id {
            Some(id) => MessageKey::Id(id),
            None => MessageKey::Fingerprint {
                sender: self.sender,
                content: self.content.clone(),
                created_at: self.created_at,
            },
        }
    }

    /// Transcript ordering key: `(created_at, id)`, id-less entries first.
    pub fn sort_key(&self) -> (DateTime<Utc>, Option<MessageId>) {
        (self.created_at, self.id)
    }

    /// Whether `other` is the same `(sender, content, created_at)` triple.
    pub fn same_fingerprint(&self, other: &Message) -> bool {
        self.sender == other.sender
            && self.created_at == other.created_at
            && self.content == other.content
    }

    pub fn is_assistant(&self) -> bool {
        self.sender == Sender::Assistant
    }
}
