//! Conversation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned conversation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A conversation as returned by the backend.
///
/// The client never builds one itself: it either lists them or receives
/// one from a create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    /// May be empty; the server allows untitled conversations
    #[serde(default)]
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Owning user, when the server exposes it
    #[serde(default, rename = "user_id", alias = "user", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
}

impl Conversation {
    /// Title for display, falling back to the server's default naming.
    pub fn display_title(&self) -> String {
        if self.title.trim().is_empty() {
            format!("Conversation {}", self.id)
        } else {
            self.title.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_server_payload() {
        let json = r#"{
            "id": 12,
            "title": "",
            "created_at": "2025-03-01T09:30:00.123456Z",
            "messages": []
        }"#;
        let conversation: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conversation.id, ConversationId(12));
        assert_eq!(conversation.owner_id, None);
        assert_eq!(conversation.display_title(), "Conversation 12");
    }

    #[test]
    fn test_owner_accepts_user_alias() {
        let json = r#"{"id": 1, "title": "Trip", "created_at": "2025-03-01T09:30:00+00:00", "user": 7}"#;
        let conversation: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conversation.owner_id, Some(7));
        assert_eq!(conversation.display_title(), "Trip");
    }
}
