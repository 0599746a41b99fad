//! Backend seam.
//!
//! Defines the REST operations the session core depends on. The HTTP
//! implementation lives in `aichat-interaction`; tests substitute a mock.

use crate::conversation::{Conversation, ConversationId};
use crate::error::NetworkError;
use crate::message::{Message, Sender};
use async_trait::async_trait;
use serde::Serialize;

/// Body of a message post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMessage {
    pub content: String,
    #[serde(rename = "conversation")]
    pub conversation_id: ConversationId,
}

/// What the backend answers to a message post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendReply {
    /// Only the assistant reply (or only the stored user message)
    Single(Message),
    /// The stored user message and the assistant reply
    Pair(Message, Message),
    /// The full ordered message list of the conversation
    History(Vec<Message>),
}

impl SendReply {
    /// Builds a reply from an array body.
    pub fn from_messages(mut messages: Vec<Message>) -> Self {
        match messages.len() {
            1 => Self::Single(messages.remove(0)),
            2 => {
                let second = messages.remove(1);
                let first = messages.remove(0);
                Self::Pair(first, second)
            }
            _ => Self::History(messages),
        }
    }

    /// Flattens the reply into append order. A pair is always emitted user
    /// message first.
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            Self::Single(message) => vec![message],
            Self::Pair(first, second) => {
                if first.sender == Sender::Assistant && second.sender == Sender::User {
                    vec![second, first]
                } else {
                    vec![first, second]
                }
            }
            Self::History(messages) => messages,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Pair(..) => 2,
            Self::History(messages) => messages.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// REST contract consumed by the session core.
///
/// Implementations attach whatever credential the auth collaborator exposes;
/// the core never sees it.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// GET `/conversations/`
    async fn list_conversations(&self) -> Result<Vec<Conversation>, NetworkError>;

    /// GET `/messages/?conversation={id}`
    async fn list_messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>, NetworkError>;

    /// POST `/conversations/`
    async fn create_conversation(&self) -> Result<Conversation, NetworkError>;

    /// POST `/messages/`
    async fn send_message(&self, message: &NewMessage) -> Result<SendReply, NetworkError>;

    /// GET `/conversations/{id}/latest-message/`
    ///
    /// `Ok(None)` when the conversation has no messages yet.
    async fn latest_message(&self, conversation_id: ConversationId) -> Result<Option<Message>, NetworkError>;
}
