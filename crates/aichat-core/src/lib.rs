//! Client-side chat session synchronizer.
//!
//! Owns the identity of the active conversation, merges history loads, send
//! replies and latest-message polls into one ordered transcript, and
//! classifies assistant text for presentation.

pub mod backend;
pub mod config;
pub mod conversation;
pub mod error;
pub mod message;
pub mod session;
pub mod transcript;

pub use backend::{ChatBackend, NewMessage, SendReply};
pub use config::SessionSettings;
pub use conversation::{Conversation, ConversationController, ConversationId};
pub use error::{ChatError, NetworkError, Result};
pub use message::{Message, MessageId, Sender};
pub use session::{ChatClient, Session, SessionStatus};
pub use transcript::{MergeOutcome, SyncEvent, SyncMerger, TranscriptStore};
