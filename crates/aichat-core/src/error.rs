//! Error types for the chat session core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport-level failure underlying every backend operation.
///
/// Kept `Clone` so a single failed create can be handed to every caller
/// waiting on the same in-flight request.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkError {
    /// The request never produced a response (connect, timeout, TLS, ...)
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl NetworkError {
    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Returns the HTTP status if the server rejected the request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error taxonomy surfaced by every session operation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatError {
    /// The message was rejected locally; nothing was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A conversation could not be created on demand
    #[error("Failed to create conversation: {0}")]
    CreateConversationFailed(NetworkError),

    /// The message post failed
    #[error("Failed to send message: {0}")]
    SendFailed(NetworkError),

    /// Fetching server state (conversations, history, latest reply) failed
    #[error("Failed to load {resource}: {cause}")]
    LoadFailed { resource: String, cause: NetworkError },

    /// Generic transport failure not tied to a specific operation
    #[error("Network error: {0}")]
    Network(NetworkError),
}

impl ChatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidInput error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Creates a LoadFailed error for the named resource
    pub fn load_failed(resource: impl Into<String>, cause: NetworkError) -> Self {
        Self::LoadFailed {
            resource: resource.into(),
            cause,
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an InvalidInput error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check if this is a CreateConversationFailed error
    pub fn is_create_failed(&self) -> bool {
        matches!(self, Self::CreateConversationFailed(_))
    }

    /// Check if this is a SendFailed error
    pub fn is_send_failed(&self) -> bool {
        matches!(self, Self::SendFailed(_))
    }

    /// Returns the underlying transport failure, if any.
    pub fn cause(&self) -> Option<&NetworkError> {
        match self {
            Self::InvalidInput(_) => None,
            Self::CreateConversationFailed(cause)
            | Self::SendFailed(cause)
            | Self::LoadFailed { cause, .. }
            | Self::Network(cause) => Some(cause),
        }
    }
}

impl From<NetworkError> for ChatError {
    fn from(err: NetworkError) -> Self {
        Self::Network(err)
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// A type alias for `Result<T, ChatError>`.
pub type Result<T> = std::result::Result<T, ChatError>;
