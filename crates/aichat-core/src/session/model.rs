//! Session state.
//!
//! One `Session` exists per open conversation context and lives only in
//! memory. It is owned by the `ChatClient` behind an async mutex; every
//! mutation goes through the conversation controller or the sync merger.

use crate::conversation::{Conversation, ConversationId};
use crate::error::{ChatError, NetworkError};
use crate::transcript::TranscriptStore;
use futures::future::{BoxFuture, Shared};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Shared in-flight conversation create.
pub(crate) type CreateFuture = Shared<BoxFuture<'static, std::result::Result<Conversation, NetworkError>>>;

/// Marker for a create request currently in flight.
#[derive(Clone)]
pub struct PendingCreate {
    pub(crate) future: CreateFuture,
}

impl PendingCreate {
    pub(crate) fn new(future: CreateFuture) -> Self {
        Self { future }
    }

    pub(crate) fn is_same(&self, other: &CreateFuture) -> bool {
        self.future.ptr_eq(other)
    }
}

impl fmt::Debug for PendingCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCreate").finish_non_exhaustive()
    }
}

/// Coarse activity indicator for the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Busy { in_flight: usize },
}

/// Counts backend calls in flight; the source of [`SessionStatus`].
#[derive(Debug, Clone, Default)]
pub struct Activity {
    in_flight: Arc<AtomicUsize>,
}

impl Activity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks one call in flight until the returned guard is dropped.
    pub fn begin(&self) -> ActivityGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        ActivityGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self.in_flight.load(Ordering::SeqCst) {
            0 => SessionStatus::Idle,
            in_flight => SessionStatus::Busy { in_flight },
        }
    }
}

#[must_use = "the call is only tracked while the guard is alive"]
pub struct ActivityGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory state of one chat session.
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) active_conversation_id: Option<ConversationId>,
    /// Metadata of the active conversation when it was created or listed here
    pub(crate) conversation: Option<Conversation>,
    /// Last fetched conversation list (sidebar)
    pub(crate) conversations: Vec<Conversation>,
    pub(crate) transcript: TranscriptStore,
    pub(crate) pending_create: Option<PendingCreate>,
    pub(crate) last_error: Option<ChatError>,
    /// Bumped on every explicit reset so late results can be recognised
    pub(crate) epoch: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_conversation_id(&self) -> Option<ConversationId> {
        self.active_conversation_id
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn transcript(&self) -> &TranscriptStore {
        &self.transcript
    }

    pub fn last_error(&self) -> Option<&ChatError> {
        self.last_error.as_ref()
    }

    pub fn has_pending_create(&self) -> bool {
        self.pending_create.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Starts over for `conversation_id` (or for a not-yet-created one).
    ///
    /// This is the only place where an already-set active conversation id
    /// may change.
    pub(crate) fn reset(&mut self, conversation_id: Option<ConversationId>) {
        self.epoch += 1;
        self.active_conversation_id = conversation_id;
        self.conversation = conversation_id
            .and_then(|id| self.conversations.iter().find(|c| c.id == id).cloned());
        self.transcript.clear();
        self.pending_create = None;
        self.last_error = None;
    }

    /// Assigns the active conversation if none is set yet.
    ///
    /// Returns `false` when a different conversation is already active.
    pub(crate) fn adopt_conversation(&mut self, conversation_id: ConversationId) -> bool {
        match self.active_conversation_id {
            None => {
                self.active_conversation_id = Some(conversation_id);
                true
            }
            Some(current) => current == conversation_id,
        }
    }

    pub(crate) fn record_error(&mut self, err: &ChatError) {
        self.last_error = Some(err.clone());
    }
}

/// Handle to the session shared between controller, pipeline and poller.
pub type SharedSession = Arc<Mutex<Session>>;
