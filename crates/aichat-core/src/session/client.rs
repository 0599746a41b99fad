use super::model::{Activity, Session, SessionStatus, SharedSession};
use super::pipeline::SendPipeline;
use super::poller::PollerHandle;
use crate::backend::ChatBackend;
use crate::config::SessionSettings;
use crate::conversation::{Conversation, ConversationController, ConversationId};
use crate::error::{ChatError, Result};
use crate::message::Message;
use crate::transcript::{MergeOutcome, SyncEvent, SyncMerger};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Entry point for a UI layer: one `ChatClient` per open chat context.
///
/// `ChatClient` is responsible for:
/// - Listing conversations and opening one (full history, no windowing)
/// - Starting a new conversation (explicit session reset)
/// - Sending messages through the [`SendPipeline`]
/// - Merging latest-message polls, on demand or from a background poller
/// - Exposing the transcript, status and last error
///
/// Cloning is cheap; clones share the same session.
#[derive(Clone)]
pub struct ChatClient {
    backend: Arc<dyn ChatBackend>,
    session: SharedSession,
    controller: ConversationController,
    pipeline: SendPipeline,
    merger: SyncMerger,
    activity: Activity,
    settings: SessionSettings,
}

impl ChatClient {
    pub fn new(backend: Arc<dyn ChatBackend>, settings: SessionSettings) -> Self {
        let session: SharedSession = Arc::new(Mutex::new(Session::new()));
        let activity = Activity::new();
        let controller = ConversationController::new(Arc::clone(&backend), Arc::clone(&session));
        let pipeline = SendPipeline::new(
            Arc::clone(&backend),
            controller.clone(),
            Arc::clone(&session),
            activity.clone(),
            &settings,
        );
        Self {
            backend,
            session,
            controller,
            pipeline,
            merger: SyncMerger::new(settings.window_size),
            activity,
            settings,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Fetches the user's conversations and keeps them on the session.
    pub async fn load_conversations(&self) -> Result<Vec<Conversation>> {
        let result = {
            let _busy = self.activity.begin();
            self.backend.list_conversations().await
        };

        let mut session = self.session.lock().await;
        match result {
            Ok(conversations) => {
                session.conversations = conversations.clone();
                Ok(conversations)
            }
            Err(cause) => {
                let err = ChatError::load_failed("conversations", cause);
                session.record_error(&err);
                Err(err)
            }
        }
    }

    /// Switches the session to `conversation_id` and loads its full history.
    ///
    /// Returns the number of messages now in the transcript. On failure the
    /// conversation stays selected with an empty transcript.
    pub async fn open_conversation(&self, conversation_id: ConversationId) -> Result<usize> {
        let epoch = {
            let mut session = self.session.lock().await;
            session.reset(Some(conversation_id));
            session.epoch
        };
        tracing::info!(target: "aichat::sync", conversation = %conversation_id, "Opening conversation");

        let result = {
            let _busy = self.activity.begin();
            self.backend.list_messages(conversation_id).await
        };

        let mut session = self.session.lock().await;
        let messages = match result {
            Ok(messages) => messages,
            Err(cause) => {
                let err = ChatError::load_failed("messages", cause);
                if session.epoch == epoch {
                    session.record_error(&err);
                }
                return Err(err);
            }
        };
        if session.epoch != epoch {
            tracing::warn!(target: "aichat::sync", conversation = %conversation_id, "Discarding superseded history load");
            return Ok(0);
        }

        match self.merger.merge(
            &mut session,
            SyncEvent::BulkLoad {
                conversation_id,
                messages,
            },
        ) {
            MergeOutcome::Replaced { count } => Ok(count),
            _ => Ok(0),
        }
    }

    /// Clears the session so the next send creates a fresh conversation.
    pub async fn start_new_conversation(&self) {
        self.session.lock().await.reset(None);
        tracing::info!(target: "aichat::sync", "Started a new conversation");
    }

    /// Sends a user message. See [`SendPipeline::send`].
    pub async fn send(&self, content: &str, conversation_id: Option<ConversationId>) -> Result<Vec<Message>> {
        self.pipeline.send(content, conversation_id).await
    }

    /// Resolves the conversation id, creating one if needed.
    pub async fn ensure_conversation(&self) -> Result<ConversationId> {
        self.controller.ensure_conversation(None).await
    }

    /// Polls the latest message of the active conversation and merges it.
    ///
    /// Returns the newly merged messages; a session without an active
    /// conversation polls nothing.
    pub async fn poll_latest(&self) -> Result<Vec<Message>> {
        let (conversation_id, epoch) = {
            let session = self.session.lock().await;
            match session.active_conversation_id {
                Some(id) => (id, session.epoch),
                None => return Ok(Vec::new()),
            }
        };

        let result = {
            let _busy = self.activity.begin();
            self.backend.latest_message(conversation_id).await
        };

        let mut session = self.session.lock().await;
        let message = match result {
            Ok(Some(message)) => message,
            Ok(None) => return Ok(Vec::new()),
            Err(cause) => {
                let err = ChatError::load_failed("latest message", cause);
                if session.epoch == epoch {
                    session.record_error(&err);
                }
                return Err(err);
            }
        };
        if session.epoch != epoch {
            return Ok(Vec::new());
        }

        let outcome = self.merger.merge(
            &mut session,
            SyncEvent::PollResult {
                conversation_id,
                message,
            },
        );
        Ok(outcome.into_appended())
    }

    /// Starts polling the active conversation every
    /// `settings.poll_interval_secs`, forwarding newly merged replies.
    pub fn spawn_poller(&self, replies: mpsc::UnboundedSender<Message>) -> PollerHandle {
        PollerHandle::spawn(self.clone(), self.settings.poll_interval(), replies)
    }

    pub async fn transcript(&self) -> Vec<Message> {
        self.session.lock().await.transcript.to_vec()
    }

    pub async fn active_conversation_id(&self) -> Option<ConversationId> {
        self.session.lock().await.active_conversation_id
    }

    pub async fn active_conversation(&self) -> Option<Conversation> {
        self.controller.active_conversation().await
    }

    pub async fn conversations(&self) -> Vec<Conversation> {
        self.session.lock().await.conversations.clone()
    }

    pub async fn last_error(&self) -> Option<ChatError> {
        self.session.lock().await.last_error.clone()
    }

    pub async fn clear_error(&self) {
        self.session.lock().await.last_error = None;
    }

    pub fn status(&self) -> SessionStatus {
        self.activity.status()
    }
}
