use super::model::{Activity, SharedSession};
use crate::backend::{ChatBackend, NewMessage};
use crate::config::SessionSettings;
use crate::conversation::{ConversationController, ConversationId};
use crate::error::{ChatError, Result};
use crate::message::Message;
use crate::transcript::{SyncEvent, SyncMerger};
use std::sync::Arc;

/// Sends one user message: resolve the conversation, post, merge the reply.
///
/// Overlapping sends are not serialized; replies are merged in completion
/// order.
#[derive(Clone)]
pub struct SendPipeline {
    backend: Arc<dyn ChatBackend>,
    controller: ConversationController,
    merger: SyncMerger,
    session: SharedSession,
    activity: Activity,
    max_user_words: usize,
}

impl SendPipeline {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        controller: ConversationController,
        session: SharedSession,
        activity: Activity,
        settings: &SessionSettings,
    ) -> Self {
        Self {
            backend,
            controller,
            merger: SyncMerger::new(settings.window_size),
            session,
            activity,
            max_user_words: settings.max_user_words,
        }
    }

    /// Sends `content` and returns the messages it added to the transcript.
    ///
    /// # Arguments
    ///
    /// * `content` - Raw user input; surrounding whitespace is trimmed
    /// * `conversation_id` - Target conversation; defaults to the active one
    ///
    /// # Errors
    ///
    /// - `InvalidInput`: empty or over-long content, nothing was sent
    /// - `CreateConversationFailed`: no conversation could be created, nothing was posted
    /// - `SendFailed`: the post failed; a conversation created for it is kept
    ///
    /// An empty list means the reply arrived after the session moved to a
    /// different conversation and was discarded.
    pub async fn send(&self, content: &str, conversation_id: Option<ConversationId>) -> Result<Vec<Message>> {
        let content = self.validate(content)?;

        let (current, epoch) = {
            let session = self.session.lock().await;
            (conversation_id.or(session.active_conversation_id), session.epoch)
        };
        let conversation_id = self.controller.ensure_conversation(current).await?;

        {
            let mut session = self.session.lock().await;
            // A conversation resolved before a reset must not become active
            // in the session that replaced it.
            if session.epoch != epoch {
                tracing::warn!(
                    target: "aichat::sync",
                    conversation = %conversation_id,
                    "Session was reset while resolving the conversation; not posting"
                );
                return Ok(Vec::new());
            }
            if !session.adopt_conversation(conversation_id) {
                tracing::debug!(
                    target: "aichat::sync",
                    conversation = %conversation_id,
                    active = ?session.active_conversation_id,
                    "Posting to a conversation other than the active one"
                );
            }
        }

        let request = NewMessage {
            content,
            conversation_id,
        };
        let reply = {
            let _busy = self.activity.begin();
            self.backend.send_message(&request).await
        };

        let mut session = self.session.lock().await;
        let reply = match reply {
            Ok(reply) => reply,
            Err(cause) => {
                let err = ChatError::SendFailed(cause);
                tracing::warn!(target: "aichat::sync", conversation = %conversation_id, error = %err, "Message post failed");
                if session.epoch == epoch {
                    session.record_error(&err);
                }
                return Err(err);
            }
        };

        if session.epoch != epoch {
            tracing::warn!(
                target: "aichat::sync",
                conversation = %conversation_id,
                "Session was reset while sending; discarding reply"
            );
            return Ok(Vec::new());
        }

        let outcome = self.merger.merge(
            &mut session,
            SyncEvent::SendResult {
                conversation_id,
                reply,
            },
        );
        Ok(outcome.into_appended())
    }

    fn validate(&self, content: &str) -> Result<String> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ChatError::invalid_input("Message cannot be empty."));
        }
        let words = trimmed.split_whitespace().count();
        if words > self.max_user_words {
            return Err(ChatError::invalid_input(format!(
                "Message too long ({} words, max {}).",
                words, self.max_user_words
            )));
        }
        Ok(trimmed.to_string())
    }
}
