use super::model::{Conversation, ConversationId};
use crate::backend::ChatBackend;
use crate::error::{ChatError, Result};
use crate::session::model::{CreateFuture, PendingCreate};
use crate::session::SharedSession;
use futures::FutureExt;
use std::sync::Arc;

/// Owns conversation identity for a session.
///
/// `ConversationController` is responsible for:
/// - Returning the known conversation id without touching the network
/// - Creating a conversation on demand, at most one create in flight per session
/// - Sharing the outcome of that create with every concurrent caller
#[derive(Clone)]
pub struct ConversationController {
    backend: Arc<dyn ChatBackend>,
    session: SharedSession,
}

impl ConversationController {
    pub fn new(backend: Arc<dyn ChatBackend>, session: SharedSession) -> Self {
        Self { backend, session }
    }

    /// Resolves the conversation to post into.
    ///
    /// # Arguments
    ///
    /// * `current` - The id the caller already holds, if any
    ///
    /// # Errors
    ///
    /// Returns `CreateConversationFailed` when the on-demand create fails.
    /// The session's active conversation stays unset in that case.
    pub async fn ensure_conversation(&self, current: Option<ConversationId>) -> Result<ConversationId> {
        if let Some(id) = current {
            return Ok(id);
        }

        let (future, epoch) = {
            let mut session = self.session.lock().await;
            if let Some(id) = session.active_conversation_id {
                return Ok(id);
            }
            let future = match &session.pending_create {
                Some(pending) => {
                    tracing::debug!(target: "aichat::sync", "Joining in-flight conversation create");
                    pending.future.clone()
                }
                None => {
                    tracing::info!(target: "aichat::sync", "Creating conversation");
                    let future = self.start_create();
                    session.pending_create = Some(PendingCreate::new(future.clone()));
                    future
                }
            };
            (future, session.epoch)
        };

        let outcome = future.clone().await;

        let mut session = self.session.lock().await;
        let current_epoch = session.epoch == epoch;
        if current_epoch
            && session
                .pending_create
                .as_ref()
                .is_some_and(|pending| pending.is_same(&future))
        {
            session.pending_create = None;
        }

        match outcome {
            Ok(conversation) => {
                let id = conversation.id;
                if current_epoch && session.active_conversation_id.is_none() {
                    tracing::info!(target: "aichat::sync", conversation = %id, "Conversation created");
                    session.active_conversation_id = Some(id);
                    session.conversations.push(conversation.clone());
                    session.conversation = Some(conversation);
                }
                Ok(id)
            }
            Err(cause) => {
                let err = ChatError::CreateConversationFailed(cause);
                tracing::warn!(target: "aichat::sync", error = %err, "Conversation create failed");
                if current_epoch {
                    session.record_error(&err);
                }
                Err(err)
            }
        }
    }

    fn start_create(&self) -> CreateFuture {
        let backend = Arc::clone(&self.backend);
        async move { backend.create_conversation().await }.boxed().shared()
    }

    /// Metadata of the active conversation, if the session has it.
    pub async fn active_conversation(&self) -> Option<Conversation> {
        self.session.lock().await.conversation.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::error::NetworkError;
    use crate::session::Session;
    use std::time::Duration;
    use tokio::sync::Mutex;

    fn controller(backend: Arc<MockBackend>) -> (ConversationController, SharedSession) {
        let session = Arc::new(Mutex::new(Session::new()));
        (ConversationController::new(backend, session.clone()), session)
    }

    #[tokio::test]
    async fn test_known_id_issues_no_network_call() {
        let backend = Arc::new(MockBackend::new());
        let (controller, session) = controller(backend.clone());
        session.lock().await.adopt_conversation(ConversationId(7));

        let id = controller.ensure_conversation(Some(ConversationId(7))).await.unwrap();
        assert_eq!(id, ConversationId(7));

        let id = controller.ensure_conversation(None).await.unwrap();
        assert_eq!(id, ConversationId(7));

        assert_eq!(backend.calls.total(), 0);
    }

    #[tokio::test]
    async fn test_creates_and_stores_conversation() {
        let backend = Arc::new(MockBackend::new());
        let (controller, session) = controller(backend.clone());

        let id = controller.ensure_conversation(None).await.unwrap();

        let session = session.lock().await;
        assert_eq!(session.active_conversation_id(), Some(id));
        assert!(!session.has_pending_create());
        assert_eq!(session.conversation().map(|c| c.id), Some(id));
        assert_eq!(backend.calls.create(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_create() {
        let backend = Arc::new(MockBackend::new().with_create_delay(Duration::from_millis(20)));
        let (controller, _session) = controller(backend.clone());

        let calls = (0..8).map(|_| {
            let controller = controller.clone();
            async move { controller.ensure_conversation(None).await }
        });
        let results = futures::future::join_all(calls).await;

        let ids: Vec<ConversationId> = results.into_iter().map(|r| r.unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(backend.calls.create(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_failure() {
        let backend = Arc::new(MockBackend::new().with_create_delay(Duration::from_millis(20)));
        backend.fail_next_create(NetworkError::transport("connection refused"));
        let (controller, session) = controller(backend.clone());

        let calls = (0..4).map(|_| {
            let controller = controller.clone();
            async move { controller.ensure_conversation(None).await }
        });
        let results = futures::future::join_all(calls).await;

        assert!(results.iter().all(|r| matches!(r, Err(ChatError::CreateConversationFailed(_)))));
        assert_eq!(backend.calls.create(), 1);

        let session = session.lock().await;
        assert_eq!(session.active_conversation_id(), None);
        assert!(!session.has_pending_create());
        assert!(session.last_error().is_some_and(ChatError::is_create_failed));
    }

    #[tokio::test]
    async fn test_retry_after_failure_creates_again() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_next_create(NetworkError::Status {
            status: 503,
            body: "unavailable".to_string(),
        });
        let (controller, _session) = controller(backend.clone());

        assert!(controller.ensure_conversation(None).await.is_err());
        assert!(controller.ensure_conversation(None).await.is_ok());
        assert_eq!(backend.calls.create(), 2);
    }

    #[tokio::test]
    async fn test_create_finishing_after_reset_is_not_adopted() {
        let backend = Arc::new(MockBackend::new().with_create_delay(Duration::from_millis(20)));
        let (controller, session) = controller(backend.clone());

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.ensure_conversation(None).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        session.lock().await.reset(None);

        let id = pending.await.unwrap().unwrap();
        assert_eq!(id, ConversationId(100));
        assert_eq!(session.lock().await.active_conversation_id(), None);
    }
}
