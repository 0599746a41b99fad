//! Background latest-message polling.

use super::client::ChatClient;
use crate::message::Message;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Running poller; polling stops when the handle is stopped or dropped.
pub struct PollerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub(crate) fn spawn(client: ChatClient, every: Duration, replies: mpsc::UnboundedSender<Message>) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!(target: "aichat::sync", interval_ms = every.as_millis() as u64, "Poller started");

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                match client.poll_latest().await {
                    Ok(merged) => {
                        for message in merged {
                            if replies.send(message).is_err() {
                                tracing::debug!(target: "aichat::sync", "Reply receiver dropped; stopping poller");
                                return;
                            }
                        }
                    }
                    // Already recorded on the session; keep polling.
                    Err(err) => tracing::warn!(target: "aichat::sync", error = %err, "Poll failed"),
                }
            }

            tracing::debug!(target: "aichat::sync", "Poller stopped");
        });

        Self {
            cancel,
            task: Some(task),
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops polling and waits for the in-progress poll, if any, to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::mock::{MockBackend, message};
    use crate::config::SessionSettings;
    use crate::message::Sender;
    use crate::session::ChatClient;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_poller_forwards_new_replies_once() {
        let backend = Arc::new(MockBackend::new());
        let client = ChatClient::new(backend.clone(), SessionSettings::default());
        client.send("hello", None).await.unwrap();
        let conversation = client.active_conversation_id().await.unwrap();
        backend.set_latest(Some(message(7000, conversation.0, Sender::Assistant, "later", 8000)));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let poller = client.spawn_poller(tx);

        let reply = rx.recv().await.unwrap();
        assert_eq!(reply.content, "later");

        // Further ticks see the same latest message and merge nothing.
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(rx.try_recv().is_err());
        assert!(backend.calls.latest.load(Ordering::SeqCst) >= 2);
        assert_eq!(client.transcript().await.len(), 3);

        assert!(poller.is_running());
        poller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_stops_when_receiver_dropped() {
        let backend = Arc::new(MockBackend::new());
        let client = ChatClient::new(backend.clone(), SessionSettings::default());
        client.send("hello", None).await.unwrap();
        let conversation = client.active_conversation_id().await.unwrap();
        backend.set_latest(Some(message(7000, conversation.0, Sender::Assistant, "later", 8000)));

        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let poller = client.spawn_poller(tx);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!poller.is_running());
    }
}
