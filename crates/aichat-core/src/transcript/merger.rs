use crate::backend::SendReply;
use crate::config::DEFAULT_WINDOW_SIZE;
use crate::conversation::ConversationId;
use crate::message::Message;
use crate::session::Session;

/// A result from one of the three asynchronous sources, tagged with the
/// conversation it was requested for.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Full history of a conversation
    BulkLoad {
        conversation_id: ConversationId,
        messages: Vec<Message>,
    },
    /// Response to a message post
    SendResult {
        conversation_id: ConversationId,
        reply: SendReply,
    },
    /// Out-of-band "latest message" notification
    PollResult {
        conversation_id: ConversationId,
        message: Message,
    },
}

impl SyncEvent {
    pub fn conversation_id(&self) -> ConversationId {
        match self {
            Self::BulkLoad { conversation_id, .. }
            | Self::SendResult { conversation_id, .. }
            | Self::PollResult { conversation_id, .. } => *conversation_id,
        }
    }

    fn source(&self) -> &'static str {
        match self {
            Self::BulkLoad { .. } => "bulk_load",
            Self::SendResult { .. } => "send_result",
            Self::PollResult { .. } => "poll_result",
        }
    }
}

/// What a merge did to the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The transcript was replaced with `count` messages
    Replaced { count: usize },
    /// These messages were newly inserted (possibly none)
    Appended(Vec<Message>),
    /// A poll result was already present
    Duplicate,
    /// A poll result was not an assistant message
    Ignored,
    /// The event belongs to a conversation that is no longer active
    Stale,
}

impl MergeOutcome {
    /// Messages newly added by this merge.
    pub fn into_appended(self) -> Vec<Message> {
        match self {
            Self::Appended(messages) => messages,
            _ => Vec::new(),
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// Single entry point for transcript mutation.
#[derive(Debug, Clone, Copy)]
pub struct SyncMerger {
    window_size: usize,
}

impl Default for SyncMerger {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl SyncMerger {
    pub fn new(window_size: usize) -> Self {
        Self { window_size }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Applies `event` to the session transcript.
    ///
    /// Events for any conversation other than the active one are discarded,
    /// and so are messages inside an event that name another conversation.
    pub fn merge(&self, session: &mut Session, event: SyncEvent) -> MergeOutcome {
        let source = event.source();
        let conversation_id = event.conversation_id();
        if session.active_conversation_id != Some(conversation_id) {
            tracing::warn!(
                target: "aichat::sync",
                source,
                conversation = %conversation_id,
                active = ?session.active_conversation_id,
                "Discarding result for inactive conversation"
            );
            return MergeOutcome::Stale;
        }

        match event {
            SyncEvent::BulkLoad { messages, .. } => {
                session.transcript.replace(own_messages(messages, conversation_id, source));
                let count = session.transcript.len();
                tracing::debug!(target: "aichat::sync", count, "Transcript replaced from history");
                MergeOutcome::Replaced { count }
            }
            SyncEvent::SendResult { reply, .. } => {
                let mut appended = Vec::with_capacity(reply.len());
                for message in own_messages(reply.into_messages(), conversation_id, source) {
                    if session.transcript.append(message.clone()) {
                        appended.push(message);
                    }
                }
                let dropped = session.transcript.window_trim(self.window_size);
                if !dropped.is_empty() {
                    tracing::debug!(
                        target: "aichat::sync",
                        dropped = dropped.len(),
                        window = self.window_size,
                        "Transcript window trimmed"
                    );
                }
                // A message can be appended and immediately trimmed when it is
                // older than the whole window; report only what survived.
                appended.retain(|m| session.transcript.contains_key(&m.key()));
                MergeOutcome::Appended(appended)
            }
            SyncEvent::PollResult { message, .. } => {
                if message.conversation_id != conversation_id {
                    tracing::warn!(
                        target: "aichat::sync",
                        source,
                        conversation = %message.conversation_id,
                        active = %conversation_id,
                        "Discarding polled message of another conversation"
                    );
                    return MergeOutcome::Stale;
                }
                if !message.is_assistant() {
                    return MergeOutcome::Ignored;
                }
                let fresh = match message.id {
                    Some(_) => session.transcript.append(message.clone()),
                    None => {
                        !session.transcript.contains_fingerprint(&message) && session.transcript.append(message.clone())
                    }
                };
                if !fresh {
                    tracing::debug!(target: "aichat::sync", id = ?message.id, "Poll result already seen");
                    return MergeOutcome::Duplicate;
                }
                MergeOutcome::Appended(vec![message])
            }
        }
    }
}

fn own_messages(messages: Vec<Message>, conversation_id: ConversationId, source: &'static str) -> Vec<Message> {
    let total = messages.len();
    let own: Vec<Message> = messages
        .into_iter()
        .filter(|m| m.conversation_id == conversation_id)
        .collect();
    if own.len() != total {
        tracing::warn!(
            target: "aichat::sync",
            source,
            conversation = %conversation_id,
            skipped = total - own.len(),
            "Skipping messages of another conversation"
        );
    }
    own
}
