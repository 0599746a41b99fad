use aichat_core::ChatClient;
use aichat_core::conversation::ConversationId;
use anyhow::Result;

use crate::render;

pub async fn show(client: &ChatClient, conversation_id: ConversationId) -> Result<()> {
    let count = client.open_conversation(conversation_id).await?;
    tracing::debug!(conversation = %conversation_id, count, "History loaded");
    render::print_transcript(&client.transcript().await);
    Ok(())
}
