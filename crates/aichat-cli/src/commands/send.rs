use aichat_core::ChatClient;
use aichat_core::conversation::ConversationId;
use anyhow::Result;
use colored::Colorize;

use crate::render;

pub async fn once(client: &ChatClient, text: &str, conversation_id: Option<ConversationId>) -> Result<()> {
    let appended = client.send(text, conversation_id).await?;
    for message in &appended {
        render::print_message(message);
    }
    if let Some(id) = client.active_conversation_id().await {
        println!("{}", format!("conversation {}", id).bright_black());
    }
    Ok(())
}
