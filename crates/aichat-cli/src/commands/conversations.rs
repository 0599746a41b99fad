use aichat_core::ChatClient;
use aichat_core::conversation::Conversation;
use anyhow::Result;
use colored::Colorize;

pub async fn list(client: &ChatClient) -> Result<()> {
    let conversations = client.load_conversations().await?;
    print_conversations(&conversations);
    Ok(())
}

pub fn print_conversations(conversations: &[Conversation]) {
    if conversations.is_empty() {
        println!("{}", "No conversations yet.".bright_black());
        return;
    }
    for conversation in conversations {
        println!(
            "{:>6}  {}  {}",
            conversation.id.to_string().bright_cyan(),
            conversation.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black(),
            conversation.display_title()
        );
    }
}
