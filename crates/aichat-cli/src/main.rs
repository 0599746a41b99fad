use std::sync::Arc;

use aichat_core::ChatClient;
use aichat_interaction::{ClientConfig, RestChatBackend};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "aichat")]
#[command(about = "aichat - terminal client for the AI assistant", long_about = None)]
struct Cli {
    /// Override the configured API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List your conversations
    Conversations,
    /// Print the full history of a conversation
    History {
        /// Conversation id
        conversation: i64,
    },
    /// Send one message and print the reply
    Send {
        /// Message text
        text: String,
        /// Post into this conversation instead of creating one
        #[arg(long, short)]
        conversation: Option<i64>,
    },
    /// Interactive chat session
    Chat {
        /// Resume this conversation
        #[arg(long, short)]
        conversation: Option<i64>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,aichat=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = ClientConfig::load().context("Failed to load configuration")?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    tracing::debug!(api_url = %config.base_url(), "Configuration loaded");

    let backend = Arc::new(RestChatBackend::from_config(&config));
    let client = ChatClient::new(backend, config.session.clone());

    match cli.command {
        Commands::Conversations => commands::conversations::list(&client).await?,
        Commands::History { conversation } => commands::history::show(&client, conversation.into()).await?,
        Commands::Send { text, conversation } => {
            commands::send::once(&client, &text, conversation.map(Into::into)).await?
        }
        Commands::Chat { conversation } => commands::chat::run(client, conversation.map(Into::into)).await?,
    }

    Ok(())
}
