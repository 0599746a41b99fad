use std::borrow::Cow::{self, Borrowed, Owned};

use aichat_core::conversation::ConversationId;
use aichat_core::message::Sender;
use aichat_core::{ChatClient, ChatError, SessionStatus};
use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use tokio::sync::mpsc;

use super::conversations::print_conversations;
use crate::render;

const COMMANDS: &[&str] = &["/new", "/open", "/list", "/status"];

/// rustyline helper completing and hinting the slash commands.
#[derive(Clone)]
struct ChatHelper {
    commands: Vec<String>,
}

impl ChatHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for ChatHelper {}

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    New,
    List,
    Status,
    Open(ConversationId),
    Usage(&'static str),
    Unknown(&'a str),
    Say(&'a str),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line == "quit" || line == "exit" {
            return Input::Quit;
        }
        if !line.starts_with('/') {
            return Input::Say(line);
        }

        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("/new"), None) => Input::New,
            (Some("/list"), None) => Input::List,
            (Some("/status"), None) => Input::Status,
            (Some("/open"), Some(id)) => match id.parse::<i64>() {
                Ok(id) if parts.next().is_none() => Input::Open(ConversationId(id)),
                _ => Input::Usage("/open <conversation-id>"),
            },
            (Some("/open"), None) => Input::Usage("/open <conversation-id>"),
            _ => Input::Unknown(line),
        }
    }
}

fn print_error(err: &ChatError) {
    if err.is_invalid_input() {
        println!("{}", err.to_string().yellow());
    } else {
        eprintln!("{}", format!("Error: {}", err).red());
    }
}

async fn print_status(client: &ChatClient) {
    let conversation = match client.active_conversation_id().await {
        Some(id) => id.to_string(),
        None => "none (created on first message)".to_string(),
    };
    let status = match client.status() {
        SessionStatus::Idle => "idle".to_string(),
        SessionStatus::Busy { in_flight } => format!("busy ({} in flight)", in_flight),
    };
    println!("{}", format!("conversation: {}", conversation).bright_black());
    println!("{}", format!("status: {}", status).bright_black());
    println!("{}", format!("messages: {}", client.transcript().await.len()).bright_black());
    if let Some(err) = client.last_error().await {
        println!("{}", format!("last error: {}", err).red());
    }
}

/// Interactive chat loop. Replies that arrive through polling are printed
/// as they are merged.
pub async fn run(client: ChatClient, conversation: Option<ConversationId>) -> Result<()> {
    if let Some(id) = conversation {
        client.open_conversation(id).await?;
        render::print_transcript(&client.transcript().await);
    }

    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
    let poller = client.spawn_poller(reply_tx);
    let printer = tokio::spawn(async move {
        while let Some(message) = reply_rx.recv().await {
            render::print_message(&message);
        }
    });

    let mut rl = Editor::new()?;
    rl.set_helper(Some(ChatHelper::new()));

    println!("{}", "=== aichat ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a message, '/new' for a fresh conversation, '/open <id>', '/list', '/status' or 'quit'.".bright_black()
    );
    println!();

    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        match Input::parse(&line) {
            Input::Quit => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Input::New => {
                client.start_new_conversation().await;
                println!("{}", "Started a new conversation.".bright_black());
            }
            Input::List => match client.load_conversations().await {
                Ok(conversations) => print_conversations(&conversations),
                Err(err) => print_error(&err),
            },
            Input::Status => print_status(&client).await,
            Input::Open(id) => match client.open_conversation(id).await {
                Ok(_) => render::print_transcript(&client.transcript().await),
                Err(err) => print_error(&err),
            },
            Input::Usage(usage) => println!("{}", format!("Usage: {}", usage).yellow()),
            Input::Unknown(command) => println!("{}", format!("Unknown command: {}", command).bright_black()),
            Input::Say(text) => match client.send(text, None).await {
                Ok(appended) => {
                    for message in appended.iter().filter(|m| m.sender == Sender::Assistant) {
                        render::print_message(message);
                    }
                }
                Err(err) => print_error(&err),
            },
        }
    }

    poller.stop().await;
    let _ = printer.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Input::parse("quit"), Input::Quit);
        assert_eq!(Input::parse("  exit "), Input::Quit);
        assert_eq!(Input::parse("/new"), Input::New);
        assert_eq!(Input::parse("/list"), Input::List);
        assert_eq!(Input::parse("/open 42"), Input::Open(ConversationId(42)));
        assert_eq!(Input::parse("/open"), Input::Usage("/open <conversation-id>"));
        assert_eq!(Input::parse("/open x"), Input::Usage("/open <conversation-id>"));
        assert_eq!(Input::parse("/frobnicate"), Input::Unknown("/frobnicate"));
    }

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(Input::parse(" hello there "), Input::Say("hello there"));
        assert_eq!(Input::parse("quit smoking tips"), Input::Say("quit smoking tips"));
    }
}
