use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of most recent messages kept after a send-triggered append.
pub const DEFAULT_WINDOW_SIZE: usize = 8;

/// Matches the server-side cap on words in a single user message.
pub const DEFAULT_MAX_USER_WORDS: usize = 1000;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Tunables for a chat session.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_max_user_words")]
    pub max_user_words: usize,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_max_user_words() -> usize {
    DEFAULT_MAX_USER_WORDS
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            max_user_words: DEFAULT_MAX_USER_WORDS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl SessionSettings {
    pub fn poll_interval(&self) -> Duration {
        // A zero interval would make tokio::time::interval panic.
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}
