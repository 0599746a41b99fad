//! Conversation domain module.
//!
//! - `model`: `Conversation` and `ConversationId`
//! - `controller`: on-demand, single-flight conversation creation

mod controller;
mod model;

pub use controller::ConversationController;
pub use model::{Conversation, ConversationId};
