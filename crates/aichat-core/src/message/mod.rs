//! Message domain module.
//!
//! - `model`: `Message`, `MessageId`, `Sender` and the dedup `MessageKey`
//! - `classifier`: render-time classification of message text

pub mod classifier;
mod model;

pub use classifier::{Classification, Component, classify, contains_list, contains_table, normalize};
pub use model::{Message, MessageId, MessageKey, Sender};
