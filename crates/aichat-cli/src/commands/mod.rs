pub mod chat;
pub mod conversations;
pub mod history;
pub mod send;
