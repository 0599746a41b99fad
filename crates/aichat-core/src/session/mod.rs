//! Session module.
//!
//! # Module Structure
//!
//! - `model`: in-memory session state (`Session`, `SessionStatus`)
//! - `pipeline`: the send path (`SendPipeline`)
//! - `client`: the `ChatClient` facade used by UI layers
//! - `poller`: background latest-message polling (`PollerHandle`)
//!
//! # Usage
//!
//! ```ignore
//! use aichat_core::session::ChatClient;
//!
//! let client = ChatClient::new(backend, SessionSettings::default());
//! let appended = client.send("hello", None).await?;
//! ```

mod client;
pub(crate) mod model;
mod pipeline;
mod poller;

pub use client::ChatClient;
pub use model::{Activity, ActivityGuard, PendingCreate, Session, SessionStatus, SharedSession};
pub use pipeline::SendPipeline;
pub use poller::PollerHandle;
