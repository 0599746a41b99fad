//! HTTP side of aichat: the REST backend, its credential seam and client
//! configuration.

pub mod config;
pub mod credentials;
pub mod rest_backend;

pub use config::{ClientConfig, ConfigError};
pub use credentials::{Anonymous, CredentialSource, SharedToken};
pub use rest_backend::RestChatBackend;
