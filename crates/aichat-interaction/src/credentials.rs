//! Credential seam.
//!
//! Credentials are issued and refreshed by an external auth collaborator.
//! The backend asks for the current token on every request and attaches it
//! unchanged; it never stores or refreshes one itself.

use std::sync::{Arc, RwLock};

/// Supplies the bearer token to attach to the next request.
pub trait CredentialSource: Send + Sync {
    /// The current access token, or `None` to send the request unauthenticated.
    fn access_token(&self) -> Option<String>;
}

/// No credential; requests go out without an `Authorization` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CredentialSource for Anonymous {
    fn access_token(&self) -> Option<String> {
        None
    }
}

/// A token slot the auth collaborator can update in place (e.g. after a
/// refresh). Clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct SharedToken {
    token: Arc<RwLock<Option<String>>>,
}

impl SharedToken {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(token)),
        }
    }

    pub fn set(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut slot) => *slot = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}

impl CredentialSource for SharedToken {
    fn access_token(&self) -> Option<String> {
        match self.token.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl<F> CredentialSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn access_token(&self) -> Option<String> {
        self()
    }
}
