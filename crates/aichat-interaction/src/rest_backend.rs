//! RestChatBackend - REST implementation of the chat backend contract.
//!
//! Endpoints are relative to the configured base URL:
//!
//! | Operation | Request |
//! |---|---|
//! | List conversations | GET `/conversations/` |
//! | List messages | GET `/messages/?conversation={id}` |
//! | Create conversation | POST `/conversations/` with `{}` |
//! | Send message | POST `/messages/` with `{content, conversation}` |
//! | Poll latest reply | GET `/conversations/{id}/latest-message/` |

use crate::config::ClientConfig;
use crate::credentials::{Anonymous, CredentialSource, SharedToken};
use aichat_core::backend::{ChatBackend, NewMessage, SendReply};
use aichat_core::conversation::{Conversation, ConversationId};
use aichat_core::error::NetworkError;
use aichat_core::message::Message;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A message post answers with either one message or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SendResponse {
    One(Message),
    Many(Vec<Message>),
}

impl From<SendResponse> for SendReply {
    fn from(response: SendResponse) -> Self {
        match response {
            SendResponse::One(message) => SendReply::Single(message),
            SendResponse::Many(messages) => SendReply::from_messages(messages),
        }
    }
}

/// Chat backend speaking the assistant's REST API.
#[derive(Clone)]
pub struct RestChatBackend {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
    timeout: Duration,
}

impl RestChatBackend {
    /// Creates a backend for `base_url` (e.g. `http://host/aiassistant`).
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialSource>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            credentials,
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builds a backend from loaded configuration. A configured static token
    /// is used as the credential; otherwise requests are anonymous.
    pub fn from_config(config: &ClientConfig) -> Self {
        let credentials: Arc<dyn CredentialSource> = match &config.access_token {
            Some(token) => Arc::new(SharedToken::new(Some(token.clone()))),
            None => Arc::new(Anonymous),
        };
        Self::new(config.base_url(), credentials).with_timeout(config.request_timeout())
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Uses a preconfigured reqwest client (proxies, TLS roots, ...).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the Accept header and whatever credential is current.
    /// `Content-Type` comes from `RequestBuilder::json` on bodies.
    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header(ACCEPT, "application/json")
            .timeout(self.timeout);

        match self.credentials.access_token() {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, NetworkError> {
        let response = self
            .prepare(request)
            .send()
            .await
            .map_err(|e| NetworkError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!(status = status.as_u16(), %body, "Backend rejected request");
            return Err(NetworkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, NetworkError> {
        let response = self.execute(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| NetworkError::transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(NetworkError::from)
    }
}

#[async_trait]
impl ChatBackend for RestChatBackend {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, NetworkError> {
        self.json(self.client.get(self.url("/conversations/"))).await
    }

    async fn list_messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>, NetworkError> {
        let request = self
            .client
            .get(self.url("/messages/"))
            .query(&[("conversation", conversation_id.to_string())]);
        self.json(request).await
    }

    async fn create_conversation(&self) -> Result<Conversation, NetworkError> {
        let request = self
            .client
            .post(self.url("/conversations/"))
            .json(&serde_json::json!({}));
        let conversation: Conversation = self.json(request).await?;
        tracing::debug!(conversation = %conversation.id, "Backend created conversation");
        Ok(conversation)
    }

    async fn send_message(&self, message: &NewMessage) -> Result<SendReply, NetworkError> {
        let request = self.client.post(self.url("/messages/")).json(message);
        let response: SendResponse = self.json(request).await?;
        Ok(response.into())
    }

    async fn latest_message(&self, conversation_id: ConversationId) -> Result<Option<Message>, NetworkError> {
        let path = format!("/conversations/{}/latest-message/", conversation_id);
        let body: Value = self.json(self.client.get(self.url(&path))).await?;
        // An empty conversation serializes as null or as a blank message.
        match body {
            Value::Null => Ok(None),
            Value::Object(ref fields) if fields.get("created_at").is_none_or(Value::is_null) => Ok(None),
            body => serde_json::from_value(body).map(Some).map_err(NetworkError::from),
        }
    }
}
