use aichat_core::backend::{ChatBackend, NewMessage, SendReply};
use aichat_core::config::SessionSettings;
use aichat_core::conversation::ConversationId;
use aichat_core::error::{ChatError, NetworkError};
use aichat_core::message::{MessageId, Sender};
use aichat_core::session::ChatClient;
use aichat_interaction::{Anonymous, ClientConfig, RestChatBackend, SharedToken};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PREFIX: &str = "/aiassistant";

fn backend(server: &MockServer) -> RestChatBackend {
    RestChatBackend::new(format!("{}{}/", server.uri(), PREFIX), Arc::new(Anonymous))
}

fn message_json(id: i64, conversation: i64, sender: &str, content: &str, second: u32) -> Value {
    json!({
        "id": id,
        "conversation": conversation,
        "sender": sender,
        "content": content,
        "created_at": format!("2025-03-01T10:00:{:02}.000000Z", second),
    })
}

fn conversation_json(id: i64) -> Value {
    json!({
        "id": id,
        "title": "",
        "created_at": "2025-03-01T10:00:00Z",
        "messages": [],
    })
}

#[tokio::test]
async fn test_list_messages_queries_by_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/messages/", PREFIX)))
        .and(query_param("conversation", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            message_json(1, 12, "user", "hi", 1),
            message_json(2, 12, "assistant", "hello", 2),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let messages = backend(&server).list_messages(ConversationId(12)).await.unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, Some(MessageId(1)));
    assert_eq!(messages[1].sender, Sender::Assistant);
}

#[tokio::test]
async fn test_bearer_token_is_read_per_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/conversations/", PREFIX)))
        .and(header("authorization", "Bearer second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([conversation_json(3)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/conversations/", PREFIX)))
        .respond_with(ResponseTemplate::new(401).set_body_string("missing token"))
        .mount(&server)
        .await;

    let token = SharedToken::new(Some("first".to_string()));
    let backend = RestChatBackend::new(format!("{}{}", server.uri(), PREFIX), Arc::new(token.clone()));

    let err = backend.list_conversations().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    token.set(Some("second".to_string()));
    let conversations = backend.list_conversations().await.unwrap();
    assert_eq!(conversations[0].id, ConversationId(3));
}

#[tokio::test]
async fn test_create_conversation_posts_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/conversations/", PREFIX)))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(201).set_body_json(conversation_json(44)))
        .expect(1)
        .mount(&server)
        .await;

    let conversation = backend(&server).create_conversation().await.unwrap();

    assert_eq!(conversation.id, ConversationId(44));
}

#[tokio::test]
async fn test_send_message_decodes_single_and_pair() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/messages/", PREFIX)))
        .and(body_json(json!({"content": "one", "conversation": 5})))
        .respond_with(ResponseTemplate::new(201).set_body_json(message_json(9, 5, "assistant", "reply", 3)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/messages/", PREFIX)))
        .and(body_json(json!({"content": "two", "conversation": 5})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            message_json(10, 5, "user", "two", 4),
            message_json(11, 5, "assistant", "reply two", 5),
        ])))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let single = backend
        .send_message(&NewMessage {
            content: "one".to_string(),
            conversation_id: ConversationId(5),
        })
        .await
        .unwrap();
    let pair = backend
        .send_message(&NewMessage {
            content: "two".to_string(),
            conversation_id: ConversationId(5),
        })
        .await
        .unwrap();

    assert!(matches!(single, SendReply::Single(ref m) if m.content == "reply"));
    assert!(matches!(pair, SendReply::Pair(ref user, _) if user.sender == Sender::User));
}

#[tokio::test]
async fn test_latest_message_handles_empty_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/conversations/1/latest-message/", PREFIX)))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/conversations/2/latest-message/", PREFIX)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "", "conversation": null})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/conversations/3/latest-message/", PREFIX)))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_json(30, 3, "assistant", "latest", 9)))
        .mount(&server)
        .await;

    let backend = backend(&server);

    assert_eq!(backend.latest_message(ConversationId(1)).await.unwrap(), None);
    assert_eq!(backend.latest_message(ConversationId(2)).await.unwrap(), None);
    let latest = backend.latest_message(ConversationId(3)).await.unwrap().unwrap();
    assert_eq!(latest.content, "latest");
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/conversations/", PREFIX)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = backend(&server).list_conversations().await.unwrap_err();

    assert!(matches!(err, NetworkError::Decode(_)));
}

#[tokio::test]
async fn test_from_config_uses_static_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/conversations/", PREFIX)))
        .and(header("authorization", "Bearer from-config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig {
        api_url: format!("{}{}", server.uri(), PREFIX),
        access_token: Some("from-config".to_string()),
        ..ClientConfig::default()
    };

    let conversations = RestChatBackend::from_config(&config).list_conversations().await.unwrap();
    assert!(conversations.is_empty());
}

#[tokio::test]
async fn test_first_send_creates_once_then_posts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/conversations/", PREFIX)))
        .respond_with(ResponseTemplate::new(201).set_body_json(conversation_json(77)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/messages/", PREFIX)))
        .and(body_json(json!({"content": "hello", "conversation": 77})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            message_json(1, 77, "user", "hello", 1),
            message_json(2, 77, "assistant", "Hi! How can I help?", 2),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatClient::new(Arc::new(backend(&server)), SessionSettings::default());

    let appended = client.send("hello", None).await.unwrap();

    assert_eq!(appended.len(), 2);
    let transcript = client.transcript().await;
    assert_eq!(transcript[0].sender, Sender::User);
    assert_eq!(transcript[0].content, "hello");
    assert_eq!(transcript[1].sender, Sender::Assistant);
    assert_eq!(client.active_conversation_id().await, Some(ConversationId(77)));
}

#[tokio::test]
async fn test_failed_post_surfaces_send_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/messages/", PREFIX)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "Message cannot be empty."})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatClient::new(Arc::new(backend(&server)), SessionSettings::default());

    let err = client.send("hi", Some(ConversationId(8))).await.unwrap_err();

    assert!(matches!(err, ChatError::SendFailed(NetworkError::Status { status: 400, .. })));
    assert!(client.transcript().await.is_empty());
    assert_eq!(client.last_error().await, Some(err));
}
