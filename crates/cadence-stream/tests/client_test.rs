use cadence_stream::{decode_chunks, GenerationClient, HttpGenerationClient};
use cadence_types::{GenerationRequest, OutboundMessage, Role, StreamEvent};
use futures::StreamExt;
use mockito::Matcher;

fn request() -> GenerationRequest {
    GenerationRequest::new(
        "chat-42",
        vec![OutboundMessage {
            role: Role::User,
            content: "hello".to_string(),
        }],
    )
}

#[tokio::test]
async fn test_posts_history_and_streams_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_header("accept", "text/plain")
        .match_body(Matcher::Json(serde_json::json!({
            "messages": [{"role": "user", "content": "hello"}],
            "chat_id": "chat-42"
        })))
        .with_status(200)
        .with_header("content-type", "text/plain; charset=utf-8")
        .with_body("0:{\"type\":\"status\",\"content\":\"thinking\"}\n0:{\"type\":\"text\",\"content\":\"Hi\"}\n")
        .create_async()
        .await;

    let client = HttpGenerationClient::new(format!("{}/api/", server.url())).unwrap();
    assert!(client.base_url().ends_with("/api"));

    let chunks = client.stream_chat(request()).await.unwrap();
    let mut decoded = decode_chunks(chunks);

    let mut events = Vec::new();
    while let Some(result) = decoded.next().await {
        events.extend(result.unwrap().events().cloned());
    }

    assert_eq!(
        events,
        vec![StreamEvent::status("thinking"), StreamEvent::text("Hi")]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat")
        .with_status(400)
        .with_body("No messages provided")
        .create_async()
        .await;

    let client = HttpGenerationClient::new(server.url()).unwrap();
    let err = match client.stream_chat(request()).await {
        Ok(_) => panic!("expected an error"),
        Err(e) => e.to_string(),
    };

    assert!(err.contains("400"));
    assert!(err.contains("No messages provided"));
}

#[tokio::test]
async fn test_unreachable_service_fails() {
    let client = HttpGenerationClient::new("http://127.0.0.1:1").unwrap();
    assert!(client.stream_chat(request()).await.is_err());
}
