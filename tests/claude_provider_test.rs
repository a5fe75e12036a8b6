// Wire-level tests for the Claude provider against a local mock server.

use tenet::providers::{ClaudeGenerator, GenerationRequest, Message, TextGenerator};

#[tokio::test]
async fn test_generate_extracts_text_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "test-key")
        .match_header("anthropic-version", "2023-06-01")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "model": "claude-sonnet-4-20250514",
                "content": [{"type": "text", "text": "Hello from the mock"}],
                "stop_reason": "end_turn"
            }"#,
        )
        .create_async()
        .await;

    let generator = ClaudeGenerator::new("test-key".to_string())
        .unwrap()
        .with_base_url(server.url());

    let request = GenerationRequest::new(vec![Message::user("Hi")])
        .with_system("You are a helpful assistant")
        .with_max_tokens(256);

    let text = generator.generate(&request).await.unwrap();
    assert_eq!(text, "Hello from the mock");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_request_body_carries_model_and_system() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "model": "claude-test-model",
            "max_tokens": 128,
            "system": "be brief",
            "messages": [{"role": "user", "content": "Hi"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"content": [{"type": "text", "text": "ok"}]}"#)
        .create_async()
        .await;

    let generator = ClaudeGenerator::new("test-key".to_string())
        .unwrap()
        .with_base_url(server.url());

    let request = GenerationRequest::new(vec![Message::user("Hi")])
        .with_model("claude-test-model")
        .with_system("be brief")
        .with_max_tokens(128);

    generator.generate(&request).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_api_error_is_retried_then_surfaced() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .with_status(500)
        .with_body(r#"{"error": {"message": "overloaded"}}"#)
        .expect(3)
        .create_async()
        .await;

    let generator = ClaudeGenerator::new("test-key".to_string())
        .unwrap()
        .with_base_url(server.url());

    let request = GenerationRequest::new(vec![Message::user("Hi")]);
    let result = generator.generate(&request).await;

    assert!(result.is_err());
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("500"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_text_blocks_are_ignored() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"content": [
                {"type": "text", "text": "kept"},
                {"type": "tool_use", "id": "t1", "name": "lookup", "input": {}}
            ]}"#,
        )
        .create_async()
        .await;

    let generator = ClaudeGenerator::new("test-key".to_string())
        .unwrap()
        .with_base_url(server.url());

    let request = GenerationRequest::new(vec![Message::user("Hi")]);
    let text = generator.generate(&request).await.unwrap();
    assert_eq!(text, "kept");
}
