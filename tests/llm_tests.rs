use rufus::models::LlmConfig;
use rufus::services::{
    ChatClient, KeywordExtractor, LlmKeywordExtractor, LlmSummarizer, Summarizer,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, chunk_size: usize) -> ChatClient {
    let config = LlmConfig {
        api_base: format!("{}/v1", server.uri()),
        model: "test-model".into(),
        chunk_size,
        ..LlmConfig::default()
    };
    ChatClient::new(config, "test-key").unwrap()
}

fn reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

#[tokio::test]
async fn test_model_keywords() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(reply(r#"{"keywords": ["burgers", "menu prices"]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let extractor = LlmKeywordExtractor::new(client(&server, 4000));
    assert_eq!(
        extractor.extract("what burgers are on the menu").await,
        vec!["burgers", "menu prices"]
    );
}

#[tokio::test]
async fn test_keywords_fall_back_when_model_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let extractor = LlmKeywordExtractor::new(client(&server, 4000));
    assert_eq!(
        extractor.extract("burger menu").await,
        vec!["burger menu", "burger", "menu"]
    );
}

#[tokio::test]
async fn test_keywords_fall_back_on_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply(r#"{"keywords": []}"#))
        .mount(&server)
        .await;

    let extractor = LlmKeywordExtractor::new(client(&server, 4000));
    assert_eq!(extractor.extract("fries").await, vec!["fries"]);
}

#[tokio::test]
async fn test_summary_of_chunked_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(reply("- Burgers are grilled\n- Fries are crispy"))
        .expect(2)
        .mount(&server)
        .await;

    let content = format!("{}\n\n{}", "a".repeat(30), "b".repeat(30));
    let digest = LlmSummarizer::new(client(&server, 40))
        .summarize(&content, "Summarize the menu")
        .await;

    assert_eq!(
        digest.summary,
        "- Burgers are grilled\n- Fries are crispy\n\n- Burgers are grilled\n- Fries are crispy"
    );
    assert_eq!(digest.key_points.len(), 4);
    assert_eq!(digest.key_points[0], "Burgers are grilled");

    let requests = server.received_requests().await.unwrap();
    let first: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let user = first["messages"][1]["content"].as_str().unwrap();
    assert!(user.starts_with("Summarize the menu (Content part 1/2)\n\n"));
    assert!(first.get("response_format").is_none());
}

#[tokio::test]
async fn test_failed_chunk_becomes_error_line() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let digest = LlmSummarizer::new(client(&server, 4000))
        .summarize("Some page content about burgers.", "Summarize")
        .await;

    assert!(digest.summary.starts_with("Error processing content:"));
}
