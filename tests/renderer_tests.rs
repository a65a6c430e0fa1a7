use std::time::Duration;

use rufus::error::FetchError;
use rufus::models::{RenderOutcome, RendererConfig};
use rufus::services::{HttpRenderer, RenderContext, Renderer};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

#[tokio::test]
async fn test_renders_page_over_http() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/menu"))
        .and(header("user-agent", "Rufus Web Scraper 1.0"))
        .respond_with(html(&format!(
            r#"<html>
            <head><title>Burger Menu</title></head>
            <body>
                <nav><a href="/">Home</a></nav>
                <main>
                    <h1>Burgers</h1>
                    <p>{}</p>
                    <a href="/fries">Fries</a>
                </main>
            </body>
            </html>"#,
            "Flame grilled and served with pickles. ".repeat(5)
        )))
        .mount(&mock_server)
        .await;

    let renderer = HttpRenderer::new(RendererConfig::default()).unwrap();
    let mut context = renderer.open().await.unwrap();
    let outcome = context
        .load(&format!("{}/menu", mock_server.uri()), TIMEOUT)
        .await;
    context.close().await;

    let RenderOutcome::Fetched(page) = outcome else {
        panic!("expected a page, got {outcome:?}");
    };
    assert_eq!(page.title, "Burger Menu");
    assert!(page.content.starts_with("Burgers\nFlame grilled"));
    assert!(page.content.ends_with("Fries"));
    assert!(!page.content.contains("Home"));
    assert_eq!(page.links, vec!["/", "/fries"]);
}

#[tokio::test]
async fn test_error_status_is_a_fetch_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let renderer = HttpRenderer::new(RendererConfig::default()).unwrap();
    let mut context = renderer.open().await.unwrap();
    let url = format!("{}/missing", mock_server.uri());

    assert_eq!(
        context.load(&url, TIMEOUT).await,
        RenderOutcome::Failed(FetchError::Status { url, status: 404 })
    );
}

#[tokio::test]
async fn test_short_error_page_is_invalid() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(
            "<html><body><h1>Sorry, this page is unavailable</h1></body></html>",
        ))
        .mount(&mock_server)
        .await;

    let renderer = HttpRenderer::new(RendererConfig::default()).unwrap();
    let mut context = renderer.open().await.unwrap();

    assert_eq!(
        context.load(&mock_server.uri(), TIMEOUT).await,
        RenderOutcome::Invalid
    );
}

#[tokio::test]
async fn test_non_html_content_is_unsupported() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4".to_vec()),
        )
        .mount(&mock_server)
        .await;

    let renderer = HttpRenderer::new(RendererConfig::default()).unwrap();
    let mut context = renderer.open().await.unwrap();

    assert!(matches!(
        context.load(&mock_server.uri(), TIMEOUT).await,
        RenderOutcome::Failed(FetchError::Unsupported { content_type, .. }) if content_type == "application/pdf"
    ));
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<html><body>late</body></html>").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let renderer = HttpRenderer::new(RendererConfig::default()).unwrap();
    let mut context = renderer.open().await.unwrap();
    let outcome = context
        .load(&mock_server.uri(), Duration::from_millis(200))
        .await;

    assert!(matches!(
        outcome,
        RenderOutcome::Failed(FetchError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_closed_context_refuses_loads() {
    let renderer = HttpRenderer::new(RendererConfig::default()).unwrap();
    let mut context = renderer.open().await.unwrap();
    context.close().await;

    assert!(matches!(
        context.load("http://127.0.0.1:1/", TIMEOUT).await,
        RenderOutcome::Failed(FetchError::Network { .. })
    ));
}

#[test]
fn test_invalid_selector_rejected() {
    let config = RendererConfig {
        excluded_selectors: vec!["nav".into(), "::bad(".into()],
        ..RendererConfig::default()
    };
    assert!(HttpRenderer::new(config).is_err());
}
