//! Integration tests for the widget server

use reqwest::{Client, StatusCode};
use std::time::Duration;

use readme_forge::api::router;
use readme_forge::{CacheConfig, EndpointUrls, MarkdownSynthesizer, Skill, SkillsConfig, WaveConfig};

/// Bind the widget router to a free port and return its base URL
async fn start_test_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(CacheConfig::local_svg())).await;
    });
    format!("http://{}", addr)
}

fn client() -> Client {
    Client::builder().timeout(Duration::from_secs(5)).build().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let base = start_test_server().await;

    let response = client().get(format!("{}/health", base)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_markdown_skills_url_resolves_to_svg() {
    let base = start_test_server().await;
    let synthesizer = MarkdownSynthesizer::new(
        EndpointUrls::new("https://stats.example", "https://streak.example", &base).unwrap(),
    );

    let config = SkillsConfig::new(vec![Skill::new("TypeScript", 85), Skill::new("Rust", 70)]);
    let markdown = synthesizer.synthesize(&config);
    let url = markdown
        .strip_prefix("![Skills](")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap();

    let response = client().get(url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/svg+xml");
    assert_eq!(response.headers()["cache-control"], "public, max-age=600");

    let body = response.text().await.unwrap();
    assert!(body.contains(">TypeScript<"));
    assert!(body.contains(">85%<"));
}

#[tokio::test]
async fn test_wave_endpoint_matches_local_render() {
    let base = start_test_server().await;
    let urls = EndpointUrls::new("https://stats.example", "https://streak.example", &base).unwrap();

    let config = WaveConfig {
        text: Some("Hello".to_string()),
        ..Default::default()
    };
    let url = readme_forge::ImageWidget::image_url(&config, &urls);

    let body = client().get(url).send().await.unwrap().text().await.unwrap();
    assert_eq!(body, readme_forge::SvgWidget::render_svg(&config));
}

#[tokio::test]
async fn test_invalid_skills_are_rejected() {
    let base = start_test_server().await;

    let response = client()
        .get(format!("{}/api/skills?skills=Rust", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "validation");
}
