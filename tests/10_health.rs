mod common;

use anyhow::Result;
use common::{Binary, TestServer};
use reqwest::StatusCode;

#[tokio::test]
async fn health_reports_unreachable_database() -> Result<()> {
    let server = TestServer::start(Binary::Api).await?;

    let res = reqwest::get(server.url("/health")).await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "error");
    assert_eq!(body["database"], "unreachable");
    Ok(())
}

#[tokio::test]
async fn readiness_fails_without_database() -> Result<()> {
    let server = TestServer::start(Binary::Api).await?;

    let res = reqwest::get(server.url("/ready")).await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["ready"], false);
    Ok(())
}

#[tokio::test]
async fn root_and_metrics_need_no_database() -> Result<()> {
    let server = TestServer::start(Binary::Api).await?;

    let res = reqwest::get(server.url("/")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Portfolio Manager API");

    let res = reqwest::get(server.url("/metrics")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"), "unexpected content type: {content_type}");

    let text = res.text().await?;
    // The earlier GET / (and the readiness probe) were counted
    assert!(text.contains("http_requests_total"), "metrics body: {text}");
    Ok(())
}
