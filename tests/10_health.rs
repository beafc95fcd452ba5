mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_reports_fallback_mode_without_database() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, body) = server.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "fallback");

    Ok(())
}

#[tokio::test]
async fn root_lists_endpoints() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, body) = server.get("/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Escola API");
    assert!(body["endpoints"]["alunos"].is_array());

    Ok(())
}
