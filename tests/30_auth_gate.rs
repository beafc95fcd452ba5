mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn reads_do_not_need_a_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, body) = server.get("/alunos").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(vec![]));

    Ok(())
}

#[tokio::test]
async fn writes_without_a_token_are_unauthorized() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.post(server.url("/alunos")).json(&common::ana()).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");

    let res = server.client.delete(server.url("/cursos/1")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .put(server.url("/cursos/1"))
        .header("Authorization", "Basic YWRtaW46YWRtaW4=")
        .json(&serde_json::json!({ "Nome": "X" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn garbage_tokens_are_forbidden() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, body) = server.post("/alunos", "not.a.token", &common::ana()).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    // Nothing was written
    let (_, list) = server.get("/alunos").await?;
    assert_eq!(list, Value::Array(vec![]));

    Ok(())
}
