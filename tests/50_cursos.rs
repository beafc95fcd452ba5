mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn deleting_a_course_that_never_existed_is_not_found() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.token().await?;

    let (status, body) = server.delete("/cursos/999", &token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Curso não encontrado.");
    assert_eq!(body["success"], false);

    Ok(())
}

#[tokio::test]
async fn missing_course_ids_leave_the_list_unchanged() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.token().await?;

    let informatica = json!({ "id": 1, "Nome": "Informática", "Sigla": "INF" });
    server.post("/cursos", &token, &informatica).await?;

    let (status, _) = server.delete("/cursos/999", &token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server.put("/cursos/999", &token, &json!({ "Sigla": "X" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = server.get("/cursos").await?;
    assert_eq!(list, json!([informatica]));

    Ok(())
}

#[tokio::test]
async fn courses_round_trip_in_id_order() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.token().await?;

    let gestao = json!({ "id": 2, "Nome": "Gestão", "Sigla": "GES" });
    let informatica = json!({ "id": "1", "Nome": "Informática", "Sigla": "INF" });

    let (status, _) = server.post("/cursos", &token, &gestao).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, created) = server.post("/cursos", &token, &informatica).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);

    let (_, list) = server.get("/cursos").await?;
    let ids: Vec<i64> = list
        .as_array()
        .map(|items| items.iter().filter_map(|c| c["id"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec![1, 2]);

    let (status, updated) = server.put("/cursos/2", &token, &json!({ "Sigla": "GE" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated, json!({ "id": 2, "Nome": "Gestão", "Sigla": "GE" }));

    let (status, conflict) = server.post("/cursos", &token, &gestao).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["error"], "Curso com ID 2 já existe.");

    Ok(())
}
