//! Runs against a real Postgres when `TEST_DATABASE_URL` is set; skipped otherwise.
//! The database's `alunos` and `cursos` tables are wiped by these tests.

mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use escola_api::config::AppConfig;
use escola_api::database::{DataStore, FallbackDocument, SeedReport, StoreMode};

fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL") {
        Ok(url) if !url.is_empty() => Some(url),
        _ => {
            eprintln!("TEST_DATABASE_URL not set; skipping primary store test");
            None
        }
    }
}

fn primary_store(url: &str) -> DataStore {
    let mut config = AppConfig::development().store;
    config.database_url = Some(url.to_string());
    config.fallback_path = std::env::temp_dir()
        .join(format!("escola-seed-{}", uuid::Uuid::new_v4().simple()))
        .join("bd.json");
    DataStore::from_config(&config)
}

async fn read_mirror(server: &common::TestServer) -> Result<Value> {
    Ok(serde_json::from_slice(&tokio::fs::read(&server.fallback_path).await?)?)
}

// One test body so the shared tables are never touched by two tests at once.
#[tokio::test]
async fn primary_store_serves_writes_and_mirrors_them() -> Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };

    let store = primary_store(&url);
    assert_eq!(store.mode().await, StoreMode::Primary);
    let report = store.seed(&FallbackDocument::default()).await?;
    assert_eq!(report, SeedReport { alunos: 0, cursos: 0 });

    let server = common::TestServer::spawn_with(|config| {
        config.store.database_url = Some(url.clone());
        config.store.mirror_writes = true;
    })
    .await?;
    let token = server.token().await?;

    let (_, health) = server.get("/health").await?;
    assert_eq!(health["store"], "primary");

    // create, then duplicate
    let (status, created) = server.post("/alunos", &token, &common::ana()).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created, common::ana());
    assert_eq!(read_mirror(&server).await?["alunos"], json!([common::ana()]));

    let (status, body) = server.post("/alunos", &token, &common::ana()).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Aluno com ID 1 já existe.");

    // partial update keeps the id and untouched fields
    let (status, updated) = server
        .put("/alunos/1", &token, &json!({ "id": 9, "Curso": "Gestão" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["Nome"], "Ana");
    assert_eq!(updated["Curso"], "Gestão");
    assert_eq!(read_mirror(&server).await?["alunos"], json!([updated]));

    let (_, list) = server.get("/alunos").await?;
    assert_eq!(list, json!([updated]));

    // missing ids
    let (status, body) = server.put("/alunos/5", &token, &json!({ "Nome": "Rui" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Aluno não encontrado.");
    let (status, _) = server.delete("/alunos/5", &token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.delete("/alunos/1", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read_mirror(&server).await?["alunos"], json!([]));
    let (_, list) = server.get("/alunos").await?;
    assert_eq!(list, json!([]));

    // seeding replaces both tables in one go
    let document = FallbackDocument::from_slice(
        json!({
            "alunos": [common::ana()],
            "cursos": [
                { "id": 1, "Nome": "Informática", "Sigla": "INF" },
                { "id": 2, "Nome": "Gestão", "Sigla": "GES" }
            ]
        })
        .to_string()
        .as_bytes(),
    )?;
    let report = store.seed(&document).await?;
    assert_eq!(report, SeedReport { alunos: 1, cursos: 2 });

    let (_, alunos) = server.get("/alunos").await?;
    assert_eq!(alunos, json!([common::ana()]));
    let (_, cursos) = server.get("/cursos").await?;
    assert_eq!(cursos.as_array().map(Vec::len), Some(2));

    store.seed(&FallbackDocument::default()).await?;
    store.close().await;
    Ok(())
}
