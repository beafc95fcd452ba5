#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use escola_api::config::AppConfig;
use escola_api::{router, AppState};

pub const JWT_SECRET: &str = "integration-test-secret";

/// In-process API server with its own fallback file and no database.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub fallback_path: PathBuf,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Like `spawn`, with a hook to adjust the config before the server starts.
    pub async fn spawn_with<F: FnOnce(&mut AppConfig)>(customize: F) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let fallback_path = std::env::temp_dir()
            .join(format!("escola-it-{}", uuid::Uuid::new_v4().simple()))
            .join("bd.json");

        let mut config = AppConfig::development();
        config.server.port = port;
        config.server.enable_request_logging = false;
        config.store.database_url = None;
        config.store.fallback_path = fallback_path.clone();
        config.security.jwt_secret = JWT_SECRET.to_string();
        customize(&mut config);

        let app = router(AppState::new(config));
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            port,
            base_url,
            fallback_path,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in with the default identity and return the bearer token.
    pub async fn token(&self) -> Result<String> {
        let res = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "login": "admin", "password": "admin" }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed with {}", res.status());

        let body: Value = res.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn post(&self, path: &str, token: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let res = self.client.post(self.url(path)).bearer_auth(token).json(body).send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn put(&self, path: &str, token: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let res = self.client.put(self.url(path)).bearer_auth(token).json(body).send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.delete(self.url(path)).bearer_auth(token).send().await?;
        Ok((res.status(), res.json().await?))
    }
}

pub fn ana() -> Value {
    json!({
        "id": 1,
        "Nome": "Ana",
        "Apelido": "Silva",
        "Curso": "Informática",
        "Ano_Curricular": "2"
    })
}
