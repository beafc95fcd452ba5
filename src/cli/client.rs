use anyhow::Context;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Thin JSON client for the Escola API.
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(server_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        let base = Url::parse(server_url).with_context(|| format!("invalid server URL '{}'", server_url))?;
        let http = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { http, base, token })
    }

    pub fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("invalid path '{}'", path))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        self.send(self.request(Method::GET, path)?).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> anyhow::Result<T> {
        self.send(self.request(Method::POST, path)?.json(body)).await
    }

    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: &Value) -> anyhow::Result<T> {
        self.send(self.request(Method::PUT, path)?.json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        self.send(self.request(Method::DELETE, path)?).await
    }

    fn request(&self, method: Method, path: &str) -> anyhow::Result<RequestBuilder> {
        let builder = self.http.request(method, self.endpoint(path)?);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> anyhow::Result<T> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(anyhow::anyhow!(describe_failure(status, &body)));
        }

        serde_json::from_value(body).context("unexpected response body")
    }
}

fn describe_failure(status: StatusCode, body: &Value) -> String {
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string());

    // Token problems (not bad credentials) are fixed by logging in again.
    let token_problem = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) && message.contains("Token");
    if token_problem {
        format!("{} (HTTP {}). Run `escola login` first.", message, status.as_u16())
    } else {
        format!("{} (HTTP {})", message, status.as_u16())
    }
}
