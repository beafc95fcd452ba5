use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Client state persisted between invocations in `env.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server_url: String,
    pub token: Option<String>,
    pub login: Option<String>,
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            login: None,
            logged_in_at: None,
        }
    }
}

impl ClientConfig {
    pub fn set_session(&mut self, login: &str, token: String) {
        self.login = Some(login.to_string());
        self.token = Some(token);
        self.logged_in_at = Some(Utc::now());
    }

    pub fn clear_session(&mut self) {
        self.login = None;
        self.token = None;
        self.logged_in_at = None;
    }

    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let env_file = dir.join("env.json");
        if !env_file.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&env_file)
            .with_context(|| format!("reading {}", env_file.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", env_file.display()))
    }

    pub fn save_to(&self, dir: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(dir)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(dir.join("env.json"), content)?;
        Ok(())
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(custom_dir) = std::env::var("ESCOLA_CLI_CONFIG_DIR") {
        return Ok(PathBuf::from(custom_dir));
    }

    let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
    Ok(PathBuf::from(home).join(".config").join("escola").join("cli"))
}

pub fn load_client_config() -> anyhow::Result<ClientConfig> {
    ClientConfig::load_from(&get_config_dir()?)
}

pub fn save_client_config(config: &ClientConfig) -> anyhow::Result<()> {
    config.save_to(&get_config_dir()?)
}
