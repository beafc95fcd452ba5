use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Primary database. When absent every operation is served from the fallback file.
    pub database_url: Option<String>,
    pub fallback_path: PathBuf,
    /// Replay successful primary writes into the fallback file.
    pub mirror_writes: bool,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection before treating the database as unreachable.
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// Placeholder single identity accepted by POST /login.
    pub login: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key/value source; `from_env` feeds it the process environment.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("ESCOLA_API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = lookup("API_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Store overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.store.database_url = Some(v).filter(|url| !url.trim().is_empty());
        }
        if let Some(v) = lookup("STORE_FALLBACK_PATH") {
            self.store.fallback_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("STORE_MIRROR_WRITES") {
            self.store.mirror_writes = v.parse().unwrap_or(self.store.mirror_writes);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.store.max_connections = v.parse().unwrap_or(self.store.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.store.connection_timeout = v.parse().unwrap_or(self.store.connection_timeout);
        }

        // Security overrides
        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Some(v) = lookup("AUTH_LOGIN") {
            self.security.login = v;
        }
        if let Some(v) = lookup("AUTH_PASSWORD") {
            self.security.password = v;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                enable_request_logging: true,
            },
            store: StoreConfig {
                database_url: None,
                fallback_path: PathBuf::from("mock-data/bd.json"),
                mirror_writes: false,
                max_connections: 5,
                connection_timeout: 2,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                login: "admin".to_string(),
                password: "admin".to_string(),
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                enable_request_logging: true,
            },
            store: StoreConfig {
                database_url: None,
                fallback_path: PathBuf::from("mock-data/bd.json"),
                mirror_writes: false,
                max_connections: 10,
                connection_timeout: 3,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 8,
                login: "admin".to_string(),
                password: "admin".to_string(),
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                enable_request_logging: false,
            },
            store: StoreConfig {
                database_url: None,
                fallback_path: PathBuf::from("mock-data/bd.json"),
                mirror_writes: false,
                max_connections: 20,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                login: "admin".to_string(),
                password: "admin".to_string(),
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.is_development());
        assert_eq!(config.server.port, 3000);
        assert!(config.store.database_url.is_none());
        assert!(!config.store.mirror_writes);
        assert_eq!(config.security.login, "admin");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.is_development());
        assert!(!config.server.enable_request_logging);
        assert_eq!(config.security.jwt_expiry_hours, 4);
    }

    #[test]
    fn overrides_replace_defaults() {
        let config = AppConfig::development().with_overrides(lookup_from(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/escola"),
            ("STORE_MIRROR_WRITES", "true"),
            ("STORE_FALLBACK_PATH", "/tmp/escola.json"),
            ("SECURITY_CORS_ORIGINS", "https://a.example, https://b.example,"),
        ]));

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.database_url.as_deref(), Some("postgres://localhost/escola"));
        assert!(config.store.mirror_writes);
        assert_eq!(config.store.fallback_path, PathBuf::from("/tmp/escola.json"));
        assert_eq!(config.security.cors_origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn specific_port_wins_and_bad_values_keep_defaults() {
        let config = AppConfig::development().with_overrides(lookup_from(&[
            ("ESCOLA_API_PORT", "4000"),
            ("PORT", "5000"),
            ("JWT_EXPIRY_HOURS", "soon"),
            ("DATABASE_URL", "  "),
        ]));

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.security.jwt_expiry_hours, 24);
        assert!(config.store.database_url.is_none());
    }
}
