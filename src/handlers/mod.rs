pub mod login;
pub mod resources;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::config::AppConfig;
use crate::database::models::{Course, Student};
use crate::state::AppState;

pub use resources::resource;

/// Full application router: public endpoints plus one CRUD resource per entity.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/login", post(login::login))
        .merge(resource::<Student>(&state))
        .merge(resource::<Course>(&state))
        .layer(cors_layer(&state.config))
        .with_state(state.clone());

    if state.config.server.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    app
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.is_development() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "Escola API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": ["/login"],
            "alunos": ["/alunos", "/alunos/:id"],
            "cursos": ["/cursos", "/cursos/:id"]
        }
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let mode = state.store.mode().await;
    Json(json!({
        "status": "ok",
        "store": mode,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
