use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{credentials_match, generate_jwt};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub expires_in: i64,
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let security = &state.config.security;

    if !credentials_match(security, &request.login, &request.password) {
        warn!("Failed login attempt for '{}'", request.login);
        return Err(ApiError::unauthorized("Login ou senha incorretos"));
    }

    let (token, expires_in) = generate_jwt(&request.login, security).map_err(|e| {
        tracing::error!("Token generation failed: {}", e);
        ApiError::internal_server_error("Erro interno do servidor.")
    })?;

    info!("Login succeeded for '{}'", request.login);
    Ok(ApiResponse::success(LoginResponse {
        message: "Login bem-sucedido",
        token,
        expires_in,
    }))
}
