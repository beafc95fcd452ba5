use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Identity attached to requests that passed the token check
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub login: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self { login: claims.sub }
    }
}

/// Guards mutating routes: no bearer token is 401, a bad one is 403.
pub async fn require_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(|msg| ApiError::unauthorized(msg))?;

    let claims = validate_jwt(token, state.jwt_secret()).map_err(|e| {
        debug!("Rejected token on {} {}: {}", request.method(), request.uri().path(), e);
        ApiError::forbidden("Token inválido ou expirado.")
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_str = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Token de acesso não fornecido.")?
        .to_str()
        .map_err(|_| "Cabeçalho Authorization inválido.")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err("Token de acesso não fornecido."),
    }
}
