use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

use crate::database::models::{parse_id, parse_patch, Entity};
use crate::database::RecordStore;
use crate::middleware::{require_token, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// CRUD routes for one entity type, mounted at `/{E::COLLECTION}`.
///
/// Reads are public; POST, PUT and DELETE sit behind `require_token`.
pub fn resource<E: Entity>(state: &AppState) -> Router<AppState> {
    let collection = format!("/{}", E::COLLECTION);
    let item = format!("/{}/:id", E::COLLECTION);

    Router::new()
        .route(
            &collection,
            get(list::<E>).merge(
                post(create::<E>)
                    .route_layer(middleware::from_fn_with_state(state.clone(), require_token)),
            ),
        )
        .route(
            &item,
            put(update::<E>)
                .delete(remove::<E>)
                .route_layer(middleware::from_fn_with_state(state.clone(), require_token)),
        )
}

async fn list<E: Entity>(State(state): State<AppState>) -> ApiResult<Vec<E>> {
    let records = state.store.list::<E>().await?;
    Ok(ApiResponse::success(records))
}

async fn create<E: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<E> {
    let Json(body) = payload?;
    let record = E::from_json(body)?;

    let saved = state.store.insert(record).await?;
    info!("{} {} created by {}", E::LABEL, saved.id(), user.login);
    Ok(ApiResponse::created(saved))
}

async fn update<E: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<E> {
    let id = parse_id(&raw_id)?;
    let Json(body) = payload?;
    let patch = parse_patch::<E>(body)?;

    let saved = state.store.update::<E>(id, patch).await?;
    info!("{} {} updated by {}", E::LABEL, id, user.login);
    Ok(ApiResponse::success(saved))
}

async fn remove<E: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(raw_id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&raw_id)?;

    state.store.remove::<E>(id).await?;
    info!("{} {} deleted by {}", E::LABEL, id, user.login);
    Ok(ApiResponse::success(json!({
        "message": format!("{} deletado com sucesso!", E::LABEL)
    })))
}
