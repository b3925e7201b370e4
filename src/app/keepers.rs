use super::{ApiResult, AppState};
use crate::domain::model::{Keeper, KeeperDraft, KeeperFilter, KeeperId};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/cuidadores", get(list).post(create))
        .route("/api/cuidadores/{id}", get(fetch).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    filter: Result<Query<KeeperFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Keeper>>> {
    let Query(filter) = filter?;
    Ok(Json(state.directory.list_keepers(&filter).await?))
}

async fn fetch(
    State(state): State<AppState>,
    id: Result<Path<KeeperId>, PathRejection>,
) -> ApiResult<Json<Keeper>> {
    let Path(id) = id?;
    Ok(Json(state.directory.get_keeper(id).await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<KeeperDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(draft) = payload?;
    let keeper = state.directory.create_keeper(draft).await?;
    Ok((StatusCode::CREATED, Json(keeper)))
}

async fn update(
    State(state): State<AppState>,
    id: Result<Path<KeeperId>, PathRejection>,
    payload: Result<Json<KeeperDraft>, JsonRejection>,
) -> ApiResult<Json<Keeper>> {
    let Path(id) = id?;
    let Json(draft) = payload?;
    Ok(Json(state.directory.update_keeper(id, draft).await?))
}

async fn remove(
    State(state): State<AppState>,
    id: Result<Path<KeeperId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.directory.delete_keeper(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
