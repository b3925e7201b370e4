use super::{ApiResult, AppState};
use crate::domain::model::{Vet, VetDraft, VetFilter, VetId};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/veterinarios", get(list).post(create))
        .route("/api/veterinarios/{id}", get(fetch).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    filter: Result<Query<VetFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Vet>>> {
    let Query(filter) = filter?;
    Ok(Json(state.directory.list_vets(&filter).await?))
}

async fn fetch(
    State(state): State<AppState>,
    id: Result<Path<VetId>, PathRejection>,
) -> ApiResult<Json<Vet>> {
    let Path(id) = id?;
    Ok(Json(state.directory.get_vet(id).await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<VetDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(draft) = payload?;
    let vet = state.directory.create_vet(draft).await?;
    Ok((StatusCode::CREATED, Json(vet)))
}

async fn update(
    State(state): State<AppState>,
    id: Result<Path<VetId>, PathRejection>,
    payload: Result<Json<VetDraft>, JsonRejection>,
) -> ApiResult<Json<Vet>> {
    let Path(id) = id?;
    let Json(draft) = payload?;
    Ok(Json(state.directory.update_vet(id, draft).await?))
}

async fn remove(
    State(state): State<AppState>,
    id: Result<Path<VetId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.directory.delete_vet(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
