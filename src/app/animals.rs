use super::{ApiResult, AppState};
use crate::domain::model::{Animal, AnimalDraft, AnimalFilter, AnimalId};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/animals", get(list).post(create))
        .route("/api/animals/{id}", get(fetch).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    filter: Result<Query<AnimalFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Animal>>> {
    let Query(filter) = filter?;
    Ok(Json(state.animals.list(&filter).await?))
}

async fn fetch(
    State(state): State<AppState>,
    id: Result<Path<AnimalId>, PathRejection>,
) -> ApiResult<Json<Animal>> {
    let Path(id) = id?;
    Ok(Json(state.animals.get(id).await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<AnimalDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(draft) = payload?;
    let animal = state.animals.create(draft).await?;
    Ok((StatusCode::CREATED, Json(animal)))
}

async fn update(
    State(state): State<AppState>,
    id: Result<Path<AnimalId>, PathRejection>,
    payload: Result<Json<AnimalDraft>, JsonRejection>,
) -> ApiResult<Json<Animal>> {
    let Path(id) = id?;
    let Json(draft) = payload?;
    Ok(Json(state.animals.update(id, draft).await?))
}

async fn remove(
    State(state): State<AppState>,
    id: Result<Path<AnimalId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.animals.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
