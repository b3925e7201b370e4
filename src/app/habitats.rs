use super::{ApiResult, AppState};
use crate::domain::model::{Habitat, HabitatDraft, HabitatFilter, HabitatId};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/habitats", get(list).post(create))
        .route("/api/habitats/{id}", get(fetch).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    filter: Result<Query<HabitatFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Habitat>>> {
    let Query(filter) = filter?;
    Ok(Json(state.directory.list_habitats(&filter).await?))
}

async fn fetch(
    State(state): State<AppState>,
    id: Result<Path<HabitatId>, PathRejection>,
) -> ApiResult<Json<Habitat>> {
    let Path(id) = id?;
    Ok(Json(state.directory.get_habitat(id).await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<HabitatDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(draft) = payload?;
    let habitat = state.directory.create_habitat(draft).await?;
    Ok((StatusCode::CREATED, Json(habitat)))
}

/// Lowering capacity below the current head count is rejected.
async fn update(
    State(state): State<AppState>,
    id: Result<Path<HabitatId>, PathRejection>,
    payload: Result<Json<HabitatDraft>, JsonRejection>,
) -> ApiResult<Json<Habitat>> {
    let Path(id) = id?;
    let Json(draft) = payload?;
    Ok(Json(state.directory.update_habitat(id, draft).await?))
}

async fn remove(
    State(state): State<AppState>,
    id: Result<Path<HabitatId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.directory.delete_habitat(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
