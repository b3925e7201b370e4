use super::{ApiResult, AppState};
use crate::domain::model::{FeedingPlan, FeedingPlanDraft, FeedingPlanFilter, FeedingPlanId};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/alimentacoes", get(list).post(create))
        .route("/api/alimentacoes/{id}", get(fetch).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    filter: Result<Query<FeedingPlanFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<FeedingPlan>>> {
    let Query(filter) = filter?;
    Ok(Json(state.directory.list_feeding_plans(&filter).await?))
}

async fn fetch(
    State(state): State<AppState>,
    id: Result<Path<FeedingPlanId>, PathRejection>,
) -> ApiResult<Json<FeedingPlan>> {
    let Path(id) = id?;
    Ok(Json(state.directory.get_feeding_plan(id).await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<FeedingPlanDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(draft) = payload?;
    let plan = state.directory.create_feeding_plan(draft).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn update(
    State(state): State<AppState>,
    id: Result<Path<FeedingPlanId>, PathRejection>,
    payload: Result<Json<FeedingPlanDraft>, JsonRejection>,
) -> ApiResult<Json<FeedingPlan>> {
    let Path(id) = id?;
    let Json(draft) = payload?;
    Ok(Json(state.directory.update_feeding_plan(id, draft).await?))
}

async fn remove(
    State(state): State<AppState>,
    id: Result<Path<FeedingPlanId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.directory.delete_feeding_plan(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
