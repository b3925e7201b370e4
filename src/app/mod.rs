//! HTTP surface: JSON routes over the reconciler and the directory.

pub mod animals;
pub mod error;
pub mod feeding_plans;
pub mod habitats;
pub mod keepers;
pub mod vets;

use crate::adapters::{Mailer, SqliteStore};
use crate::core::directory::SanctuaryDirectory;
use crate::core::locks::HabitatLocks;
use crate::core::notification::NotificationDispatcher;
use crate::core::reconciler::AnimalReconciler;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub use error::{ApiError, ErrorBody};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct AppState {
    pub animals: Arc<AnimalReconciler<SqliteStore, Mailer>>,
    pub directory: Arc<SanctuaryDirectory<SqliteStore>>,
}

impl AppState {
    /// Both services share one set of habitat locks so that capacity
    /// changes and animal moves serialize against each other.
    pub fn new(store: SqliteStore, mailer: Mailer, notify_timeout: Duration) -> Self {
        let store = Arc::new(store);
        let locks = HabitatLocks::new();
        let dispatcher = NotificationDispatcher::new(mailer, notify_timeout);

        Self {
            animals: Arc::new(AnimalReconciler::new(
                Arc::clone(&store),
                dispatcher,
                locks.clone(),
            )),
            directory: Arc::new(SanctuaryDirectory::new(store, locks)),
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(animals::routes())
        .merge(keepers::routes())
        .merge(habitats::routes())
        .merge(vets::routes())
        .merge(feeding_plans::routes())
        .with_state(state)
}
