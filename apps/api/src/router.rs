use std::sync::Arc;

use axum::{routing::get, Router};

use directory_cell::router::directory_routes;
use directory_cell::store::{DirectoryStore, InMemoryDirectoryStore};
use scheduling_cell::router::scheduling_routes;
use scheduling_cell::SchedulingState;

pub fn create_router() -> Router {
    // The scheduling cell validates against the same directory the
    // directory routes write to.
    let directory: Arc<dyn DirectoryStore> = Arc::new(InMemoryDirectoryStore::new());
    let scheduling = SchedulingState::in_memory(Arc::clone(&directory));

    Router::new()
        .route("/", get(|| async { "Clinic Scheduling API is running!" }))
        .merge(directory_routes(directory))
        .merge(scheduling_routes(scheduling))
}
