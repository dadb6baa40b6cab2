// libs/directory-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::store::DirectoryStore;

pub fn directory_routes(store: Arc<dyn DirectoryStore>) -> Router {
    Router::new()
        .route("/professionals", post(handlers::register_professional))
        .route("/professionals/{professional_id}", get(handlers::get_professional))
        .route(
            "/professionals/{professional_id}/deactivate",
            post(handlers::deactivate_professional),
        )
        .route("/patients", post(handlers::register_patient))
        .route("/patients/{patient_id}", get(handlers::get_patient))
        .route(
            "/patients/{patient_id}/deactivate",
            post(handlers::deactivate_patient),
        )
        .with_state(store)
}
