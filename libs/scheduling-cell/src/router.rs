// libs/scheduling-cell/src/router.rs
use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::handlers;
use crate::SchedulingState;

pub fn scheduling_routes(state: SchedulingState) -> Router {
    Router::new()
        .route("/availability", post(handlers::create_availability_window))
        .route(
            "/availability/{window_id}",
            put(handlers::update_availability_window),
        )
        .route(
            "/availability/{window_id}/deactivate",
            post(handlers::deactivate_availability_window),
        )
        .route("/availability/slots", get(handlers::get_free_slots))
        .route("/availability/coverage", get(handlers::get_coverage))
        .route("/appointments", post(handlers::book_appointment))
        .route(
            "/appointments/{appointment_id}",
            get(handlers::get_appointment).put(handlers::update_appointment),
        )
        .route(
            "/appointments/{appointment_id}/cancel",
            post(handlers::cancel_appointment),
        )
        .route(
            "/appointments/{appointment_id}/status",
            patch(handlers::change_appointment_status),
        )
        .with_state(state)
}
