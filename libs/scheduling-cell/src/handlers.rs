// libs/scheduling-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    BookAppointmentRequest, CancelAppointmentRequest, ChangeStatusRequest, CoverageQuery,
    SlotQuery, UpdateAppointmentRequest, WindowRequest,
};
use crate::SchedulingState;

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[axum::debug_handler]
pub async fn create_availability_window(
    State(state): State<SchedulingState>,
    Json(request): Json<WindowRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let id = state.availability().create_window(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Availability window created successfully",
            "window_id": id
        })),
    ))
}

#[axum::debug_handler]
pub async fn update_availability_window(
    State(state): State<SchedulingState>,
    Path(window_id): Path<Uuid>,
    Json(request): Json<WindowRequest>,
) -> Result<Json<Value>, AppError> {
    state.availability().update_window(window_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Availability window updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn deactivate_availability_window(
    State(state): State<SchedulingState>,
    Path(window_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.availability().deactivate_window(window_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Availability window deactivated successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_free_slots(
    State(state): State<SchedulingState>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    debug!(
        "Slot listing requested for professional {} on {}",
        query.professional_id, query.date
    );

    let slots = state
        .availability()
        .free_slots(query.professional_id, query.date)
        .await?;

    let slots: Vec<String> = slots.iter().map(|s| s.format("%H:%M").to_string()).collect();

    Ok(Json(json!({
        "success": true,
        "professional_id": query.professional_id,
        "date": query.date,
        "slots": slots
    })))
}

#[axum::debug_handler]
pub async fn get_coverage(
    State(state): State<SchedulingState>,
    Query(query): Query<CoverageQuery>,
) -> Result<Json<Value>, AppError> {
    let covered = state
        .availability()
        .is_covered(
            query.professional_id,
            query.date,
            query.start_time,
            query.duration_minutes,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "covered": covered
    })))
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<SchedulingState>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = state.booking().book_appointment(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Appointment booked successfully",
            "appointment": appointment
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking().get_appointment(appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .booking()
        .update_appointment(appointment_id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .booking()
        .cancel_appointment(appointment_id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled successfully"
    })))
}

#[axum::debug_handler]
pub async fn change_appointment_status(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<ChangeStatusRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .booking()
        .change_status(appointment_id, request.status)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment status changed successfully"
    })))
}
