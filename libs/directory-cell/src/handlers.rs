// libs/directory-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::StoreError;

use crate::models::{Patient, Professional, RegisterPatientRequest, RegisterProfessionalRequest};
use crate::store::DirectoryStore;

fn store_fault(e: StoreError) -> AppError {
    AppError::Internal(e.to_string())
}

#[axum::debug_handler]
pub async fn register_professional(
    State(store): State<Arc<dyn DirectoryStore>>,
    Json(request): Json<RegisterProfessionalRequest>,
) -> Result<Json<Value>, AppError> {
    if request.full_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "The professional's name is required".to_string(),
        ));
    }

    let now = Utc::now();
    let professional = Professional {
        id: Uuid::new_v4(),
        full_name: request.full_name.trim().to_string(),
        specialty: request.specialty,
        active: true,
        created_at: now,
        updated_at: now,
    };

    store
        .insert_professional(professional.clone())
        .await
        .map_err(store_fault)?;

    info!("Professional {} registered", professional.id);
    Ok(Json(json!({
        "success": true,
        "message": "Professional registered successfully",
        "professional_id": professional.id
    })))
}

#[axum::debug_handler]
pub async fn get_professional(
    State(store): State<Arc<dyn DirectoryStore>>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    debug!("Fetching professional {}", professional_id);

    let professional = store
        .professional(professional_id)
        .await
        .map_err(store_fault)?
        .ok_or_else(|| AppError::NotFound("The professional does not exist".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "professional": professional
    })))
}

#[axum::debug_handler]
pub async fn deactivate_professional(
    State(store): State<Arc<dyn DirectoryStore>>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let mut professional = store
        .professional(professional_id)
        .await
        .map_err(store_fault)?
        .ok_or_else(|| AppError::NotFound("The professional does not exist".to_string()))?;

    if !professional.active {
        return Err(AppError::BadRequest(
            "The professional is already inactive".to_string(),
        ));
    }

    professional.active = false;
    professional.updated_at = Utc::now();
    store
        .save_professional(professional)
        .await
        .map_err(store_fault)?;

    info!("Professional {} deactivated", professional_id);
    Ok(Json(json!({
        "success": true,
        "message": "Professional deactivated successfully"
    })))
}

#[axum::debug_handler]
pub async fn register_patient(
    State(store): State<Arc<dyn DirectoryStore>>,
    Json(request): Json<RegisterPatientRequest>,
) -> Result<Json<Value>, AppError> {
    if request.full_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "The patient's name is required".to_string(),
        ));
    }

    let now = Utc::now();
    let patient = Patient {
        id: Uuid::new_v4(),
        full_name: request.full_name.trim().to_string(),
        active: true,
        created_at: now,
        updated_at: now,
    };

    store
        .insert_patient(patient.clone())
        .await
        .map_err(store_fault)?;

    info!("Patient {} registered", patient.id);
    Ok(Json(json!({
        "success": true,
        "message": "Patient registered successfully",
        "patient_id": patient.id
    })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(store): State<Arc<dyn DirectoryStore>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    debug!("Fetching patient {}", patient_id);

    let patient = store
        .patient(patient_id)
        .await
        .map_err(store_fault)?
        .ok_or_else(|| AppError::NotFound("The patient does not exist".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "patient": patient
    })))
}

#[axum::debug_handler]
pub async fn deactivate_patient(
    State(store): State<Arc<dyn DirectoryStore>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let mut patient = store
        .patient(patient_id)
        .await
        .map_err(store_fault)?
        .ok_or_else(|| AppError::NotFound("The patient does not exist".to_string()))?;

    if !patient.active {
        return Err(AppError::BadRequest(
            "The patient is already inactive".to_string(),
        ));
    }

    patient.active = false;
    patient.updated_at = Utc::now();
    store.save_patient(patient).await.map_err(store_fault)?;

    info!("Patient {} deactivated", patient_id);
    Ok(Json(json!({
        "success": true,
        "message": "Patient deactivated successfully"
    })))
}
