// libs/directory-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A treating professional. Only the fields the scheduling engine needs:
/// identity, a display name and the active flag checked before booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
    pub id: Uuid,
    pub full_name: String,
    pub specialty: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterProfessionalRequest {
    pub full_name: String,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPatientRequest {
    pub full_name: String,
}
