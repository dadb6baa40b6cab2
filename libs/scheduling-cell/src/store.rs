// libs/scheduling-cell/src/store.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_models::StoreError;

use crate::models::{Appointment, AvailabilityWindow};

/// Persistence seam for availability windows. Only the scheduling services
/// write through it; the slot generator reads and never mutates.
#[async_trait]
pub trait WindowStore: Send + Sync {
    async fn insert(&self, window: AvailabilityWindow) -> Result<(), StoreError>;
    async fn save(&self, window: AvailabilityWindow) -> Result<(), StoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<AvailabilityWindow>, StoreError>;
    /// Active windows for one professional on one weekday, any effective range.
    async fn active_for_weekday(
        &self,
        professional_id: Uuid,
        weekday: u8,
    ) -> Result<Vec<AvailabilityWindow>, StoreError>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert(&self, appointment: Appointment) -> Result<(), StoreError>;
    async fn save(&self, appointment: Appointment) -> Result<(), StoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;
    /// All appointments of one professional on one date, any status.
    async fn for_professional_on(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError>;
}

// ==============================================================================
// IN-MEMORY IMPLEMENTATIONS
// ==============================================================================

#[derive(Default)]
pub struct InMemoryWindowStore {
    rows: RwLock<HashMap<Uuid, AvailabilityWindow>>,
}

impl InMemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WindowStore for InMemoryWindowStore {
    async fn insert(&self, window: AvailabilityWindow) -> Result<(), StoreError> {
        self.rows.write().await.insert(window.id, window);
        Ok(())
    }

    async fn save(&self, window: AvailabilityWindow) -> Result<(), StoreError> {
        self.rows.write().await.insert(window.id, window);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<AvailabilityWindow>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn active_for_weekday(
        &self,
        professional_id: Uuid,
        weekday: u8,
    ) -> Result<Vec<AvailabilityWindow>, StoreError> {
        let mut windows: Vec<AvailabilityWindow> = self
            .rows
            .read()
            .await
            .values()
            .filter(|w| w.professional_id == professional_id && w.weekday == weekday && w.active)
            .cloned()
            .collect();
        windows.sort_by_key(|w| w.start_time);
        Ok(windows)
    }
}

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    rows: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert(&self, appointment: Appointment) -> Result<(), StoreError> {
        self.rows.write().await.insert(appointment.id, appointment);
        Ok(())
    }

    async fn save(&self, appointment: Appointment) -> Result<(), StoreError> {
        self.rows.write().await.insert(appointment.id, appointment);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn for_professional_on(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        let mut appointments: Vec<Appointment> = self
            .rows
            .read()
            .await
            .values()
            .filter(|a| a.professional_id == professional_id && a.date == date)
            .cloned()
            .collect();
        appointments.sort_by_key(|a| a.start_time);
        Ok(appointments)
    }
}
