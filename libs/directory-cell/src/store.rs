// libs/directory-cell/src/store.rs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_models::StoreError;

use crate::models::{Patient, Professional};

/// Existence and active-flag lookups consumed by the scheduling cell.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn insert_professional(&self, professional: Professional) -> Result<(), StoreError>;
    async fn insert_patient(&self, patient: Patient) -> Result<(), StoreError>;
    async fn save_professional(&self, professional: Professional) -> Result<(), StoreError>;
    async fn save_patient(&self, patient: Patient) -> Result<(), StoreError>;
    async fn professional(&self, id: Uuid) -> Result<Option<Professional>, StoreError>;
    async fn patient(&self, id: Uuid) -> Result<Option<Patient>, StoreError>;
}

#[derive(Default)]
pub struct InMemoryDirectoryStore {
    professionals: RwLock<HashMap<Uuid, Professional>>,
    patients: RwLock<HashMap<Uuid, Patient>>,
}

impl InMemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn insert_professional(&self, professional: Professional) -> Result<(), StoreError> {
        self.professionals
            .write()
            .await
            .insert(professional.id, professional);
        Ok(())
    }

    async fn insert_patient(&self, patient: Patient) -> Result<(), StoreError> {
        self.patients.write().await.insert(patient.id, patient);
        Ok(())
    }

    async fn save_professional(&self, professional: Professional) -> Result<(), StoreError> {
        self.professionals
            .write()
            .await
            .insert(professional.id, professional);
        Ok(())
    }

    async fn save_patient(&self, patient: Patient) -> Result<(), StoreError> {
        self.patients.write().await.insert(patient.id, patient);
        Ok(())
    }

    async fn professional(&self, id: Uuid) -> Result<Option<Professional>, StoreError> {
        Ok(self.professionals.read().await.get(&id).cloned())
    }

    async fn patient(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        Ok(self.patients.read().await.get(&id).cloned())
    }
}
