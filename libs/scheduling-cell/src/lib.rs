pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

use std::sync::Arc;

use directory_cell::store::DirectoryStore;

use services::availability::AvailabilityService;
use services::booking::{BookingLocks, BookingService};
use store::{AppointmentStore, InMemoryAppointmentStore, InMemoryWindowStore, WindowStore};

/// Shared state for the scheduling cell: both stores, the directory the
/// booking rules consult, and the per-(professional, date) lock registry.
#[derive(Clone)]
pub struct SchedulingState {
    pub windows: Arc<dyn WindowStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub directory: Arc<dyn DirectoryStore>,
    pub locks: Arc<BookingLocks>,
}

impl SchedulingState {
    pub fn in_memory(directory: Arc<dyn DirectoryStore>) -> Self {
        Self {
            windows: Arc::new(InMemoryWindowStore::new()),
            appointments: Arc::new(InMemoryAppointmentStore::new()),
            directory,
            locks: Arc::new(BookingLocks::new()),
        }
    }

    pub fn availability(&self) -> AvailabilityService {
        AvailabilityService::new(
            Arc::clone(&self.windows),
            Arc::clone(&self.appointments),
            Arc::clone(&self.directory),
        )
    }

    pub fn booking(&self) -> BookingService {
        BookingService::new(
            Arc::clone(&self.appointments),
            Arc::clone(&self.directory),
            self.availability(),
            Arc::clone(&self.locks),
        )
    }
}
