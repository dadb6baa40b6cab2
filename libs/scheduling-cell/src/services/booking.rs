// libs/scheduling-cell/src/services/booking.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use directory_cell::store::DirectoryStore;

use crate::models::{
    closing_time, opening_time, Appointment, AppointmentStatus, BookAppointmentRequest,
    CancelAppointmentRequest, SchedulingError, UpdateAppointmentRequest,
};
use crate::services::availability::AvailabilityService;
use crate::services::overlap::times_overlap;
use crate::services::slots::slot_end;
use crate::store::AppointmentStore;

/// Per-(professional, date) mutex registry. Booking holds the key's lock
/// across the conflict scan and the store write, so two concurrent requests
/// for the same professional and date can never both pass the scan.
#[derive(Default)]
pub struct BookingLocks {
    slots: Mutex<HashMap<(Uuid, NaiveDate), Arc<Mutex<()>>>>,
}

impl BookingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, professional_id: Uuid, date: NaiveDate) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().await;
            // Keys nobody holds or waits on are pruned on each lookup, so the
            // registry stays bounded by live contention, not booking history.
            slots.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(slots.entry((professional_id, date)).or_default())
        };
        slot.lock_owned().await
    }

    pub async fn tracked_keys(&self) -> usize {
        self.slots.lock().await.len()
    }
}

/// Books, reschedules, cancels and transitions appointments, enforcing the
/// mutual-exclusion invariant: no two non-cancelled appointments of the same
/// professional may overlap on the same date.
#[derive(Clone)]
pub struct BookingService {
    appointments: Arc<dyn AppointmentStore>,
    directory: Arc<dyn DirectoryStore>,
    availability: AvailabilityService,
    locks: Arc<BookingLocks>,
}

impl BookingService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        directory: Arc<dyn DirectoryStore>,
        availability: AvailabilityService,
        locks: Arc<BookingLocks>,
    ) -> Self {
        Self {
            appointments,
            directory,
            availability,
            locks,
        }
    }

    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        debug!(
            "Booking appointment for patient {} with professional {} on {}",
            request.patient_id, request.professional_id, request.date
        );

        let end = self
            .validate_common(
                request.patient_id,
                request.professional_id,
                request.date,
                request.start_time,
                request.duration_minutes,
                &request.reason,
            )
            .await?;

        let covered = self
            .availability
            .is_covered(
                request.professional_id,
                request.date,
                request.start_time,
                request.duration_minutes,
            )
            .await?;
        if !covered {
            return Err(validation(
                "The selected time is outside the professional's availability. \
                 Check the configured availability windows.",
            ));
        }

        // Invalid or unset requested status falls back to Pending.
        let status = match request.status {
            Some(s @ (AppointmentStatus::Pending | AppointmentStatus::Confirmed)) => s,
            _ => AppointmentStatus::Pending,
        };

        // Conflict scan and insert are serialized per (professional, date).
        let _guard = self
            .locks
            .acquire(request.professional_id, request.date)
            .await;

        self.ensure_no_conflict(
            request.professional_id,
            request.date,
            request.start_time,
            end,
            None,
        )
        .await?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            professional_id: request.professional_id,
            patient_id: request.patient_id,
            date: request.date,
            start_time: request.start_time,
            duration_minutes: request.duration_minutes,
            reason: request.reason.trim().to_string(),
            status,
            cancellation_reason: None,
            notes: request.notes,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.appointments.insert(appointment.clone()).await?;

        info!(
            "Appointment {} booked for professional {} on {} at {}",
            appointment.id, appointment.professional_id, appointment.date, appointment.start_time
        );
        Ok(appointment)
    }

    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<(), SchedulingError> {
        debug!("Updating appointment {}", appointment_id);

        let current = self
            .appointments
            .get(appointment_id)
            .await?
            .ok_or_else(|| not_found("The appointment does not exist"))?;

        let end = self
            .validate_common(
                request.patient_id,
                request.professional_id,
                request.date,
                request.start_time,
                request.duration_minutes,
                &request.reason,
            )
            .await?;

        // Lock the row's current key and the requested one (they differ on a
        // cross-date reschedule), in sorted order so two updates cannot
        // deadlock on each other.
        let mut keys = vec![
            (current.professional_id, current.date),
            (request.professional_id, request.date),
        ];
        keys.sort();
        keys.dedup();
        let mut guards = Vec::with_capacity(keys.len());
        for (professional_id, date) in keys {
            guards.push(self.locks.acquire(professional_id, date).await);
        }

        // Re-read under the lock: a cancel or another update may have landed
        // while we waited, and a stale status must not be written over.
        let current = self
            .appointments
            .get(appointment_id)
            .await?
            .ok_or_else(|| not_found("The appointment does not exist"))?;

        if !current.status.can_transition_to(request.status) {
            return Err(validation(&format!(
                "Cannot change the status of a {} appointment",
                current.status
            )));
        }

        if request.status == AppointmentStatus::Cancelled
            && request
                .cancellation_reason
                .as_deref()
                .map_or(true, |r| r.trim().is_empty())
        {
            return Err(validation("A cancellation reason is required"));
        }

        // Availability-window membership is not re-checked on update; only
        // the double-booking invariant is, excluding this appointment.
        self.ensure_no_conflict(
            request.professional_id,
            request.date,
            request.start_time,
            end,
            Some(appointment_id),
        )
        .await?;

        let updated = Appointment {
            id: current.id,
            professional_id: request.professional_id,
            patient_id: request.patient_id,
            date: request.date,
            start_time: request.start_time,
            duration_minutes: request.duration_minutes,
            reason: request.reason.trim().to_string(),
            status: request.status,
            cancellation_reason: request.cancellation_reason,
            notes: request.notes,
            active: current.active,
            created_at: current.created_at,
            updated_at: Utc::now(),
        };
        self.appointments.save(updated).await?;

        info!("Appointment {} updated", appointment_id);
        Ok(())
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
    ) -> Result<(), SchedulingError> {
        // The terminal-status checks and the write happen under the same
        // per-key lock the booking and update paths take.
        let (_guard, mut appointment) = self.lock_row(appointment_id).await?;

        if appointment.status == AppointmentStatus::Cancelled {
            return Err(validation("The appointment is already cancelled"));
        }

        if appointment.status == AppointmentStatus::Completed {
            return Err(validation("A completed appointment cannot be cancelled"));
        }

        if request.reason.trim().is_empty() {
            return Err(validation("A cancellation reason is required"));
        }

        appointment.status = AppointmentStatus::Cancelled;
        appointment.cancellation_reason = Some(request.reason.trim().to_string());
        appointment.updated_at = Utc::now();
        self.appointments.save(appointment).await?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(())
    }

    pub async fn change_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<(), SchedulingError> {
        let current = self
            .appointments
            .get(appointment_id)
            .await?
            .ok_or_else(|| not_found("The appointment does not exist"))?;

        if !current.status.can_transition_to(new_status) {
            warn!(
                "Rejected status change {} -> {} for appointment {}",
                current.status, new_status, appointment_id
            );
            return Err(validation(&format!(
                "Cannot change the status of a {} appointment",
                current.status
            )));
        }

        // Same pipeline as a full update: the transition is re-checked under
        // the per-key lock there, a transition to Cancelled still demands a
        // cancellation reason, and the conflict invariant holds.
        let request = UpdateAppointmentRequest {
            patient_id: current.patient_id,
            professional_id: current.professional_id,
            date: current.date,
            start_time: current.start_time,
            duration_minutes: current.duration_minutes,
            reason: current.reason.clone(),
            status: new_status,
            cancellation_reason: current.cancellation_reason.clone(),
            notes: current.notes.clone(),
        };
        self.update_appointment(appointment_id, request).await?;

        info!(
            "Appointment {} status changed to {}",
            appointment_id, new_status
        );
        Ok(())
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, SchedulingError> {
        self.appointments
            .get(appointment_id)
            .await?
            .ok_or_else(|| not_found("The appointment does not exist"))
    }

    // ==============================================================================
    // PRIVATE HELPERS
    // ==============================================================================

    /// Locks the row's (professional, date) key and returns the row as
    /// re-read under that lock. Retries when a concurrent reschedule moved
    /// the row to a different key while we waited.
    async fn lock_row(
        &self,
        appointment_id: Uuid,
    ) -> Result<(OwnedMutexGuard<()>, Appointment), SchedulingError> {
        loop {
            let row = self
                .appointments
                .get(appointment_id)
                .await?
                .ok_or_else(|| not_found("The appointment does not exist"))?;

            let guard = self.locks.acquire(row.professional_id, row.date).await;

            let fresh = self
                .appointments
                .get(appointment_id)
                .await?
                .ok_or_else(|| not_found("The appointment does not exist"))?;
            if fresh.professional_id == row.professional_id && fresh.date == row.date {
                return Ok((guard, fresh));
            }
        }
    }

    /// Field and reference checks shared by booking and rescheduling.
    /// Returns the derived end time.
    async fn validate_common(
        &self,
        patient_id: Uuid,
        professional_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        duration_minutes: u32,
        reason: &str,
    ) -> Result<NaiveTime, SchedulingError> {
        if reason.trim().is_empty() {
            return Err(validation("A consultation reason is required"));
        }

        if duration_minutes == 0 || duration_minutes > 480 {
            return Err(validation(
                "The duration must be between 1 and 480 minutes (8 hours)",
            ));
        }

        let end = slot_end(start, duration_minutes)
            .ok_or_else(|| validation("The appointment must end before midnight"))?;

        if date < Utc::now().date_naive() {
            return Err(validation("The appointment date cannot be in the past"));
        }

        if start < opening_time() || start > closing_time() {
            return Err(validation("The start time must be between 06:00 and 22:00"));
        }

        let patient = self
            .directory
            .patient(patient_id)
            .await?
            .ok_or_else(|| not_found("The selected patient does not exist"))?;
        if !patient.active {
            return Err(validation("The selected patient is inactive"));
        }

        let professional = self
            .directory
            .professional(professional_id)
            .await?
            .ok_or_else(|| not_found("The selected professional does not exist"))?;
        if !professional.active {
            return Err(validation("The selected professional is inactive"));
        }

        Ok(end)
    }

    /// Fails when any non-cancelled appointment of the professional on that
    /// date overlaps `[start, end)`. Callers hold the per-key lock.
    async fn ensure_no_conflict(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        exclude_id: Option<Uuid>,
    ) -> Result<(), SchedulingError> {
        let existing = self
            .appointments
            .for_professional_on(professional_id, date)
            .await?;

        for appointment in existing {
            if Some(appointment.id) == exclude_id || !appointment.blocks_slot() {
                continue;
            }

            if times_overlap(start, end, appointment.start_time, appointment.end_time()) {
                warn!(
                    "Booking conflict for professional {} on {}: {} collides with appointment {}",
                    professional_id, date, start, appointment.id
                );
                return Err(SchedulingError::Conflict(
                    "The selected time is not available. Another appointment already \
                     exists in that time range."
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn validation(msg: &str) -> SchedulingError {
    SchedulingError::Validation(msg.to_string())
}

fn not_found(msg: &str) -> SchedulingError {
    SchedulingError::NotFound(msg.to_string())
}
