// libs/scheduling-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use directory_cell::store::DirectoryStore;

use crate::models::{
    closing_time, format_time_range, opening_time, weekday_name, AvailabilityWindow,
    SchedulingError, WindowRequest, ALLOWED_SLOT_MINUTES, EFFECTIVE_FROM_GRACE_DAYS,
};
use crate::services::overlap::windows_conflict;
use crate::services::slots;
use crate::store::{AppointmentStore, WindowStore};

/// Manages recurring weekly availability windows and answers the two
/// read-side questions booking needs: free slots and coverage.
#[derive(Clone)]
pub struct AvailabilityService {
    windows: Arc<dyn WindowStore>,
    appointments: Arc<dyn AppointmentStore>,
    directory: Arc<dyn DirectoryStore>,
}

impl AvailabilityService {
    pub fn new(
        windows: Arc<dyn WindowStore>,
        appointments: Arc<dyn AppointmentStore>,
        directory: Arc<dyn DirectoryStore>,
    ) -> Self {
        Self {
            windows,
            appointments,
            directory,
        }
    }

    pub async fn create_window(&self, request: WindowRequest) -> Result<Uuid, SchedulingError> {
        debug!(
            "Creating availability window for professional {}",
            request.professional_id
        );

        self.validate_fields(&request).await?;
        self.scan_for_overlap(&request, None).await?;

        let now = Utc::now();
        let window = AvailabilityWindow {
            id: Uuid::new_v4(),
            professional_id: request.professional_id,
            weekday: request.weekday,
            start_time: request.start_time,
            end_time: request.end_time,
            slot_minutes: request.slot_minutes,
            effective_from: request.effective_from,
            effective_until: request.effective_until,
            active: true,
            created_at: now,
            updated_at: now,
        };
        let id = window.id;
        self.windows.insert(window).await?;

        info!("Availability window {} created", id);
        Ok(id)
    }

    pub async fn update_window(
        &self,
        window_id: Uuid,
        request: WindowRequest,
    ) -> Result<(), SchedulingError> {
        debug!("Updating availability window {}", window_id);

        let current = self
            .windows
            .get(window_id)
            .await?
            .ok_or_else(|| not_found("The availability window does not exist"))?;

        self.validate_fields(&request).await?;
        self.scan_for_overlap(&request, Some(window_id)).await?;

        let updated = AvailabilityWindow {
            id: current.id,
            professional_id: request.professional_id,
            weekday: request.weekday,
            start_time: request.start_time,
            end_time: request.end_time,
            slot_minutes: request.slot_minutes,
            effective_from: request.effective_from,
            effective_until: request.effective_until,
            active: current.active,
            created_at: current.created_at,
            updated_at: Utc::now(),
        };
        self.windows.save(updated).await?;

        info!("Availability window {} updated", window_id);
        Ok(())
    }

    pub async fn deactivate_window(&self, window_id: Uuid) -> Result<(), SchedulingError> {
        let mut window = self
            .windows
            .get(window_id)
            .await?
            .ok_or_else(|| not_found("The availability window does not exist"))?;

        if !window.active {
            return Err(validation("The availability window is already inactive"));
        }

        window.active = false;
        window.updated_at = Utc::now();
        self.windows.save(window).await?;

        info!("Availability window {} deactivated", window_id);
        Ok(())
    }

    /// Ordered bookable start-times for one professional on one date.
    pub async fn free_slots(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, SchedulingError> {
        debug!("Listing free slots for professional {} on {}", professional_id, date);

        let weekday = crate::models::weekday_of(date);
        let windows = self.windows.active_for_weekday(professional_id, weekday).await?;
        let appointments = self
            .appointments
            .for_professional_on(professional_id, date)
            .await?;

        Ok(slots::free_slots(date, &windows, &appointments))
    }

    /// Whether `[start, start+duration)` lies inside some active window in
    /// force for that professional on that date.
    pub async fn is_covered(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        duration_minutes: u32,
    ) -> Result<bool, SchedulingError> {
        let end = match slots::slot_end(start, duration_minutes) {
            Some(end) => end,
            None => return Ok(false),
        };

        let weekday = crate::models::weekday_of(date);
        let windows = self.windows.active_for_weekday(professional_id, weekday).await?;

        Ok(windows.iter().any(|w| slots::covers(w, date, start, end)))
    }

    // ==============================================================================
    // PRIVATE HELPERS
    // ==============================================================================

    async fn validate_fields(&self, request: &WindowRequest) -> Result<(), SchedulingError> {
        let professional = self
            .directory
            .professional(request.professional_id)
            .await?
            .ok_or_else(|| not_found("The selected professional does not exist"))?;

        if !professional.active {
            return Err(validation("The selected professional is inactive"));
        }

        if !(1..=7).contains(&request.weekday) {
            return Err(validation(
                "The weekday must be between 1 (Monday) and 7 (Sunday)",
            ));
        }

        if request.start_time >= request.end_time {
            return Err(validation("The start time must be before the end time"));
        }

        if request.start_time < opening_time() || request.start_time > closing_time() {
            return Err(validation("The start time must be between 06:00 and 22:00"));
        }

        if request.end_time < opening_time() || request.end_time > closing_time() {
            return Err(validation("The end time must be between 06:00 and 22:00"));
        }

        if request.slot_minutes == 0 {
            return Err(validation("The slot interval must be greater than 0 minutes"));
        }

        if request.slot_minutes > 240 {
            return Err(validation(
                "The slot interval cannot exceed 240 minutes (4 hours)",
            ));
        }

        if !ALLOWED_SLOT_MINUTES.contains(&request.slot_minutes) {
            return Err(validation(
                "The slot interval must be one of: 5, 10, 15, 20, 30, 45, 60, 90, 120, 180, 240 minutes",
            ));
        }

        let earliest = Utc::now().date_naive() - Duration::days(EFFECTIVE_FROM_GRACE_DAYS);
        if request.effective_from < earliest {
            return Err(validation(
                "The effective-from date cannot be more than 7 days in the past",
            ));
        }

        if let Some(until) = request.effective_until {
            if until < request.effective_from {
                return Err(validation(
                    "The effective-until date must be on or after the effective-from date",
                ));
            }
        }

        Ok(())
    }

    /// Rejects the request when any *other* active window for the same
    /// professional and weekday overlaps it in both effective range and
    /// time of day.
    async fn scan_for_overlap(
        &self,
        request: &WindowRequest,
        exclude_id: Option<Uuid>,
    ) -> Result<(), SchedulingError> {
        let candidate = AvailabilityWindow {
            id: exclude_id.unwrap_or_else(Uuid::new_v4),
            professional_id: request.professional_id,
            weekday: request.weekday,
            start_time: request.start_time,
            end_time: request.end_time,
            slot_minutes: request.slot_minutes,
            effective_from: request.effective_from,
            effective_until: request.effective_until,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let existing = self
            .windows
            .active_for_weekday(request.professional_id, request.weekday)
            .await?;

        for window in existing {
            if Some(window.id) == exclude_id {
                continue;
            }

            if windows_conflict(&candidate, &window) {
                warn!(
                    "Window overlap detected for professional {} on weekday {}",
                    request.professional_id, request.weekday
                );
                return Err(SchedulingError::Conflict(format!(
                    "An availability window already exists for this professional on {} \
                     from {} that overlaps the requested time range within the given \
                     effective period",
                    weekday_name(window.weekday),
                    format_time_range(window.start_time, window.end_time),
                )));
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
