// libs/scheduling-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::StoreError;

// ==============================================================================
// FACILITY CONSTANTS
// ==============================================================================

/// Slot intervals a window may be configured with, in minutes.
pub const ALLOWED_SLOT_MINUTES: [u32; 11] = [5, 10, 15, 20, 30, 45, 60, 90, 120, 180, 240];

/// How far in the past an effective-from date may lie at creation time.
pub const EFFECTIVE_FROM_GRACE_DAYS: i64 = 7;

pub fn opening_time() -> NaiveTime {
    NaiveTime::from_hms_opt(6, 0, 0).unwrap()
}

pub fn closing_time() -> NaiveTime {
    NaiveTime::from_hms_opt(22, 0, 0).unwrap()
}

/// ISO weekday number, 1 = Monday .. 7 = Sunday.
pub fn weekday_of(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

pub fn weekday_name(weekday: u8) -> &'static str {
    match weekday {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        7 => "Sunday",
        _ => "unknown day",
    }
}

pub fn format_time_range(start: NaiveTime, end: NaiveTime) -> String {
    format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"))
}

// ==============================================================================
// CORE SCHEDULING MODELS
// ==============================================================================

/// A recurring weekly time range during which a professional accepts
/// appointments, in force over an effective-date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub professional_id: Uuid,
    /// 1 = Monday .. 7 = Sunday.
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_minutes: u32,
    pub effective_from: NaiveDate,
    /// None = open-ended.
    pub effective_until: Option<NaiveDate>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub reason: String,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// End of the booked interval. Validation rejects appointments that would
    /// roll past midnight, so the wrap here never fires for stored rows.
    pub fn end_time(&self) -> NaiveTime {
        let (end, _) = self
            .start_time
            .overflowing_add_signed(Duration::minutes(self.duration_minutes as i64));
        end
    }

    /// Whether this appointment occupies its time range for conflict and
    /// slot-generation purposes. Only cancelled appointments free their slot.
    pub fn blocks_slot(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Completed and Cancelled admit no further transition. NoShow does not
    /// get the same protection; the clinic may still cancel or amend it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        !self.is_terminal() || *self == next
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Payload for creating or updating an availability window; the update path
/// takes the window id from the URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowRequest {
    pub professional_id: Uuid,
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_minutes: u32,
    pub effective_from: NaiveDate,
    pub effective_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub reason: String,
    /// Anything other than Pending or Confirmed is defaulted to Pending.
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub reason: String,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub professional_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct CoverageQuery {
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SchedulingError> for AppError {
    fn from(e: SchedulingError) -> Self {
        match e {
            SchedulingError::Validation(msg) => AppError::BadRequest(msg),
            SchedulingError::Conflict(msg) => AppError::Conflict(msg),
            SchedulingError::NotFound(msg) => AppError::NotFound(msg),
            SchedulingError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
