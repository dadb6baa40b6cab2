// libs/scheduling-cell/src/services/overlap.rs
//
// Pure overlap resolver. No I/O: the availability and booking services load
// the rows, this module only decides whether two intervals collide.

use chrono::{NaiveDate, NaiveTime};

use crate::models::{Appointment, AvailabilityWindow};

/// Two half-open time-of-day intervals [s1, e1) and [s2, e2) overlap iff
/// s1 < e2 and e1 > s2. Adjacent intervals do not overlap; zero-length
/// intervals (rejected upstream) overlap nothing.
pub fn times_overlap(s1: NaiveTime, e1: NaiveTime, s2: NaiveTime, e2: NaiveTime) -> bool {
    s1 < e2 && e1 > s2
}

/// The date span during which an availability window is in force. A missing
/// `until` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveRange {
    pub from: NaiveDate,
    pub until: Option<NaiveDate>,
}

impl EffectiveRange {
    pub fn new(from: NaiveDate, until: Option<NaiveDate>) -> Self {
        Self { from, until }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && self.until.map_or(true, |until| date <= until)
    }

    /// Inclusive date-range intersection, treating an absent `until` as +inf.
    pub fn overlaps(&self, other: &EffectiveRange) -> bool {
        match (self.until, other.until) {
            (None, None) => true,
            (None, Some(other_until)) => self.from <= other_until,
            (Some(until), None) => other.from <= until,
            (Some(until), Some(other_until)) => self.from <= other_until && other.from <= until,
        }
    }
}

impl From<&AvailabilityWindow> for EffectiveRange {
    fn from(window: &AvailabilityWindow) -> Self {
        Self::new(window.effective_from, window.effective_until)
    }
}

/// Two windows conflict iff their effective-date ranges intersect AND their
/// time-of-day intervals overlap. Callers scope the comparison to the same
/// professional and weekday.
pub fn windows_conflict(a: &AvailabilityWindow, b: &AvailabilityWindow) -> bool {
    EffectiveRange::from(a).overlaps(&EffectiveRange::from(b))
        && times_overlap(a.start_time, a.end_time, b.start_time, b.end_time)
}

/// Two appointments conflict iff they fall on the same calendar date and
/// their booked intervals overlap.
pub fn appointments_conflict(a: &Appointment, b: &Appointment) -> bool {
    a.date == b.date && times_overlap(a.start_time, a.end_time(), b.start_time, b.end_time())
}
