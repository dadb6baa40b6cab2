// libs/scheduling-cell/src/services/slots.rs
//
// Slot generation: pure over in-memory rows, restartable, finite. The
// availability service loads the candidate windows and the day's
// appointments; everything here is arithmetic.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::models::{weekday_of, Appointment, AvailabilityWindow};
use crate::services::overlap::{times_overlap, EffectiveRange};

/// End of a slot of `minutes` starting at `start`, or None when it would
/// roll past midnight and cannot be represented on the same date.
pub fn slot_end(start: NaiveTime, minutes: u32) -> Option<NaiveTime> {
    let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(minutes as i64));
    if wrapped != 0 {
        None
    } else {
        Some(end)
    }
}

/// Whether a window applies to `date`: active, matching weekday, and the
/// date inside the effective range.
pub fn window_in_force(window: &AvailabilityWindow, date: NaiveDate) -> bool {
    window.active
        && window.weekday == weekday_of(date)
        && EffectiveRange::from(window).contains(date)
}

/// Whether `[start, end)` lies entirely inside a window that is in force on
/// `date`.
pub fn covers(window: &AvailabilityWindow, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
    window_in_force(window, date)
        && start < end
        && start >= window.start_time
        && end <= window.end_time
}

/// Bookable start-times on `date`: every window in force contributes the walk
/// `start, start+interval, ...` while the whole slot still fits before the
/// window's end; a candidate is dropped when it overlaps a non-cancelled
/// appointment. Output is sorted ascending and de-duplicated, so overlapping
/// windows (an invariant violation upstream) degrade gracefully.
pub fn free_slots(
    date: NaiveDate,
    windows: &[AvailabilityWindow],
    appointments: &[Appointment],
) -> Vec<NaiveTime> {
    let mut slots = Vec::new();

    for window in windows.iter().filter(|w| window_in_force(w, date)) {
        let interval = Duration::minutes(window.slot_minutes as i64);
        let mut start = window.start_time;

        loop {
            let (end, wrapped) = start.overflowing_add_signed(interval);
            if wrapped != 0 || end > window.end_time {
                break;
            }

            let taken = appointments
                .iter()
                .filter(|apt| apt.blocks_slot())
                .any(|apt| times_overlap(start, end, apt.start_time, apt.end_time()));

            if !taken {
                slots.push(start);
            }

            start = end;
        }
    }

    slots.sort();
    slots.dedup();
    slots
}
