// libs/scheduling-cell/tests/availability_test.rs
//
// Availability-window lifecycle against the in-memory stores: creation
// validation, overlap rejection, update and soft-delete rules.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use uuid::Uuid;

use directory_cell::models::{Patient, Professional};
use directory_cell::store::{DirectoryStore, InMemoryDirectoryStore};
use scheduling_cell::models::{SchedulingError, WindowRequest};
use scheduling_cell::SchedulingState;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Next date strictly after today falling on `weekday`.
fn upcoming(weekday: Weekday) -> NaiveDate {
    let mut date = today() + Duration::days(1);
    while date.weekday() != weekday {
        date += Duration::days(1);
    }
    date
}

async fn seed_professional(directory: &dyn DirectoryStore, active: bool) -> Uuid {
    let now = Utc::now();
    let professional = Professional {
        id: Uuid::new_v4(),
        full_name: "Dr. Elena Vidal".to_string(),
        specialty: Some("Dermatology".to_string()),
        active,
        created_at: now,
        updated_at: now,
    };
    let id = professional.id;
    directory.insert_professional(professional).await.unwrap();
    id
}

async fn seed_patient(directory: &dyn DirectoryStore) -> Uuid {
    let now = Utc::now();
    let patient = Patient {
        id: Uuid::new_v4(),
        full_name: "Ana Reyes".to_string(),
        active: true,
        created_at: now,
        updated_at: now,
    };
    let id = patient.id;
    directory.insert_patient(patient).await.unwrap();
    id
}

async fn fixture() -> (SchedulingState, Uuid) {
    let directory: Arc<dyn DirectoryStore> = Arc::new(InMemoryDirectoryStore::new());
    let professional_id = seed_professional(directory.as_ref(), true).await;
    let state = SchedulingState::in_memory(directory);
    (state, professional_id)
}

fn window(
    professional_id: Uuid,
    weekday: u8,
    start: NaiveTime,
    end: NaiveTime,
    slot_minutes: u32,
) -> WindowRequest {
    WindowRequest {
        professional_id,
        weekday,
        start_time: start,
        end_time: end,
        slot_minutes,
        effective_from: today(),
        effective_until: None,
    }
}

#[tokio::test]
async fn create_window_persists_an_active_row() {
    let (state, professional_id) = fixture().await;

    let id = state
        .availability()
        .create_window(window(professional_id, 1, t(9, 0), t(12, 0), 30))
        .await
        .unwrap();

    let stored = state.windows.get(id).await.unwrap().unwrap();
    assert!(stored.active);
    assert_eq!(stored.weekday, 1);
    assert_eq!(stored.start_time, t(9, 0));
    assert_eq!(stored.end_time, t(12, 0));
    assert_eq!(stored.slot_minutes, 30);
    assert_eq!(stored.effective_until, None);
}

#[tokio::test]
async fn create_window_rejects_unknown_professional() {
    let (state, _) = fixture().await;

    let err = state
        .availability()
        .create_window(window(Uuid::new_v4(), 1, t(9, 0), t(12, 0), 30))
        .await
        .unwrap_err();

    assert_matches!(err, SchedulingError::NotFound(_));
}

#[tokio::test]
async fn create_window_rejects_inactive_professional() {
    let directory: Arc<dyn DirectoryStore> = Arc::new(InMemoryDirectoryStore::new());
    let professional_id = seed_professional(directory.as_ref(), false).await;
    let state = SchedulingState::in_memory(directory);

    let err = state
        .availability()
        .create_window(window(professional_id, 1, t(9, 0), t(12, 0), 30))
        .await
        .unwrap_err();

    assert_matches!(err, SchedulingError::Validation(msg) if msg.contains("inactive"));
}

#[tokio::test]
async fn create_window_rejects_weekday_out_of_range() {
    let (state, professional_id) = fixture().await;

    for weekday in [0u8, 8] {
        let err = state
            .availability()
            .create_window(window(professional_id, weekday, t(9, 0), t(12, 0), 30))
            .await
            .unwrap_err();
        assert_matches!(err, SchedulingError::Validation(msg) if msg.contains("weekday"));
    }
}

#[tokio::test]
async fn create_window_rejects_start_not_before_end() {
    let (state, professional_id) = fixture().await;

    let equal = state
        .availability()
        .create_window(window(professional_id, 1, t(10, 0), t(10, 0), 30))
        .await
        .unwrap_err();
    assert_matches!(equal, SchedulingError::Validation(_));

    let inverted = state
        .availability()
        .create_window(window(professional_id, 1, t(12, 0), t(9, 0), 30))
        .await
        .unwrap_err();
    assert_matches!(inverted, SchedulingError::Validation(_));
}

#[tokio::test]
async fn create_window_rejects_times_outside_facility_hours() {
    let (state, professional_id) = fixture().await;

    let early = state
        .availability()
        .create_window(window(professional_id, 1, t(5, 0), t(9, 0), 30))
        .await
        .unwrap_err();
    assert_matches!(early, SchedulingError::Validation(msg) if msg.contains("06:00"));

    let late = state
        .availability()
        .create_window(window(professional_id, 1, t(20, 0), t(22, 30), 30))
        .await
        .unwrap_err();
    assert_matches!(late, SchedulingError::Validation(msg) if msg.contains("22:00"));
}

#[tokio::test]
async fn create_window_rejects_bad_slot_intervals() {
    let (state, professional_id) = fixture().await;

    // Zero, over the cap, and not in the allowed set.
    for slot_minutes in [0u32, 300, 25] {
        let err = state
            .availability()
            .create_window(window(professional_id, 1, t(9, 0), t(12, 0), slot_minutes))
            .await
            .unwrap_err();
        assert_matches!(err, SchedulingError::Validation(_));
    }
}

#[tokio::test]
async fn create_window_rejects_effective_from_too_far_in_the_past() {
    let (state, professional_id) = fixture().await;

    let mut request = window(professional_id, 1, t(9, 0), t(12, 0), 30);
    request.effective_from = today() - Duration::days(8);

    let err = state.availability().create_window(request).await.unwrap_err();
    assert_matches!(err, SchedulingError::Validation(msg) if msg.contains("7 days"));
}

#[tokio::test]
async fn create_window_accepts_effective_from_within_the_grace_period() {
    let (state, professional_id) = fixture().await;

    let mut request = window(professional_id, 1, t(9, 0), t(12, 0), 30);
    request.effective_from = today() - Duration::days(7);

    assert!(state.availability().create_window(request).await.is_ok());
}

#[tokio::test]
async fn create_window_rejects_until_before_from() {
    let (state, professional_id) = fixture().await;

    let mut request = window(professional_id, 1, t(9, 0), t(12, 0), 30);
    request.effective_from = today() + Duration::days(10);
    request.effective_until = Some(today() + Duration::days(5));

    let err = state.availability().create_window(request).await.unwrap_err();
    assert_matches!(err, SchedulingError::Validation(_));
}

#[tokio::test]
async fn overlapping_window_on_the_same_weekday_conflicts() {
    let (state, professional_id) = fixture().await;
    let availability = state.availability();

    // Tuesday 08:00-09:00, bounded; then Tuesday 08:30-09:30 open-ended.
    let mut first = window(professional_id, 2, t(8, 0), t(9, 0), 30);
    first.effective_until = Some(today() + Duration::days(90));
    availability.create_window(first).await.unwrap();

    let err = availability
        .create_window(window(professional_id, 2, t(8, 30), t(9, 30), 30))
        .await
        .unwrap_err();

    assert_matches!(err, SchedulingError::Conflict(msg) if msg.contains("Tuesday"));
}

#[tokio::test]
async fn disjoint_effective_ranges_do_not_conflict() {
    let (state, professional_id) = fixture().await;
    let availability = state.availability();

    let mut first = window(professional_id, 2, t(8, 0), t(9, 0), 30);
    first.effective_until = Some(today() + Duration::days(30));
    availability.create_window(first).await.unwrap();

    let mut second = window(professional_id, 2, t(8, 0), t(9, 0), 30);
    second.effective_from = today() + Duration::days(31);
    assert!(availability.create_window(second).await.is_ok());
}

#[tokio::test]
async fn adjacent_windows_do_not_conflict() {
    let (state, professional_id) = fixture().await;
    let availability = state.availability();

    availability
        .create_window(window(professional_id, 1, t(8, 0), t(9, 0), 30))
        .await
        .unwrap();

    assert!(availability
        .create_window(window(professional_id, 1, t(9, 0), t(10, 0), 30))
        .await
        .is_ok());
}

#[tokio::test]
async fn same_times_on_different_weekdays_do_not_conflict() {
    let (state, professional_id) = fixture().await;
    let availability = state.availability();

    availability
        .create_window(window(professional_id, 1, t(9, 0), t(12, 0), 30))
        .await
        .unwrap();

    assert!(availability
        .create_window(window(professional_id, 3, t(9, 0), t(12, 0), 30))
        .await
        .is_ok());
}

#[tokio::test]
async fn windows_of_different_professionals_do_not_conflict() {
    let directory: Arc<dyn DirectoryStore> = Arc::new(InMemoryDirectoryStore::new());
    let first = seed_professional(directory.as_ref(), true).await;
    let second = seed_professional(directory.as_ref(), true).await;
    let state = SchedulingState::in_memory(directory);
    let availability = state.availability();

    availability
        .create_window(window(first, 1, t(9, 0), t(12, 0), 30))
        .await
        .unwrap();

    assert!(availability
        .create_window(window(second, 1, t(9, 0), t(12, 0), 30))
        .await
        .is_ok());
}

#[tokio::test]
async fn update_missing_window_is_not_found() {
    let (state, professional_id) = fixture().await;

    let err = state
        .availability()
        .update_window(Uuid::new_v4(), window(professional_id, 1, t(9, 0), t(12, 0), 30))
        .await
        .unwrap_err();

    assert_matches!(err, SchedulingError::NotFound(_));
}

#[tokio::test]
async fn update_does_not_conflict_with_itself() {
    let (state, professional_id) = fixture().await;
    let availability = state.availability();

    let id = availability
        .create_window(window(professional_id, 1, t(9, 0), t(12, 0), 30))
        .await
        .unwrap();

    // Shrinking the same window overlaps its own stored row; that must pass.
    availability
        .update_window(id, window(professional_id, 1, t(9, 30), t(11, 30), 30))
        .await
        .unwrap();

    let stored = state.windows.get(id).await.unwrap().unwrap();
    assert_eq!(stored.start_time, t(9, 30));
    assert_eq!(stored.end_time, t(11, 30));
}

#[tokio::test]
async fn update_colliding_with_another_window_conflicts() {
    let (state, professional_id) = fixture().await;
    let availability = state.availability();

    availability
        .create_window(window(professional_id, 1, t(9, 0), t(10, 0), 30))
        .await
        .unwrap();
    let id = availability
        .create_window(window(professional_id, 1, t(14, 0), t(15, 0), 30))
        .await
        .unwrap();

    let err = availability
        .update_window(id, window(professional_id, 1, t(9, 30), t(10, 30), 30))
        .await
        .unwrap_err();

    assert_matches!(err, SchedulingError::Conflict(_));
}

#[tokio::test]
async fn deactivate_is_a_soft_delete_and_is_not_repeatable() {
    let (state, professional_id) = fixture().await;
    let availability = state.availability();

    let id = availability
        .create_window(window(professional_id, 1, t(9, 0), t(12, 0), 30))
        .await
        .unwrap();

    availability.deactivate_window(id).await.unwrap();
    let stored = state.windows.get(id).await.unwrap().unwrap();
    assert!(!stored.active);

    let err = availability.deactivate_window(id).await.unwrap_err();
    assert_matches!(err, SchedulingError::Validation(msg) if msg.contains("already inactive"));

    let missing = availability.deactivate_window(Uuid::new_v4()).await.unwrap_err();
    assert_matches!(missing, SchedulingError::NotFound(_));
}

#[tokio::test]
async fn inactive_windows_do_not_block_new_windows() {
    let (state, professional_id) = fixture().await;
    let availability = state.availability();

    let id = availability
        .create_window(window(professional_id, 1, t(9, 0), t(12, 0), 30))
        .await
        .unwrap();
    availability.deactivate_window(id).await.unwrap();

    assert!(availability
        .create_window(window(professional_id, 1, t(9, 0), t(12, 0), 30))
        .await
        .is_ok());
}

#[tokio::test]
async fn free_slots_walks_the_window_for_the_requested_date() {
    let (state, professional_id) = fixture().await;
    let availability = state.availability();

    let monday = upcoming(Weekday::Mon);
    availability
        .create_window(window(professional_id, 1, t(9, 0), t(12, 0), 30))
        .await
        .unwrap();

    let slots = availability.free_slots(professional_id, monday).await.unwrap();
    assert_eq!(
        slots,
        vec![t(9, 0), t(9, 30), t(10, 0), t(10, 30), t(11, 0), t(11, 30)]
    );

    // The same professional has nothing on the following day.
    let tuesday = monday + Duration::days(1);
    assert!(availability
        .free_slots(professional_id, tuesday)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn is_covered_requires_full_containment_in_an_active_window() {
    let (state, professional_id) = fixture().await;
    let availability = state.availability();

    let monday = upcoming(Weekday::Mon);
    availability
        .create_window(window(professional_id, 1, t(9, 0), t(12, 0), 30))
        .await
        .unwrap();

    assert!(availability
        .is_covered(professional_id, monday, t(10, 0), 45)
        .await
        .unwrap());
    assert!(availability
        .is_covered(professional_id, monday, t(11, 30), 30)
        .await
        .unwrap());
    // Sticks out past the window's end.
    assert!(!availability
        .is_covered(professional_id, monday, t(11, 45), 30)
        .await
        .unwrap());
    // Entirely outside.
    assert!(!availability
        .is_covered(professional_id, monday, t(14, 0), 30)
        .await
        .unwrap());
}

// Keeps the seed helper honest; the booking suite leans on it heavily.
#[tokio::test]
async fn seeded_patient_is_retrievable() {
    let directory: Arc<dyn DirectoryStore> = Arc::new(InMemoryDirectoryStore::new());
    let patient_id = seed_patient(directory.as_ref()).await;
    assert!(directory.patient(patient_id).await.unwrap().is_some());
}
