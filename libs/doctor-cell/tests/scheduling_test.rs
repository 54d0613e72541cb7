use assert_matches::assert_matches;
use chrono::NaiveTime;
use uuid::Uuid;

use doctor_cell::models::{DayOfWeek, DoctorAvailability, SchedulingError, SlotPlanRequest};
use doctor_cell::services::scheduling::{SlotAllocator, SlotPolicy};
use shared_utils::test_utils::{hm, next_monday, ymd, MockPayloads, TestConfig};

fn monday_doctor(start: NaiveTime, end: NaiveTime) -> DoctorAvailability {
    DoctorAvailability {
        doctor_id: Uuid::new_v4(),
        weekday: DayOfWeek::Monday,
        start_time: start,
        end_time: end,
        slot_capacity: None,
    }
}

fn half_hour_allocator() -> SlotAllocator {
    SlotAllocator::from_config(&TestConfig::default().to_app_config()).expect("valid policy")
}

#[test]
fn test_morning_window_yields_four_half_hour_slots() {
    let allocator = half_hour_allocator();
    let doctor = monday_doctor(hm(9, 0), hm(11, 0));

    let plan = allocator
        .compute_slots(Some(&doctor), "2025-06-23", 0)
        .expect("plan should be computed");

    assert_eq!(plan.max_slots, 4);
    let times: Vec<NaiveTime> = plan.slots.iter().map(|slot| slot.start_time).collect();
    assert_eq!(times, vec![hm(9, 0), hm(9, 30), hm(10, 0), hm(10, 30)]);
    assert_eq!(plan.next_available_date, None);
}

#[test]
fn test_booked_positions_are_skipped() {
    let allocator = half_hour_allocator();
    let doctor = monday_doctor(hm(9, 0), hm(11, 0));

    let plan = allocator.compute_slots(Some(&doctor), "2025-06-23", 2).unwrap();

    let times: Vec<NaiveTime> = plan.slots.iter().map(|slot| slot.start_time).collect();
    let queue_numbers: Vec<u32> = plan.slots.iter().map(|slot| slot.queue_number).collect();
    assert_eq!(times, vec![hm(10, 0), hm(10, 30)]);
    assert_eq!(queue_numbers, vec![3, 4]);
    assert_eq!(plan.booked_count, 2);
    assert_eq!(plan.max_slots, 4);
    assert_eq!(plan.next_available_date, None);
}

#[test]
fn test_full_day_suggests_same_weekday_next_week() {
    let allocator = half_hour_allocator();
    let doctor = monday_doctor(hm(9, 0), hm(11, 0));

    let plan = allocator.compute_slots(Some(&doctor), "2025-06-23", 4).unwrap();

    assert!(plan.is_full());
    assert_eq!(plan.booked_count, 4);
    assert_eq!(plan.max_slots, 4);
    assert_eq!(plan.next_available_date, Some(ymd(2025, 6, 30)));
}

#[test]
fn test_overbooked_day_still_suggests_next_week() {
    let allocator = half_hour_allocator();
    let doctor = monday_doctor(hm(9, 0), hm(11, 0));

    let plan = allocator.compute_slots(Some(&doctor), "2025-12-29", 9).unwrap();

    assert!(plan.slots.is_empty());
    assert_eq!(plan.booked_count, 9);
    assert_eq!(plan.next_available_date, Some(ymd(2026, 1, 5)));
}

#[test]
fn test_remaining_slot_count_matches_capacity_for_every_booked_count() {
    let allocator = SlotAllocator::new(SlotPolicy::new(20).unwrap());
    let doctor = monday_doctor(hm(14, 0), hm(17, 0));
    let max_slots = allocator.max_slots(&doctor);
    assert_eq!(max_slots, 9);

    for booked in 0..max_slots {
        let plan = allocator.compute_slots_for_date(&doctor, next_monday(), booked).unwrap();
        assert_eq!(plan.slots.len() as u32, max_slots - booked);
        assert!(plan
            .slots
            .windows(2)
            .all(|pair| pair[0].start_time < pair[1].start_time));
        assert_eq!(plan.first_slot().map(|slot| slot.queue_number), Some(booked + 1));
    }
}

#[test]
fn test_slot_capacity_caps_max_slots() {
    let allocator = half_hour_allocator();
    let mut doctor = monday_doctor(hm(9, 0), hm(12, 0));
    doctor.slot_capacity = Some(2);

    let plan = allocator.compute_slots_for_date(&doctor, next_monday(), 1).unwrap();
    assert_eq!(plan.max_slots, 2);
    assert_eq!(plan.slots.len(), 1);
    assert_eq!(plan.slots[0].start_time, hm(9, 30));

    let full = allocator.compute_slots_for_date(&doctor, next_monday(), 2).unwrap();
    assert!(full.is_full());
    assert_eq!(full.next_available_date, Some(ymd(2025, 6, 30)));
}

#[test]
fn test_unparseable_date_is_rejected() {
    let allocator = half_hour_allocator();
    let doctor = monday_doctor(hm(9, 0), hm(11, 0));

    let result = allocator.compute_slots(Some(&doctor), "23/06/2025", 0);
    assert_matches!(result, Err(SchedulingError::InvalidDate(_)));

    let result = allocator.compute_slots(Some(&doctor), "", 0);
    assert_matches!(result, Err(SchedulingError::InvalidDate(_)));
}

#[test]
fn test_missing_doctor_is_rejected() {
    let allocator = half_hour_allocator();

    let result = allocator.compute_slots(None, "2025-06-23", 0);
    assert_matches!(result, Err(SchedulingError::UnknownDoctor(_)));
}

#[test]
fn test_weekday_check_is_separate_from_planning() {
    let allocator = half_hour_allocator();
    let doctor = monday_doctor(hm(9, 0), hm(11, 0));
    let tuesday = ymd(2025, 6, 24);

    assert!(allocator.ensure_weekday(&doctor, next_monday()).is_ok());
    assert_matches!(
        allocator.ensure_weekday(&doctor, tuesday),
        Err(SchedulingError::WeekdayMismatch {
            expected: DayOfWeek::Monday,
            actual: DayOfWeek::Tuesday,
        })
    );

    // Planning itself trusts the caller's weekday check.
    let plan = allocator.compute_slots_for_date(&doctor, tuesday, 0).unwrap();
    assert_eq!(plan.slots.len(), 4);
}

#[test]
fn test_plan_request_round_trips_through_json() {
    let doctor_id = Uuid::new_v4();
    let payload = serde_json::json!({
        "doctor": MockPayloads::availability(&doctor_id, "monday", "09:00:00", "11:00:00"),
        "date": "2025-06-23",
        "bookedCount": 3
    });

    let request: SlotPlanRequest = serde_json::from_value(payload).expect("request should parse");
    let plan = half_hour_allocator()
        .compute_slots(request.doctor.as_ref(), request.date(), request.booked_count)
        .unwrap();

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["doctorId"], serde_json::json!(doctor_id));
    assert_eq!(json["maxSlots"], 4);
    assert_eq!(json["slots"][0]["startTime"], "10:30:00");
    assert_eq!(json["slots"][0]["queueNumber"], 4);
    assert!(json["nextAvailableDate"].is_null());
}
