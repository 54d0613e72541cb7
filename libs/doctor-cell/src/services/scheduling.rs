use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime};
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{AvailableSlot, DayOfWeek, DoctorAvailability, SchedulingError, SlotPlan};

/// A fully booked day is offered again one week later, on the same weekday.
pub const REBOOK_INTERVAL_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPolicy {
    slot_duration: Duration,
}

impl SlotPolicy {
    pub fn new(slot_duration_minutes: i64) -> Result<Self, SchedulingError> {
        if slot_duration_minutes <= 0 {
            return Err(SchedulingError::InvalidAvailability(format!(
                "Slot duration must be positive, got {} minutes",
                slot_duration_minutes
            )));
        }
        let slot_duration = Duration::try_minutes(slot_duration_minutes).ok_or_else(|| {
            SchedulingError::InvalidAvailability(format!(
                "Slot duration of {} minutes is out of range",
                slot_duration_minutes
            ))
        })?;
        Ok(Self { slot_duration })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, SchedulingError> {
        Self::new(config.slot_duration_minutes)
    }

    pub fn slot_duration(&self) -> Duration {
        self.slot_duration
    }
}

/// Stateless slot planner for a single doctor and day.
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    policy: SlotPolicy,
}

impl SlotAllocator {
    pub fn new(policy: SlotPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, SchedulingError> {
        Ok(Self::new(SlotPolicy::from_config(config)?))
    }

    /// Slot start times within `[start_time, end_time)`, each slot fitting
    /// entirely inside the window. Never wraps past midnight.
    pub fn slot_boundaries(&self, doctor: &DoctorAvailability) -> Vec<NaiveTime> {
        let step = self.policy.slot_duration;
        let mut boundaries = Vec::new();
        let mut current = doctor.start_time;

        loop {
            let (slot_end, wrapped) = current.overflowing_add_signed(step);
            if wrapped != 0 || slot_end > doctor.end_time {
                break;
            }
            boundaries.push(current);
            current = slot_end;
        }

        boundaries
    }

    pub fn max_slots(&self, doctor: &DoctorAvailability) -> u32 {
        let generated = self.slot_boundaries(doctor).len() as u32;
        match doctor.slot_capacity {
            Some(capacity) => generated.min(capacity),
            None => generated,
        }
    }

    /// Compute the slot plan for `date`, given as `YYYY-MM-DD` or an RFC 3339
    /// timestamp.
    pub fn compute_slots(
        &self,
        doctor: Option<&DoctorAvailability>,
        date: &str,
        booked_count: u32,
    ) -> Result<SlotPlan, SchedulingError> {
        let doctor = doctor.ok_or_else(|| SchedulingError::UnknownDoctor("no doctor supplied".to_string()))?;
        let date = parse_date(date)?;
        self.compute_slots_for_date(doctor, date, booked_count)
    }

    /// Assumes the doctor's weekday has already been checked against `date`.
    pub fn compute_slots_for_date(
        &self,
        doctor: &DoctorAvailability,
        date: NaiveDate,
        booked_count: u32,
    ) -> Result<SlotPlan, SchedulingError> {
        debug!(
            "Computing slots for doctor {} on {} with {} booked",
            doctor.doctor_id, date, booked_count
        );

        let mut boundaries = self.slot_boundaries(doctor);
        if let Some(capacity) = doctor.slot_capacity {
            boundaries.truncate(capacity as usize);
        }
        let max_slots = boundaries.len() as u32;

        if booked_count >= max_slots {
            let next_available_date = date
                .checked_add_days(Days::new(REBOOK_INTERVAL_DAYS))
                .ok_or_else(|| SchedulingError::InvalidDate(format!("{} has no date one week later", date)))?;

            debug!(
                "Doctor {} is fully booked on {} ({}/{}), suggesting {}",
                doctor.doctor_id, date, booked_count, max_slots, next_available_date
            );

            return Ok(SlotPlan {
                doctor_id: doctor.doctor_id,
                date,
                slots: Vec::new(),
                booked_count,
                max_slots,
                next_available_date: Some(next_available_date),
            });
        }

        let slots = boundaries
            .into_iter()
            .skip(booked_count as usize)
            .enumerate()
            .map(|(position, start_time)| AvailableSlot {
                start_time,
                queue_number: booked_count + position as u32 + 1,
            })
            .collect();

        Ok(SlotPlan {
            doctor_id: doctor.doctor_id,
            date,
            slots,
            booked_count,
            max_slots,
            next_available_date: None,
        })
    }

    pub fn ensure_weekday(&self, doctor: &DoctorAvailability, date: NaiveDate) -> Result<(), SchedulingError> {
        let actual = DayOfWeek::of(date);
        if doctor.weekday != actual {
            warn!(
                "Rejecting date {} for doctor {}: consults on {}, not {}",
                date, doctor.doctor_id, doctor.weekday, actual
            );
            return Err(SchedulingError::WeekdayMismatch {
                expected: doctor.weekday,
                actual,
            });
        }
        Ok(())
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, SchedulingError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SchedulingError::InvalidDate("date is missing".to_string()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| timestamp.date_naive())
        .map_err(|_| SchedulingError::InvalidDate(format!("cannot parse {:?}", raw)))
}
