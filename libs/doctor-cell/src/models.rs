use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use shared_models::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }

    /// 0 = Sunday, 1 = Monday, etc.
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(DayOfWeek::Sunday),
            1 => Some(DayOfWeek::Monday),
            2 => Some(DayOfWeek::Tuesday),
            3 => Some(DayOfWeek::Wednesday),
            4 => Some(DayOfWeek::Thursday),
            5 => Some(DayOfWeek::Friday),
            6 => Some(DayOfWeek::Saturday),
            _ => None,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayOfWeek::Sunday => write!(f, "Sunday"),
            DayOfWeek::Monday => write!(f, "Monday"),
            DayOfWeek::Tuesday => write!(f, "Tuesday"),
            DayOfWeek::Wednesday => write!(f, "Wednesday"),
            DayOfWeek::Thursday => write!(f, "Thursday"),
            DayOfWeek::Friday => write!(f, "Friday"),
            DayOfWeek::Saturday => write!(f, "Saturday"),
        }
    }
}

/// A doctor's weekly consultation window. Read-only to the allocator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAvailability {
    pub doctor_id: Uuid,
    pub weekday: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub slot_capacity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAvailabilityRequest {
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvailabilityRequest {
    pub day_of_week: Option<i32>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub slot_capacity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlot {
    pub start_time: NaiveTime,
    pub queue_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPlan {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<AvailableSlot>,
    pub booked_count: u32,
    pub max_slots: u32,
    pub next_available_date: Option<NaiveDate>,
}

impl SlotPlan {
    pub fn is_full(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn first_slot(&self) -> Option<&AvailableSlot> {
        self.slots.first()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPlanRequest {
    pub doctor: Option<DoctorAvailability>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub booked_count: u32,
}

impl SlotPlanRequest {
    /// The requested date as given, empty when the caller left it out.
    pub fn date(&self) -> &str {
        self.date.as_deref().unwrap_or_default()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown doctor: {0}")]
    UnknownDoctor(String),

    #[error("Doctor consults on {expected}, requested date falls on {actual}")]
    WeekdayMismatch { expected: DayOfWeek, actual: DayOfWeek },

    #[error("Invalid availability: {0}")]
    InvalidAvailability(String),

    #[error("Availability already exists for doctor {0}")]
    AvailabilityExists(Uuid),
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::InvalidDate(msg) => AppError::InvalidDate(msg),
            SchedulingError::UnknownDoctor(id) => AppError::UnknownDoctor(id),
            err @ SchedulingError::WeekdayMismatch { .. } => AppError::ValidationError(err.to_string()),
            SchedulingError::InvalidAvailability(msg) => AppError::ValidationError(msg),
            err @ SchedulingError::AvailabilityExists(_) => AppError::Conflict(err.to_string()),
        }
    }
}
