use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::models::SchedulingError;
use shared_models::AppError;

// ==============================================================================
// BOOKING RECORDS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub slot_time: NaiveTime,
    /// 1-based position within (doctor_id, date). Never reused.
    pub queue_number: u32,
    pub status: BookingStatus,
    pub payment: PaymentRecord,
    pub consultation: Option<ConsultationRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingRecord {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(self.doctor_id, self.date)
    }

    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Booked,
    Channeled,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Booked => write!(f, "booked"),
            BookingStatus::Channeled => write!(f, "channeled"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
}

impl SlotKey {
    pub fn new(doctor_id: Uuid, date: NaiveDate) -> Self {
        Self { doctor_id, date }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.doctor_id, self.date)
    }
}

// ==============================================================================
// PAYMENT RECORDS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentRecord {
    #[serde(rename_all = "camelCase")]
    Card {
        cardholder_name: String,
        card_last4: String,
        amount_cents: u64,
    },
    #[serde(rename_all = "camelCase")]
    Government {
        scheme: String,
        beneficiary_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Insurance {
        provider: String,
        policy_number: String,
        #[serde(default)]
        coverage_amount_cents: Option<u64>,
    },
}

impl PaymentRecord {
    pub fn method(&self) -> &'static str {
        match self {
            PaymentRecord::Card { .. } => "card",
            PaymentRecord::Government { .. } => "government",
            PaymentRecord::Insurance { .. } => "insurance",
        }
    }

    pub fn validate(&self) -> Result<(), AppointmentError> {
        match self {
            PaymentRecord::Card {
                cardholder_name,
                card_last4,
                amount_cents,
            } => {
                require_text("cardholderName", cardholder_name)?;
                if card_last4.len() != 4 || !card_last4.chars().all(|c| c.is_ascii_digit()) {
                    return Err(AppointmentError::InvalidPayment(
                        "cardLast4 must be exactly four digits".to_string(),
                    ));
                }
                if *amount_cents == 0 {
                    return Err(AppointmentError::InvalidPayment(
                        "amountCents must be positive".to_string(),
                    ));
                }
            }
            PaymentRecord::Government {
                scheme,
                beneficiary_id,
            } => {
                require_text("scheme", scheme)?;
                require_text("beneficiaryId", beneficiary_id)?;
            }
            PaymentRecord::Insurance {
                provider,
                policy_number,
                coverage_amount_cents,
            } => {
                require_text("provider", provider)?;
                require_text("policyNumber", policy_number)?;
                if *coverage_amount_cents == Some(0) {
                    return Err(AppointmentError::InvalidPayment(
                        "coverageAmountCents must be positive when given".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<(), AppointmentError> {
    if value.trim().is_empty() {
        return Err(AppointmentError::InvalidPayment(format!("{} is required", field)));
    }
    Ok(())
}

// ==============================================================================
// CONSULTATION RECORDS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRecord {
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordConsultationRequest {
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub notes: Option<String>,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: String,
    pub payment: PaymentRecord,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error("No slots left for doctor {doctor_id} on {date}, next available date is {next_available_date}")]
    CapacityExceeded {
        doctor_id: Uuid,
        date: NaiveDate,
        next_available_date: NaiveDate,
    },

    #[error("Appointment not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: BookingStatus, to: BookingStatus },

    #[error("Invalid payment: {0}")]
    InvalidPayment(String),

    #[error("Unauthorized access to appointment")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Scheduling(inner) => inner.into(),
            AppointmentError::CapacityExceeded {
                next_available_date, ..
            } => AppError::CapacityExceeded {
                next_available_date: next_available_date.to_string(),
            },
            AppointmentError::NotFound(id) => AppError::NotFound(id.to_string()),
            err @ AppointmentError::InvalidStatusTransition { .. } => AppError::Conflict(err.to_string()),
            AppointmentError::InvalidPayment(msg) => AppError::ValidationError(msg),
            AppointmentError::Unauthorized => AppError::Auth("Unauthorized access to appointment".to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
