use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AppointmentError, BookingRecord};

/// Persistence seam for booking records. Implementations make no uniqueness
/// guarantees; callers serialize writes per (doctor, date).
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Number of records ever issued for (doctor, date), cancelled ones included.
    async fn issued_count(&self, doctor_id: Uuid, date: NaiveDate) -> Result<u32, AppointmentError>;

    async fn insert(&self, record: BookingRecord) -> Result<BookingRecord, AppointmentError>;

    async fn get(&self, booking_id: Uuid) -> Result<Option<BookingRecord>, AppointmentError>;

    async fn update(&self, record: BookingRecord) -> Result<BookingRecord, AppointmentError>;

    /// Ordered by queue number.
    async fn list_for_day(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<BookingRecord>, AppointmentError>;

    /// Ordered by date, then queue number.
    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<BookingRecord>, AppointmentError>;
}

#[derive(Default)]
pub struct InMemoryBookingStore {
    records: RwLock<HashMap<Uuid, BookingRecord>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn issued_count(&self, doctor_id: Uuid, date: NaiveDate) -> Result<u32, AppointmentError> {
        let records = self.records.read().await;
        let count = records
            .values()
            .filter(|record| record.doctor_id == doctor_id && record.date == date)
            .count();
        Ok(count as u32)
    }

    async fn insert(&self, record: BookingRecord) -> Result<BookingRecord, AppointmentError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(AppointmentError::DatabaseError(format!(
                "booking {} already exists",
                record.id
            )));
        }
        debug!("Storing booking {} (queue #{})", record.id, record.queue_number);
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, booking_id: Uuid) -> Result<Option<BookingRecord>, AppointmentError> {
        Ok(self.records.read().await.get(&booking_id).cloned())
    }

    async fn update(&self, record: BookingRecord) -> Result<BookingRecord, AppointmentError> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record)
            }
            None => Err(AppointmentError::NotFound(record.id)),
        }
    }

    async fn list_for_day(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<BookingRecord>, AppointmentError> {
        let records = self.records.read().await;
        let mut day: Vec<BookingRecord> = records
            .values()
            .filter(|record| record.doctor_id == doctor_id && record.date == date)
            .cloned()
            .collect();
        day.sort_by_key(|record| record.queue_number);
        Ok(day)
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<BookingRecord>, AppointmentError> {
        let records = self.records.read().await;
        let mut bookings: Vec<BookingRecord> = records
            .values()
            .filter(|record| record.patient_id == patient_id)
            .cloned()
            .collect();
        bookings.sort_by_key(|record| (record.date, record.queue_number));
        Ok(bookings)
    }
}
