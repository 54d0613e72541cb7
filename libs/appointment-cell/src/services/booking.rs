use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::{DoctorAvailability, SchedulingError, SlotPlan};
use doctor_cell::services::scheduling::{parse_date, SlotAllocator};
use doctor_cell::services::AvailabilityDirectory;
use shared_config::AppConfig;

use crate::models::{
    AppointmentError, BookAppointmentRequest, BookingRecord, BookingStatus, ConsultationRecord,
    RecordConsultationRequest, SlotKey,
};
use crate::services::lifecycle::BookingLifecycleService;
use crate::services::locks::SlotLockRegistry;
use crate::services::store::BookingStore;

pub struct BookingService {
    directory: Arc<dyn AvailabilityDirectory>,
    store: Arc<dyn BookingStore>,
    allocator: SlotAllocator,
    lifecycle: BookingLifecycleService,
    locks: SlotLockRegistry,
    require_payment_approval: bool,
}

impl BookingService {
    pub fn new(
        config: &AppConfig,
        directory: Arc<dyn AvailabilityDirectory>,
        store: Arc<dyn BookingStore>,
    ) -> Result<Self, AppointmentError> {
        Ok(Self {
            directory,
            store,
            allocator: SlotAllocator::from_config(config)?,
            lifecycle: BookingLifecycleService::new(),
            locks: SlotLockRegistry::new(config.slot_lock_prune_threshold),
            require_payment_approval: config.require_payment_approval,
        })
    }

    /// Remaining slots for a doctor on a date, without reserving anything
    pub async fn get_slot_plan(&self, doctor_id: Uuid, date: &str) -> Result<SlotPlan, AppointmentError> {
        let (doctor, date) = self.resolve_doctor_day(doctor_id, date).await?;
        let booked_count = self.store.issued_count(doctor_id, date).await?;
        Ok(self.allocator.compute_slots_for_date(&doctor, date, booked_count)?)
    }

    /// Book the next free slot of the day and assign its queue number
    pub async fn book_appointment(&self, request: BookAppointmentRequest) -> Result<BookingRecord, AppointmentError> {
        debug!(
            "Booking appointment for patient {} with doctor {} on {}",
            request.patient_id, request.doctor_id, request.date
        );

        request.payment.validate()?;
        let (doctor, date) = self.resolve_doctor_day(request.doctor_id, &request.date).await?;

        let key = SlotKey::new(request.doctor_id, date);
        let _guard = self.locks.acquire(key).await;

        let booked_count = self.store.issued_count(request.doctor_id, date).await?;
        let plan = self.allocator.compute_slots_for_date(&doctor, date, booked_count)?;

        let slot = match plan.first_slot() {
            Some(slot) => slot.clone(),
            None => {
                let next_available_date = plan.next_available_date.ok_or_else(|| {
                    AppointmentError::ValidationError(format!("No next date available after {}", date))
                })?;
                warn!(
                    "Doctor {} fully booked on {} ({}/{}), next available {}",
                    request.doctor_id, date, plan.booked_count, plan.max_slots, next_available_date
                );
                return Err(AppointmentError::CapacityExceeded {
                    doctor_id: request.doctor_id,
                    date,
                    next_available_date,
                });
            }
        };

        let now = Utc::now();
        let record = BookingRecord {
            id: Uuid::new_v4(),
            doctor_id: request.doctor_id,
            patient_id: request.patient_id,
            date,
            slot_time: slot.start_time,
            queue_number: slot.queue_number,
            status: self.lifecycle.initial_status(self.require_payment_approval),
            payment: request.payment,
            consultation: None,
            created_at: now,
            updated_at: now,
        };

        let record = self.store.insert(record).await?;
        info!(
            "Booked {} for patient {}: {} at {} queue #{} ({}, paid by {})",
            record.id,
            record.patient_id,
            key,
            record.slot_time,
            record.queue_number,
            record.status,
            record.payment.method()
        );

        Ok(record)
    }

    /// Administrative approval of a pending booking
    pub async fn approve_appointment(&self, booking_id: Uuid) -> Result<BookingRecord, AppointmentError> {
        self.transition(booking_id, BookingStatus::Booked, |_| Ok(())).await
    }

    /// Administrative rejection of a pending booking
    pub async fn reject_appointment(&self, booking_id: Uuid) -> Result<BookingRecord, AppointmentError> {
        self.transition(booking_id, BookingStatus::Cancelled, |record| {
            if record.status != BookingStatus::Pending {
                return Err(AppointmentError::InvalidStatusTransition {
                    from: record.status,
                    to: BookingStatus::Cancelled,
                });
            }
            Ok(())
        })
        .await
    }

    /// Patient-initiated deletion. The queue number is not reclaimed.
    pub async fn cancel_appointment(&self, booking_id: Uuid, patient_id: Uuid) -> Result<BookingRecord, AppointmentError> {
        self.transition(booking_id, BookingStatus::Cancelled, |record| {
            if record.patient_id != patient_id {
                return Err(AppointmentError::Unauthorized);
            }
            Ok(())
        })
        .await
    }

    /// Doctor completes the consultation and records the findings
    pub async fn channel_appointment(
        &self,
        booking_id: Uuid,
        doctor_id: Uuid,
        consultation: RecordConsultationRequest,
    ) -> Result<BookingRecord, AppointmentError> {
        if consultation.diagnosis.trim().is_empty() {
            return Err(AppointmentError::ValidationError("Diagnosis is required".to_string()));
        }

        self.transition(booking_id, BookingStatus::Channeled, |record| {
            if record.doctor_id != doctor_id {
                return Err(AppointmentError::Unauthorized);
            }
            record.consultation = Some(ConsultationRecord {
                diagnosis: consultation.diagnosis.trim().to_string(),
                prescription: consultation.prescription.clone(),
                notes: consultation.notes.clone(),
                recorded_at: Utc::now(),
            });
            Ok(())
        })
        .await
    }

    pub async fn get_appointment(&self, booking_id: Uuid) -> Result<BookingRecord, AppointmentError> {
        self.store
            .get(booking_id)
            .await?
            .ok_or(AppointmentError::NotFound(booking_id))
    }

    pub async fn list_day_bookings(&self, doctor_id: Uuid, date: &str) -> Result<Vec<BookingRecord>, AppointmentError> {
        let date = parse_date(date)?;
        self.store.list_for_day(doctor_id, date).await
    }

    pub async fn list_patient_bookings(&self, patient_id: Uuid) -> Result<Vec<BookingRecord>, AppointmentError> {
        self.store.list_for_patient(patient_id).await
    }

    async fn resolve_doctor_day(
        &self,
        doctor_id: Uuid,
        date: &str,
    ) -> Result<(DoctorAvailability, NaiveDate), AppointmentError> {
        let doctor = self
            .directory
            .get_availability(doctor_id)
            .await
            .ok_or_else(|| SchedulingError::UnknownDoctor(doctor_id.to_string()))?;
        let date = parse_date(date)?;
        self.allocator.ensure_weekday(&doctor, date)?;
        Ok((doctor, date))
    }

    /// Read-check-write of a single booking under its (doctor, date) lock.
    /// `check` may reject the change or amend the record before it is stored.
    async fn transition<F>(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
        check: F,
    ) -> Result<BookingRecord, AppointmentError>
    where
        F: FnOnce(&mut BookingRecord) -> Result<(), AppointmentError>,
    {
        let key = self.get_appointment(booking_id).await?.slot_key();
        let _guard = self.locks.acquire(key).await;

        let mut record = self.get_appointment(booking_id).await?;
        let previous = record.status;

        self.lifecycle.validate_status_transition(previous, new_status)?;
        check(&mut record)?;

        record.status = new_status;
        record.updated_at = Utc::now();
        let record = self.store.update(record).await?;

        info!("Booking {} moved {} -> {}", booking_id, previous, new_status);
        Ok(record)
    }
}
