use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    CreateAvailabilityRequest, DayOfWeek, DoctorAvailability, SchedulingError,
    UpdateAvailabilityRequest,
};

/// Source of doctor availability records, owned by the admin side.
#[async_trait]
pub trait AvailabilityDirectory: Send + Sync {
    async fn get_availability(&self, doctor_id: Uuid) -> Option<DoctorAvailability>;

    async fn upsert_availability(&self, availability: DoctorAvailability);

    async fn remove_availability(&self, doctor_id: Uuid) -> Option<DoctorAvailability>;
}

#[derive(Default)]
pub struct InMemoryAvailabilityDirectory {
    records: RwLock<HashMap<Uuid, DoctorAvailability>>,
}

impl InMemoryAvailabilityDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AvailabilityDirectory for InMemoryAvailabilityDirectory {
    async fn get_availability(&self, doctor_id: Uuid) -> Option<DoctorAvailability> {
        self.records.read().await.get(&doctor_id).cloned()
    }

    async fn upsert_availability(&self, availability: DoctorAvailability) {
        self.records.write().await.insert(availability.doctor_id, availability);
    }

    async fn remove_availability(&self, doctor_id: Uuid) -> Option<DoctorAvailability> {
        self.records.write().await.remove(&doctor_id)
    }
}

pub struct AvailabilityService {
    directory: Arc<dyn AvailabilityDirectory>,
}

impl AvailabilityService {
    pub fn new(directory: Arc<dyn AvailabilityDirectory>) -> Self {
        Self { directory }
    }

    /// Create the weekly availability for a doctor
    pub async fn create_availability(
        &self,
        doctor_id: Uuid,
        request: CreateAvailabilityRequest,
    ) -> Result<DoctorAvailability, SchedulingError> {
        debug!("Creating availability for doctor: {}", doctor_id);

        if self.directory.get_availability(doctor_id).await.is_some() {
            warn!("Availability already exists for doctor {}", doctor_id);
            return Err(SchedulingError::AvailabilityExists(doctor_id));
        }

        let availability = DoctorAvailability {
            doctor_id,
            weekday: weekday_from_index(request.day_of_week)?,
            start_time: request.start_time,
            end_time: request.end_time,
            slot_capacity: request.slot_capacity,
        };
        validate_availability(&availability)?;

        self.directory.upsert_availability(availability.clone()).await;
        info!(
            "Availability created for doctor {}: {} {}-{}",
            doctor_id, availability.weekday, availability.start_time, availability.end_time
        );

        Ok(availability)
    }

    /// Partial update; the merged record is validated as a whole
    pub async fn update_availability(
        &self,
        doctor_id: Uuid,
        request: UpdateAvailabilityRequest,
    ) -> Result<DoctorAvailability, SchedulingError> {
        debug!("Updating availability for doctor: {}", doctor_id);

        let mut availability = self.get_availability(doctor_id).await?;

        if let Some(day_of_week) = request.day_of_week {
            availability.weekday = weekday_from_index(day_of_week)?;
        }
        if let Some(start_time) = request.start_time {
            availability.start_time = start_time;
        }
        if let Some(end_time) = request.end_time {
            availability.end_time = end_time;
        }
        if let Some(capacity) = request.slot_capacity {
            availability.slot_capacity = Some(capacity);
        }

        validate_availability(&availability)?;
        self.directory.upsert_availability(availability.clone()).await;
        info!("Availability updated for doctor {}", doctor_id);

        Ok(availability)
    }

    pub async fn get_availability(&self, doctor_id: Uuid) -> Result<DoctorAvailability, SchedulingError> {
        self.directory
            .get_availability(doctor_id)
            .await
            .ok_or_else(|| SchedulingError::UnknownDoctor(doctor_id.to_string()))
    }

    pub async fn remove_availability(&self, doctor_id: Uuid) -> Result<DoctorAvailability, SchedulingError> {
        debug!("Removing availability for doctor: {}", doctor_id);

        self.directory
            .remove_availability(doctor_id)
            .await
            .ok_or_else(|| SchedulingError::UnknownDoctor(doctor_id.to_string()))
    }
}

fn weekday_from_index(day_of_week: i32) -> Result<DayOfWeek, SchedulingError> {
    DayOfWeek::from_index(day_of_week).ok_or_else(|| {
        SchedulingError::InvalidAvailability(
            "Day of week must be between 0 (Sunday) and 6 (Saturday)".to_string(),
        )
    })
}

fn validate_availability(availability: &DoctorAvailability) -> Result<(), SchedulingError> {
    if availability.start_time >= availability.end_time {
        return Err(SchedulingError::InvalidAvailability(
            "Start time must be before end time".to_string(),
        ));
    }

    if availability.slot_capacity == Some(0) {
        return Err(SchedulingError::InvalidAvailability(
            "Slot capacity must be at least 1".to_string(),
        ));
    }

    Ok(())
}
