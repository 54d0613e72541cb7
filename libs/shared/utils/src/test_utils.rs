use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub slot_duration_minutes: i64,
    pub require_payment_approval: bool,
    pub slot_lock_prune_threshold: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            slot_duration_minutes: 30,
            require_payment_approval: true,
            slot_lock_prune_threshold: 16,
        }
    }
}

impl TestConfig {
    pub fn without_approval() -> Self {
        Self {
            require_payment_approval: false,
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            slot_duration_minutes: self.slot_duration_minutes,
            require_payment_approval: self.require_payment_approval,
            slot_lock_prune_threshold: self.slot_lock_prune_threshold,
        }
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub role: String,
}

impl TestUser {
    pub fn new(role: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: role.to_string(),
        }
    }

    pub fn doctor() -> Self {
        Self::new("doctor")
    }

    pub fn patient() -> Self {
        Self::new("patient")
    }
}

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid test time")
}

/// 2025-06-23 is a Monday.
pub fn next_monday() -> NaiveDate {
    ymd(2025, 6, 23)
}

pub struct MockPayloads;

impl MockPayloads {
    pub fn card_payment() -> serde_json::Value {
        json!({
            "method": "card",
            "cardholderName": "Nimal Perera",
            "cardLast4": "4242",
            "amountCents": 250000
        })
    }

    pub fn government_payment() -> serde_json::Value {
        json!({
            "method": "government",
            "scheme": "Suwa Seriya",
            "beneficiaryId": "199012345678"
        })
    }

    pub fn insurance_payment() -> serde_json::Value {
        json!({
            "method": "insurance",
            "provider": "Ceylinco",
            "policyNumber": "POL-88213",
            "coverageAmountCents": 150000
        })
    }

    pub fn availability(doctor_id: &Uuid, weekday: &str, start: &str, end: &str) -> serde_json::Value {
        json!({
            "doctorId": doctor_id,
            "weekday": weekday,
            "startTime": start,
            "endTime": end,
            "slotCapacity": null
        })
    }
}
