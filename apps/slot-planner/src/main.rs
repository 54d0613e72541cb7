use anyhow::{Context, Result};
use dotenv::dotenv;
use std::io::{self, Read, Write};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doctor_cell::models::{SlotPlan, SlotPlanRequest};
use doctor_cell::services::SlotAllocator;
use shared_config::AppConfig;
use shared_models::AppError;

fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Logs go to stderr so stdout carries only the plan
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(err) = run() {
        error!("Slot planning failed: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = AppConfig::from_env();
    info!("Planning with {}-minute slots", config.slot_duration_minutes);

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("reading plan request from stdin")?;

    let plan = plan_from_json(&config, &input)?;
    info!(
        "{} of {} slots remaining on {}",
        plan.slots.len(),
        plan.max_slots,
        plan.date
    );

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &plan)?;
    writeln!(stdout)?;
    Ok(())
}

fn plan_from_json(config: &AppConfig, input: &str) -> Result<SlotPlan, AppError> {
    let request: SlotPlanRequest = serde_json::from_str(input)?;
    let allocator = SlotAllocator::from_config(config)?;
    let plan = allocator.compute_slots(request.doctor.as_ref(), request.date(), request.booked_count)?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::default().with_slot_duration(30)
    }

    #[test]
    fn test_plan_from_json() {
        let input = r#"{
            "doctor": {
                "doctorId": "6f1c2a8e-4b1d-4c55-9a55-0d7c7d1e8a10",
                "weekday": "monday",
                "startTime": "09:00:00",
                "endTime": "11:00:00"
            },
            "date": "2025-06-23",
            "bookedCount": 4
        }"#;

        let plan = plan_from_json(&config(), input).unwrap();
        assert!(plan.slots.is_empty());
        assert_eq!(plan.max_slots, 4);
        assert_eq!(plan.next_available_date.map(|d| d.to_string()), Some("2025-06-30".to_string()));
    }

    #[test]
    fn test_missing_doctor_maps_to_unknown_doctor() {
        let input = r#"{ "doctor": null, "date": "2025-06-23" }"#;

        let err = plan_from_json(&config(), input).unwrap_err();
        assert_eq!(err.kind(), "unknown_doctor");
    }

    #[test]
    fn test_missing_date_maps_to_invalid_date() {
        let doctor = r#""doctor": {
                "doctorId": "6f1c2a8e-4b1d-4c55-9a55-0d7c7d1e8a10",
                "weekday": "monday",
                "startTime": "09:00:00",
                "endTime": "11:00:00"
            }"#;

        let absent = format!("{{ {} }}", doctor);
        let err = plan_from_json(&config(), &absent).unwrap_err();
        assert_eq!(err.kind(), "invalid_date");

        let null = format!(r#"{{ {}, "date": null }}"#, doctor);
        let err = plan_from_json(&config(), &null).unwrap_err();
        assert_eq!(err.kind(), "invalid_date");
    }

    #[test]
    fn test_oversized_slot_duration_is_rejected() {
        let input = r#"{ "date": "2025-06-23" }"#;
        let err = plan_from_json(&AppConfig::default().with_slot_duration(200_000_000_000_000), input).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_malformed_json_is_a_validation_error() {
        let err = plan_from_json(&config(), "{ not json").unwrap_err();
        assert_eq!(err.kind(), "validation");
    }
}
