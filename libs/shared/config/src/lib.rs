use std::env;
use tracing::warn;

pub const DEFAULT_SLOT_DURATION_MINUTES: i64 = 30;
pub const DEFAULT_SLOT_LOCK_PRUNE_THRESHOLD: usize = 1024;
/// A slot can never be longer than a day.
pub const MAX_SLOT_DURATION_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Step between two consecutive slot boundaries of a doctor's window.
    pub slot_duration_minutes: i64,
    /// New bookings start `Pending` until an administrator approves the payment.
    pub require_payment_approval: bool,
    pub slot_lock_prune_threshold: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            slot_duration_minutes: DEFAULT_SLOT_DURATION_MINUTES,
            require_payment_approval: true,
            slot_lock_prune_threshold: DEFAULT_SLOT_LOCK_PRUNE_THRESHOLD,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Missing or malformed
    /// values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let slot_duration_minutes = match lookup("SLOT_DURATION_MINUTES") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(minutes) if minutes > 0 && minutes <= MAX_SLOT_DURATION_MINUTES => minutes,
                _ => {
                    warn!(
                        "SLOT_DURATION_MINUTES={:?} is not between 1 and {}, using default",
                        raw, MAX_SLOT_DURATION_MINUTES
                    );
                    DEFAULT_SLOT_DURATION_MINUTES
                }
            },
            None => {
                warn!("SLOT_DURATION_MINUTES not set, using default");
                DEFAULT_SLOT_DURATION_MINUTES
            }
        };

        let require_payment_approval = match lookup("REQUIRE_PAYMENT_APPROVAL") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    warn!("REQUIRE_PAYMENT_APPROVAL={:?} is not a boolean, using default", raw);
                    true
                }
            },
            None => true,
        };

        let slot_lock_prune_threshold = lookup("SLOT_LOCK_PRUNE_THRESHOLD")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|threshold| *threshold > 0)
            .unwrap_or(DEFAULT_SLOT_LOCK_PRUNE_THRESHOLD);

        Self {
            slot_duration_minutes,
            require_payment_approval,
            slot_lock_prune_threshold,
        }
    }

    pub fn with_slot_duration(mut self, minutes: i64) -> Self {
        self.slot_duration_minutes = minutes;
        self
    }
}
