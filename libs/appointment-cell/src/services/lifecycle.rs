use tracing::{debug, warn};

use crate::models::{AppointmentError, BookingStatus};

#[derive(Debug, Clone, Default)]
pub struct BookingLifecycleService;

impl BookingLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Status a freshly booked record starts in
    pub fn initial_status(&self, require_payment_approval: bool) -> BookingStatus {
        if require_payment_approval {
            BookingStatus::Pending
        } else {
            BookingStatus::Booked
        }
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: BookingStatus,
        new_status: BookingStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            });
        }

        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: BookingStatus) -> Vec<BookingStatus> {
        match current_status {
            BookingStatus::Pending => vec![BookingStatus::Booked, BookingStatus::Cancelled],
            BookingStatus::Booked => vec![BookingStatus::Channeled, BookingStatus::Cancelled],
            // Terminal states - no transitions allowed
            BookingStatus::Channeled => vec![],
            BookingStatus::Cancelled => vec![],
        }
    }

    pub fn is_terminal(&self, status: BookingStatus) -> bool {
        self.get_valid_transitions(status).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Booked,
        BookingStatus::Channeled,
        BookingStatus::Cancelled,
    ];

    #[test]
    fn test_initial_status_follows_approval_setting() {
        let lifecycle = BookingLifecycleService::new();
        assert_eq!(lifecycle.initial_status(true), BookingStatus::Pending);
        assert_eq!(lifecycle.initial_status(false), BookingStatus::Booked);
    }

    #[test]
    fn test_allowed_transitions() {
        let lifecycle = BookingLifecycleService::new();
        for (from, to) in [
            (BookingStatus::Pending, BookingStatus::Booked),
            (BookingStatus::Pending, BookingStatus::Cancelled),
            (BookingStatus::Booked, BookingStatus::Channeled),
            (BookingStatus::Booked, BookingStatus::Cancelled),
        ] {
            assert!(lifecycle.validate_status_transition(from, to).is_ok(), "{} -> {}", from, to);
        }
    }

    #[test]
    fn test_terminal_states_reject_every_transition() {
        let lifecycle = BookingLifecycleService::new();
        for from in [BookingStatus::Channeled, BookingStatus::Cancelled] {
            assert!(lifecycle.is_terminal(from));
            for to in ALL {
                let err = lifecycle.validate_status_transition(from, to).unwrap_err();
                assert!(matches!(
                    err,
                    AppointmentError::InvalidStatusTransition { from: f, to: t } if f == from && t == to
                ));
            }
        }
    }

    #[test]
    fn test_pending_cannot_skip_to_channeled() {
        let lifecycle = BookingLifecycleService::new();
        assert!(lifecycle
            .validate_status_transition(BookingStatus::Pending, BookingStatus::Channeled)
            .is_err());
        assert!(lifecycle
            .validate_status_transition(BookingStatus::Booked, BookingStatus::Pending)
            .is_err());
    }
}
