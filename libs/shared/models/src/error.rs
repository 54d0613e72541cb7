use thiserror::Error;

/// Error surfaced across cell boundaries. Each cell keeps its own error enum
/// and converts into this one at the edge.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown doctor: {0}")]
    UnknownDoctor(String),

    #[error("Capacity exceeded, next available date is {next_available_date}")]
    CapacityExceeded { next_available_date: String },

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Authorization error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    /// Stable machine-readable tag for the error family.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidDate(_) => "invalid_date",
            AppError::UnknownDoctor(_) => "unknown_doctor",
            AppError::CapacityExceeded { .. } => "capacity_exceeded",
            AppError::NotFound(_) => "not_found",
            AppError::Auth(_) => "unauthorized",
            AppError::ValidationError(_) => "validation",
            AppError::Conflict(_) => "conflict",
            AppError::Database(_) => "database",
        }
    }

    /// Whether the caller can fix the request and try again.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AppError::Database(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
