//! Error types for wedding-rsvp

use thiserror::Error;

/// Failures of the durable store.
///
/// "File does not exist" is never one of these: stores report it as an
/// empty read and callers treat it as an empty collection.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Every way an admission or maintenance operation can fail.
///
/// All variants except `Storage` are detected before any mutation.
#[derive(Error, Debug)]
pub enum RsvpError {
    #[error("Names, phone number, and attendance status are required.")]
    MissingFields,

    #[error("Please specify the number of guests (1-{max} people).")]
    InvalidGuestCount { max: u8 },

    #[error("Please provide a valid phone number.")]
    InvalidPhone,

    #[error("We couldn't find your name on our guest list. Please check your spelling or contact us directly.")]
    NotOnGuestList,

    #[error("An RSVP with this name and phone number already exists. Please contact us if you need to make changes.")]
    DuplicateSubmission,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl RsvpError {
    /// Short machine-friendly name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFields => "missing_fields",
            Self::InvalidGuestCount { .. } => "invalid_guest_count",
            Self::InvalidPhone => "invalid_phone",
            Self::NotOnGuestList => "not_on_guest_list",
            Self::DuplicateSubmission => "duplicate_submission",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::Unauthorized => "unauthorized",
            Self::Storage(_) => "storage_failure",
        }
    }

    /// Whether the caller's input caused the failure
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// Result type alias for RSVP operations
pub type Result<T> = std::result::Result<T, RsvpError>;
