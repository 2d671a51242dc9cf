use crate::store::RecordId;
use serde::Serialize;

/// Rejected user input. The action is dropped and the form stays as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },
    #[error("{field} must be a multiple of {step}, got {value}")]
    OffStep {
        field: &'static str,
        value: String,
        step: String,
    },
    #[error("Unknown {field} option: {value}")]
    UnknownOption { field: &'static str, value: String },
    #[error("Cannot move {field} from {from} to {to}")]
    InvalidTransition {
        field: &'static str,
        from: String,
        to: String,
    },
}

/// Failure reported by an external collaborator (inference, upload, ...).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} service is not available")]
    Unavailable(&'static str),
    #[error("{service} service failed: {message}")]
    Failed {
        service: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsoleError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Record {0} not found")]
    NotFound(RecordId),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub type Result<T, E = ConsoleError> = std::result::Result<T, E>;

macro_rules! serialize_as_display {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    serializer.serialize_str(&self.to_string())
                }
            }
        )*
    };
}

serialize_as_display!(ValidationError, ServiceError, ConsoleError);
