use std::io;
pub use thiserror::Error;
use uuid::Error as UuidError;
use anyhow::Error as AnyhowError;
use serde_json::Error as SerdeJsonError;
use serde::{Serialize, Deserialize};

/// SQLSTATE reported by relational stores on a unique-constraint violation.
pub const UNIQUE_VIOLATION_SQLSTATE: &str = "23505";

#[derive(Debug, Serialize, Deserialize, Error, Clone)]
pub enum GraphError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    StorageError(String), // General storage operation error
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Database connection error: {0}")]
    ConnectionError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Entity already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid data provided: {0}")]
    InvalidData(String),
    #[error("entity with identifier {0} was not found")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(ValidationError),
    #[error("UUID parsing or generation error: {0}")]
    Uuid(String),
}

impl GraphError {
    /// True when the error is a uniqueness-constraint conflict, either raised
    /// directly by an engine or surfaced as SQLSTATE 23505 by a relational one.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            GraphError::AlreadyExists(_) => true,
            GraphError::StorageError(msg) => {
                msg.contains(UNIQUE_VIOLATION_SQLSTATE)
                    || msg.to_lowercase().contains("duplicate key")
            }
            _ => false,
        }
    }
}

// Implement the From trait for &str
impl From<&str> for GraphError {
    fn from(error: &str) -> Self {
        GraphError::InvalidRequest(error.to_string())
    }
}

impl From<SerdeJsonError> for GraphError {
    fn from(err: SerdeJsonError) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            GraphError::DeserializationError(format!("JSON decode error: {}", err))
        } else {
            GraphError::SerializationError(format!("JSON serialization error: {}", err))
        }
    }
}

impl From<AnyhowError> for GraphError {
    fn from(err: AnyhowError) -> Self {
        GraphError::StorageError(format!("Underlying storage operation failed: {}", err))
    }
}

impl From<io::Error> for GraphError {
    fn from(err: io::Error) -> Self {
        GraphError::Io(format!("IO error: {}", err))
    }
}

impl From<UuidError> for GraphError {
    fn from(err: UuidError) -> Self {
        GraphError::Uuid(format!("UUID error: {}", err))
    }
}

impl From<ValidationError> for GraphError {
    fn from(err: ValidationError) -> Self {
        GraphError::Validation(err)
    }
}

#[derive(Debug, Serialize, Deserialize, Error, PartialEq, Clone)]
pub enum ValidationError {
    #[error("identifier '{0}' is invalid")]
    InvalidIdentifier(String),
    #[error("confidence {0} is outside the range [0, 1]")]
    ConfidenceOutOfRange(f64),
    #[error("rule priority {0} is outside the range [1, 10]")]
    PriorityOutOfRange(u8),
    #[error("pathway '{template}' references unknown step '{step}'")]
    UnknownStep { template: String, step: String },
    #[error("pathway '{0}' is defined more than once")]
    DuplicateTemplate(String),
    #[error("pathway '{template}' defines step '{step}' more than once")]
    DuplicateStep { template: String, step: String },
}

/// A type alias for a `Result` that returns a `GraphError` on failure.
pub type GraphResult<T> = Result<T, GraphError>;

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;
