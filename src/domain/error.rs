use serde::{Deserialize, Serialize};
use std::fmt;

/// Error surface shared by every layer. Variants carry a message that
/// ends up verbatim in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    NotFound(String),
    ValidationError(String),
    ParseError(String),
    Unauthorized(String),
    Conflict(String),
    DatabaseError(String),
    StorageError(String),
    IoError(String),
}

impl AppError {
    fn prefix(&self) -> &'static str {
        match self {
            AppError::Internal(_) => "Internal error",
            AppError::NotFound(_) => "Not found",
            AppError::ValidationError(_) => "Validation error",
            AppError::ParseError(_) => "Parse error",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Conflict(_) => "Conflict",
            AppError::DatabaseError(_) => "Database error",
            AppError::StorageError(_) => "Storage error",
            AppError::IoError(_) => "IO error",
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::Internal(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg)
            | AppError::ParseError(msg)
            | AppError::Unauthorized(msg)
            | AppError::Conflict(msg)
            | AppError::DatabaseError(msg)
            | AppError::StorageError(msg)
            | AppError::IoError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.prefix(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
