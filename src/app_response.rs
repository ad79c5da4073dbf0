use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::error::{EventError, StoreError, ValidationError};

/// JSON envelope returned across the C ABI.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    /// Not produced here: unknown note ids are silent no-ops. Kept so
    /// host-side decoders of the envelope stay unchanged.
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl From<StoreError> for AppResponse {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Corrupt { .. } | StoreError::Encode(_) =>
                AppResponse::SerializationError(err.to_string()),
            _ => AppResponse::DatabaseError(err.to_string()),
        }
    }
}

impl From<ValidationError> for AppResponse {
    fn from(err: ValidationError) -> Self {
        AppResponse::ValidationError(err.to_string())
    }
}

impl From<EventError> for AppResponse {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Validation(e) => e.into(),
            EventError::Storage(e) => e.into(),
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }
}
