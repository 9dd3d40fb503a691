/// Domain error taxonomy
///
/// Every operation exposed to the REST and GraphQL façades returns
/// [`ServiceError`]. Lower-level failures (storage, hashing, token signing)
/// are converted into exactly one of these kinds before they leave the
/// service layer, so no raw `sqlx` or `argon2` error crosses the boundary.
///
/// # Kinds
///
/// - `Validation`: malformed or missing input, recoverable by resubmitting
/// - `Conflict`: duplicate unique field on registration
/// - `AuthenticationRequired`: no usable principal on the request
/// - `AuthenticationFailed`: bad credentials (same for unknown identifier)
/// - `NotFound`: entity absent or not owned by the caller
/// - `Internal`: unexpected infrastructure failure
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::store::StoreError;

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Error returned by every service operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Input failed validation
    #[error("Validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    /// A unique field is already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No authenticated principal on the request
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Credentials did not match
    #[error("Invalid email/username or password")]
    AuthenticationFailed,

    /// Entity missing or owned by someone else
    #[error("{0}")]
    NotFound(String),

    /// Infrastructure failure; the message is logged, never returned
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ServiceError {
    /// Shorthand for a single-field validation failure
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn task_not_found() -> Self {
        ServiceError::NotFound("Task not found".to_string())
    }

    pub fn identity_not_found() -> Self {
        ServiceError::NotFound("User not found".to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(what) => ServiceError::Conflict(what),
            StoreError::Backend(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        ServiceError::Internal(format!("Session token operation failed: {}", err))
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    FieldError::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    )
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ServiceError::Validation(details)
    }
}
