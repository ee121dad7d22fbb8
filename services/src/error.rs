use sea_orm::DbErr;
use thiserror::Error;
use validator::ValidationErrors;

/// Failure taxonomy of the ticket workflow. Transport layers map these
/// onto their own response vocabulary; nothing here is retried.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(format_validation_errors(&errors))
    }
}

/// Flattens validator's nested error map into "field: message" pairs.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: invalid value"),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}
