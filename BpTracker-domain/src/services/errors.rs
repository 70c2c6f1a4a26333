use bp_tracker_data::storage::StorageError;
use thiserror::Error;
use validator::ValidationErrors;

/// Tracker service errors
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Input failed validation; nothing was changed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("Reading not found: {0}")]
    NotFound(String),

    /// A capability switched off by configuration
    #[error("Feature disabled: {0}")]
    FeatureDisabled(&'static str),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// No id above the largest stored one is left
    #[error("No reading ids left")]
    IdsExhausted,
}

impl From<ValidationErrors> for TrackerError {
    fn from(errors: ValidationErrors) -> Self {
        TrackerError::Validation(validation_message(&errors))
    }
}

/// Flatten validator output into "field: message; field: message"
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    fields
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect::<Vec<String>>()
        .join("; ")
}
