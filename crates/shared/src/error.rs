use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Name,
    Purpose,
}

impl RequiredField {
    pub fn label(self) -> &'static str {
        match self {
            RequiredField::Name => "name",
            RequiredField::Purpose => "purpose",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field(s): {}", join_labels(.0))]
    MissingFields(Vec<RequiredField>),
}

impl ValidationError {
    pub fn missing_fields(&self) -> &[RequiredField] {
        match self {
            ValidationError::MissingFields(fields) => fields,
        }
    }

    /// Prompt shown to the visitor at the kiosk.
    pub fn user_message(&self) -> &'static str {
        "Nama dan Tujuan harus diisi!"
    }
}

fn join_labels(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageDataError {
    #[error("image data is not a data url")]
    NotDataUrl,
    #[error("image data url is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 image payload: {0}")]
    InvalidPayload(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_missing_field_in_message() {
        let err = ValidationError::MissingFields(vec![RequiredField::Name, RequiredField::Purpose]);
        assert_eq!(err.to_string(), "missing required field(s): name, purpose");
        assert_eq!(err.missing_fields().len(), 2);
    }
}
