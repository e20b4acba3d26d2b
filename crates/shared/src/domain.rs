use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ImageDataError, RequiredField, ValidationError};

/// Category shown for visits the classifier did not label.
pub const DEFAULT_CATEGORY: &str = "Umum";

pub const PNG_MIME: &str = "image/png";
pub const JPEG_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(pub String);

impl VisitorId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A raster image carried as a `data:<mime>;base64,<payload>` url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{mime_type};base64,{}", STANDARD.encode(bytes)))
    }

    pub fn png(bytes: &[u8]) -> Self {
        Self::from_bytes(PNG_MIME, bytes)
    }

    pub fn jpeg(bytes: &[u8]) -> Self {
        Self::from_bytes(JPEG_MIME, bytes)
    }

    /// Wraps an existing data url without inspecting it.
    pub fn from_data_url(data_url: impl Into<String>) -> Self {
        Self(data_url.into())
    }

    pub fn as_data_url(&self) -> &str {
        &self.0
    }

    pub fn into_data_url(self) -> String {
        self.0
    }

    pub fn mime_type(&self) -> Option<&str> {
        let header = self.0.strip_prefix("data:")?.split(',').next()?;
        header.split(';').next().filter(|mime| !mime.is_empty())
    }

    pub fn decode(&self) -> Result<Vec<u8>, ImageDataError> {
        let rest = self.0.strip_prefix("data:").ok_or(ImageDataError::NotDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(ImageDataError::NotDataUrl)?;
        if !header.ends_with(";base64") {
            return Err(ImageDataError::NotBase64);
        }
        STANDARD
            .decode(payload)
            .map_err(|err| ImageDataError::InvalidPayload(err.to_string()))
    }
}

/// Free-text fields typed by the visitor before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitForm {
    pub name: String,
    pub institution: String,
    pub phone: String,
    pub purpose: String,
}

impl VisitForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push(RequiredField::Name);
        }
        if self.purpose.trim().is_empty() {
            missing.push(RequiredField::Purpose);
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            institution: self.institution.trim().to_string(),
            phone: self.phone.trim().to_string(),
            purpose: self.purpose.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: String,
    pub message: String,
}

impl Classification {
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        let category = category.into();
        let category = if category.trim().is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category.trim().to_string()
        };
        Self {
            category,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    pub id: VisitorId,
    pub timestamp: DateTime<Utc>,
    pub name: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub phone: String,
    pub purpose: String,
    #[serde(default, alias = "photoUrl")]
    pub photo_image: Option<EncodedImage>,
    #[serde(default, alias = "signatureUrl")]
    pub signature_image: Option<EncodedImage>,
    #[serde(default, alias = "aiCategory")]
    pub category: Option<String>,
    #[serde(default, alias = "aiSummary")]
    pub summary_message: Option<String>,
}

impl VisitorRecord {
    pub fn new(
        form: &VisitForm,
        photo_image: Option<EncodedImage>,
        signature_image: Option<EncodedImage>,
        classification: Classification,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let form = form.trimmed();
        Self {
            id: VisitorId::generate(),
            timestamp,
            name: form.name,
            institution: form.institution,
            phone: form.phone,
            purpose: form.purpose,
            photo_image,
            signature_image,
            category: Some(classification.category),
            summary_message: Some(classification.message),
        }
    }

    pub fn display_category(&self) -> &str {
        self.category
            .as_deref()
            .filter(|category| !category.trim().is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, purpose: &str) -> VisitForm {
        VisitForm {
            name: name.to_string(),
            purpose: purpose.to_string(),
            ..VisitForm::default()
        }
    }

    #[test]
    fn rejects_blank_name_and_purpose() {
        let err = form("  ", "").validate().expect_err("blank form");
        assert_eq!(
            err.missing_fields(),
            &[RequiredField::Name, RequiredField::Purpose]
        );
        assert!(form("Budi", "Mengantar paket").validate().is_ok());
    }

    #[test]
    fn encoded_image_round_trips_bytes_and_mime() {
        let image = EncodedImage::png(&[0x89, b'P', b'N', b'G']);
        assert!(image.as_data_url().starts_with("data:image/png;base64,"));
        assert_eq!(image.mime_type(), Some(PNG_MIME));
        assert_eq!(image.decode().expect("decode"), vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn encoded_image_rejects_non_data_urls() {
        let image = EncodedImage::from_data_url("https://example.org/photo.jpg");
        assert_eq!(image.decode(), Err(ImageDataError::NotDataUrl));
        assert_eq!(image.mime_type(), None);
    }

    #[test]
    fn record_takes_trimmed_fields_and_classifier_output() {
        let record = VisitorRecord::new(
            &form(" Budi ", " Mengantar paket "),
            None,
            None,
            Classification::new("", "Terima kasih"),
            Utc::now(),
        );
        assert_eq!(record.name, "Budi");
        assert_eq!(record.purpose, "Mengantar paket");
        assert_eq!(record.category.as_deref(), Some(DEFAULT_CATEGORY));
        assert!(!record.id.as_str().is_empty());
    }

    #[test]
    fn missing_category_displays_default() {
        let mut record = VisitorRecord::new(
            &form("Sari", "Rapat komite"),
            None,
            None,
            Classification::new("Wali Murid", "Terima kasih"),
            Utc::now(),
        );
        assert_eq!(record.display_category(), "Wali Murid");
        record.category = None;
        assert_eq!(record.display_category(), DEFAULT_CATEGORY);
    }

    #[test]
    fn legacy_field_names_deserialize() {
        let legacy = r#"{
            "id": "1717040000000",
            "timestamp": "2024-05-30T03:33:20.000Z",
            "name": "Budi",
            "institution": "",
            "phone": "0812",
            "purpose": "Mengantar paket",
            "photoUrl": null,
            "signatureUrl": "data:image/png;base64,AAAA",
            "aiSummary": "Terima kasih Bapak/Ibu Budi",
            "aiCategory": "Paket/Kurir"
        }"#;
        let record: VisitorRecord = serde_json::from_str(legacy).expect("legacy record");
        assert_eq!(record.id, VisitorId("1717040000000".to_string()));
        assert!(record.photo_image.is_none());
        assert_eq!(
            record.signature_image.as_ref().map(EncodedImage::as_data_url),
            Some("data:image/png;base64,AAAA")
        );
        assert_eq!(record.display_category(), "Paket/Kurir");

        let rewritten = serde_json::to_value(&record).expect("serialize");
        assert!(rewritten.get("summaryMessage").is_some());
        assert!(rewritten.get("aiSummary").is_none());
    }
}
