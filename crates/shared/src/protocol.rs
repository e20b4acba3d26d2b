use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EncodedImage, VisitorRecord};

/// Flat record posted to the remote spreadsheet endpoint.
///
/// Image fields carry the data url, or an empty string when the visitor did
/// not capture one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkPayload {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub institution: String,
    pub phone: String,
    pub purpose: String,
    pub category: String,
    pub summary_message: String,
    pub photo_image: String,
    pub signature_image: String,
}

impl From<&VisitorRecord> for SinkPayload {
    fn from(record: &VisitorRecord) -> Self {
        let image = |image: &Option<EncodedImage>| {
            image
                .as_ref()
                .map(|image| image.as_data_url().to_string())
                .unwrap_or_default()
        };
        Self {
            timestamp: record.timestamp,
            name: record.name.clone(),
            institution: record.institution.clone(),
            phone: record.phone.clone(),
            purpose: record.purpose.clone(),
            category: record.display_category().to_string(),
            summary_message: record.summary_message.clone().unwrap_or_default(),
            photo_image: image(&record.photo_image),
            signature_image: image(&record.signature_image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Classification, VisitForm};

    #[test]
    fn absent_images_become_empty_strings() {
        let form = VisitForm {
            name: "Budi".to_string(),
            purpose: "Mengantar paket".to_string(),
            ..VisitForm::default()
        };
        let record = VisitorRecord::new(
            &form,
            None,
            Some(EncodedImage::png(b"sig")),
            Classification::new("Paket/Kurir", "Terima kasih"),
            Utc::now(),
        );

        let payload = SinkPayload::from(&record);
        assert_eq!(payload.photo_image, "");
        assert!(payload.signature_image.starts_with("data:image/png;base64,"));

        let json = serde_json::to_value(&payload).expect("json");
        let keys: Vec<_> = json.as_object().expect("object").keys().cloned().collect();
        for key in [
            "timestamp",
            "name",
            "institution",
            "phone",
            "purpose",
            "category",
            "summaryMessage",
            "photoImage",
            "signatureImage",
        ] {
            assert!(keys.iter().any(|k| k == key), "missing key {key}");
        }
        assert_eq!(keys.len(), 9);
    }
}
