//! Visit classification: a short category plus a thank-you message for the
//! visitor, produced by a generative model when a credential is configured.
//!
//! `classify` never fails. Missing credentials and every kind of remote
//! failure map onto deterministic messages that still greet the visitor by
//! name.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::domain::{Classification, DEFAULT_CATEGORY};
use thiserror::Error;
use url::Url;

use crate::config::Settings;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[async_trait]
pub trait VisitClassifier: Send + Sync {
    async fn classify(&self, name: &str, purpose: &str) -> Classification;
}

pub fn fallback_without_credential(name: &str) -> Classification {
    Classification::new(
        DEFAULT_CATEGORY,
        format!("Terima kasih Bapak/Ibu {name} sudah berkunjung. Data Anda telah kami catat."),
    )
}

pub fn fallback_after_failure(name: &str, school_name: &str) -> Classification {
    Classification::new(
        DEFAULT_CATEGORY,
        format!("Terima kasih Bapak/Ibu {name} sudah berkunjung ke {school_name}."),
    )
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("classifier returned no text")]
    EmptyResponse,
    #[error("classifier returned malformed output: {0}")]
    Malformed(String),
}

/// Classifier used when no credential is configured.
pub struct OfflineClassifier;

#[async_trait]
impl VisitClassifier for OfflineClassifier {
    async fn classify(&self, name: &str, _purpose: &str) -> Classification {
        fallback_without_credential(name)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VisitAnalysis {
    #[serde(default)]
    category: Option<String>,
    message: String,
}

pub struct GeminiClassifier {
    http: Client,
    api_key: Option<String>,
    model: String,
    base_url: Url,
    school_name: String,
}

impl GeminiClassifier {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: Url,
        school_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.into(),
            base_url,
            school_name: school_name.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClassifierError> {
        Self::new(
            settings.classifier_api_key.clone(),
            settings.classifier_model.clone(),
            settings.classifier_base_url.clone(),
            settings.school_name.clone(),
            settings.classifier_timeout,
        )
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.as_str().trim_end_matches('/'),
            self.model
        )
    }

    fn prompt(&self, name: &str, purpose: &str) -> String {
        format!(
            "Seorang tamu bernama \"{name}\" berkunjung ke {school} dengan tujuan: \"{purpose}\".\n\n\
             Tugasmu:\n\
             1. Tentukan kategori kunjungan yang singkat (misalnya Dinas, Wali Murid, Paket/Kurir, Umum).\n\
             2. Buat pesan ucapan terima kasih yang sopan dan relevan dalam Bahasa Indonesia.\n\n\
             Output dalam format JSON.",
            school = self.school_name,
        )
    }

    async fn request_classification(
        &self,
        api_key: &str,
        name: &str,
        purpose: &str,
    ) -> Result<Classification, ClassifierError> {
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": self.prompt(name, purpose) }],
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "category": { "type": "STRING" },
                        "message": { "type": "STRING" },
                    },
                    "required": ["message"],
                },
            },
        });

        let response: GenerateContentResponse = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_generated_text(&response)
    }
}

fn parse_generated_text(response: &GenerateContentResponse) -> Result<Classification, ClassifierError> {
    let text: String = response
        .candidates
        .iter()
        .filter_map(|candidate| candidate.content.as_ref())
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| part.text.as_deref())
        .collect();
    if text.trim().is_empty() {
        return Err(ClassifierError::EmptyResponse);
    }

    let analysis: VisitAnalysis = serde_json::from_str(text.trim())
        .map_err(|err| ClassifierError::Malformed(err.to_string()))?;
    if analysis.message.trim().is_empty() {
        return Err(ClassifierError::Malformed("empty message".to_string()));
    }

    Ok(Classification::new(
        analysis.category.unwrap_or_default(),
        analysis.message.trim(),
    ))
}

#[async_trait]
impl VisitClassifier for GeminiClassifier {
    async fn classify(&self, name: &str, purpose: &str) -> Classification {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("no classifier credential configured; using default message");
            return fallback_without_credential(name);
        };

        match self.request_classification(api_key, name, purpose).await {
            Ok(classification) => {
                tracing::debug!(category = %classification.category, "visit classified");
                classification
            }
            Err(err) => {
                tracing::warn!(model = %self.model, "visit classification failed: {err}");
                fallback_after_failure(name, &self.school_name)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/classifier_tests.rs"]
mod tests;
