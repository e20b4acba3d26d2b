//! Backend-to-UI events and error modeling for the kiosk controller.

use client_core::SubmissionStage;
use shared::{domain::VisitorRecord, error::ValidationError};

pub enum UiEvent {
    Info(String),
    StageChanged(SubmissionStage),
    VisitRecorded(Box<VisitorRecord>),
    SubmissionRejected(ValidationError),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Hardware,
    Transport,
    Storage,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Submission,
    Camera,
    Signature,
    CloudSync,
    LocalStorage,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("harus diisi")
            || message_lower.contains("required")
            || message_lower.contains("missing")
            || message_lower.contains("invalid")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("camera")
            || message_lower.contains("kamera")
            || message_lower.contains("permission")
            || message_lower.contains("signature surface")
        {
            UiErrorCategory::Hardware
        } else if message_lower.contains("failed to persist")
            || message_lower.contains("store file")
            || message_lower.contains("disk")
            || message_lower.contains("failed to write")
        {
            UiErrorCategory::Storage
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("sink")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Failures the visitor can ignore; the visit is already saved locally.
    pub fn is_background(&self) -> bool {
        self.context == UiErrorContext::CloudSync
    }
}
