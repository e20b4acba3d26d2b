use std::sync::Arc;

use chrono::Utc;
use shared::{
    domain::{EncodedImage, VisitForm, VisitorId, VisitorRecord},
    error::ValidationError,
    protocol::SinkPayload,
};
use thiserror::Error;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{info, warn};

pub mod classifier;
pub mod config;
pub mod sink;

pub use classifier::{GeminiClassifier, OfflineClassifier, VisitClassifier};
pub use config::{load_settings, Settings};
pub use sink::{HttpSink, RemoteSink, SinkError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Classifying,
    Forwarding,
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    SubmissionStage(SubmissionStage),
    SinkFailed { visitor_id: VisitorId, reason: String },
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, Default)]
pub struct VisitSubmission {
    pub form: VisitForm,
    pub photo: Option<EncodedImage>,
    pub signature: Option<EncodedImage>,
}

pub struct SubmissionOutcome {
    pub record: VisitorRecord,
    /// Background delivery to the remote sink, if forwarding is enabled.
    /// Dropping the handle does not cancel delivery.
    pub forwarding: Option<JoinHandle<()>>,
}

pub struct GuestbookService {
    classifier: Arc<dyn VisitClassifier>,
    sink: Option<Arc<dyn RemoteSink>>,
    events: broadcast::Sender<ClientEvent>,
}

impl GuestbookService {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let classifier: Arc<dyn VisitClassifier> = if settings.classifier_api_key.is_some() {
            Arc::new(GeminiClassifier::from_settings(settings)?)
        } else {
            warn!("no classifier credential configured; visits get the default message");
            Arc::new(OfflineClassifier)
        };
        let sink = HttpSink::from_settings(settings)?
            .map(|sink| Arc::new(sink) as Arc<dyn RemoteSink>);
        info!(
            cloud_forwarding = sink.is_some(),
            "guestbook service configured"
        );
        Ok(Self::new_with_dependencies(classifier, sink))
    }

    pub fn new_with_dependencies(
        classifier: Arc<dyn VisitClassifier>,
        sink: Option<Arc<dyn RemoteSink>>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            classifier,
            sink,
            events,
        }
    }

    pub fn cloud_forwarding_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Runs the submission sequence: validate, classify, build the record,
    /// then hand it to the sink without waiting for delivery.
    ///
    /// Must be called from within a tokio runtime when a sink is configured.
    pub async fn submit(
        &self,
        submission: VisitSubmission,
    ) -> Result<SubmissionOutcome, SubmitError> {
        submission.form.validate()?;
        let form = submission.form.trimmed();

        let _ = self
            .events
            .send(ClientEvent::SubmissionStage(SubmissionStage::Classifying));
        let classification = self.classifier.classify(&form.name, &form.purpose).await;

        let record = VisitorRecord::new(
            &form,
            submission.photo,
            submission.signature,
            classification,
            Utc::now(),
        );
        info!(
            visitor_id = %record.id,
            category = record.display_category(),
            has_photo = record.photo_image.is_some(),
            has_signature = record.signature_image.is_some(),
            "visit recorded"
        );

        let forwarding = self.sink.as_ref().map(|sink| {
            let _ = self
                .events
                .send(ClientEvent::SubmissionStage(SubmissionStage::Forwarding));
            spawn_forwarding(Arc::clone(sink), &record, self.events.clone())
        });

        Ok(SubmissionOutcome { record, forwarding })
    }
}

fn spawn_forwarding(
    sink: Arc<dyn RemoteSink>,
    record: &VisitorRecord,
    events: broadcast::Sender<ClientEvent>,
) -> JoinHandle<()> {
    let payload = SinkPayload::from(record);
    let visitor_id = record.id.clone();
    tokio::spawn(async move {
        match sink.send(&payload).await {
            Ok(()) => tracing::debug!(visitor_id = %visitor_id, "sink request sent"),
            Err(err) => {
                warn!(visitor_id = %visitor_id, "failed to forward visit to sink: {err}");
                let _ = events.send(ClientEvent::SinkFailed {
                    visitor_id,
                    reason: err.to_string(),
                });
            }
        }
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
