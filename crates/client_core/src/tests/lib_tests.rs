use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use shared::domain::{Classification, DEFAULT_CATEGORY};
use storage::{decode_visitors, KeyValueStore, MemoryStore, VisitorBook, VISITORS_KEY};
use tokio::sync::{oneshot, Mutex};

struct CountingClassifier {
    calls: Arc<AtomicUsize>,
    reply: Classification,
}

impl CountingClassifier {
    fn new(reply: Classification) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                reply,
            },
            calls,
        )
    }
}

#[async_trait]
impl VisitClassifier for CountingClassifier {
    async fn classify(&self, _name: &str, _purpose: &str) -> Classification {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

struct RecordingSink {
    calls: Arc<AtomicUsize>,
    delivered: Mutex<Option<oneshot::Sender<SinkPayload>>>,
    fail_with: Option<String>,
}

impl RecordingSink {
    fn ok() -> (Self, Arc<AtomicUsize>, oneshot::Receiver<SinkPayload>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = oneshot::channel();
        (
            Self {
                calls: calls.clone(),
                delivered: Mutex::new(Some(tx)),
                fail_with: None,
            },
            calls,
            rx,
        )
    }

    fn failing(reason: &str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            delivered: Mutex::new(None),
            fail_with: Some(reason.to_string()),
        }
    }
}

#[async_trait]
impl RemoteSink for RecordingSink {
    async fn send(&self, payload: &SinkPayload) -> Result<(), SinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.fail_with {
            let err = serde_json::from_str::<serde_json::Value>(reason).expect_err("invalid json");
            return Err(SinkError::Encode(err));
        }
        if let Some(tx) = self.delivered.lock().await.take() {
            let _ = tx.send(payload.clone());
        }
        Ok(())
    }
}

fn submission(name: &str, purpose: &str) -> VisitSubmission {
    VisitSubmission {
        form: VisitForm {
            name: name.to_string(),
            purpose: purpose.to_string(),
            ..VisitForm::default()
        },
        photo: None,
        signature: None,
    }
}

#[tokio::test]
async fn blank_required_fields_never_reach_classifier_or_sink() {
    let (classifier, classifier_calls) =
        CountingClassifier::new(Classification::new("Dinas", "unused"));
    let (sink, sink_calls, _rx) = RecordingSink::ok();
    let service =
        GuestbookService::new_with_dependencies(Arc::new(classifier), Some(Arc::new(sink)));
    let mut book = VisitorBook::open(MemoryStore::new()).expect("book");

    for (name, purpose) in [("", "Mengantar paket"), ("Budi", ""), ("  ", "  ")] {
        let result = service.submit(submission(name, purpose)).await;
        assert!(matches!(result, Err(SubmitError::Validation(_))));
        if let Ok(outcome) = result {
            book.prepend(outcome.record).expect("unreachable");
        }
    }

    assert_eq!(classifier_calls.load(Ordering::SeqCst), 0);
    assert_eq!(sink_calls.load(Ordering::SeqCst), 0);
    assert!(book.is_empty());
    assert!(book.store().get(VISITORS_KEY).expect("get").is_none());
}

#[tokio::test]
async fn offline_submission_without_media_records_default_category() {
    let service = GuestbookService::new_with_dependencies(Arc::new(OfflineClassifier), None);
    assert!(!service.cloud_forwarding_enabled());
    let mut book = VisitorBook::open(MemoryStore::new()).expect("book");
    let before = book.len();

    let outcome = service
        .submit(submission("Budi", "Mengantar paket"))
        .await
        .expect("submit");
    assert!(outcome.forwarding.is_none());

    let record = outcome.record;
    assert!(!record.id.as_str().is_empty());
    assert!(record.timestamp <= Utc::now());
    assert!(record.photo_image.is_none());
    assert!(record.signature_image.is_none());
    assert_eq!(record.category.as_deref(), Some(DEFAULT_CATEGORY));
    assert!(record
        .summary_message
        .as_deref()
        .is_some_and(|message| message.contains("Budi")));

    book.prepend(record.clone()).expect("prepend");
    assert_eq!(book.len(), before + 1);
    let persisted = book
        .store()
        .get(VISITORS_KEY)
        .expect("get")
        .expect("persisted list");
    assert_eq!(decode_visitors(&persisted).expect("decode"), vec![record]);
}

#[tokio::test]
async fn forwards_flat_payload_to_sink_in_background() {
    let (classifier, classifier_calls) =
        CountingClassifier::new(Classification::new("Paket/Kurir", "Terima kasih, Budi."));
    let (sink, sink_calls, delivered) = RecordingSink::ok();
    let service =
        GuestbookService::new_with_dependencies(Arc::new(classifier), Some(Arc::new(sink)));

    let mut sub = submission("Budi", "Mengantar paket");
    sub.signature = Some(EncodedImage::png(b"signature"));
    let outcome = service.submit(sub).await.expect("submit");

    outcome
        .forwarding
        .expect("forwarding task")
        .await
        .expect("forwarding task joined");
    let payload = delivered.await.expect("payload delivered");

    assert_eq!(classifier_calls.load(Ordering::SeqCst), 1);
    assert_eq!(sink_calls.load(Ordering::SeqCst), 1);
    assert_eq!(payload, SinkPayload::from(&outcome.record));
    assert_eq!(payload.category, "Paket/Kurir");
    assert_eq!(payload.photo_image, "");
    assert!(payload.signature_image.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn sink_failure_is_reported_without_failing_submission() {
    let service = GuestbookService::new_with_dependencies(
        Arc::new(OfflineClassifier),
        Some(Arc::new(RecordingSink::failing("{broken"))),
    );
    let mut events = service.subscribe_events();

    let outcome = service
        .submit(submission("Budi", "Mengantar paket"))
        .await
        .expect("submission still succeeds");
    outcome
        .forwarding
        .expect("forwarding task")
        .await
        .expect("joined");

    let mut failure = None;
    while let Ok(event) = events.try_recv() {
        if let ClientEvent::SinkFailed { visitor_id, reason } = event {
            failure = Some((visitor_id, reason));
        }
    }
    let (visitor_id, reason) = failure.expect("sink failure event");
    assert_eq!(visitor_id, outcome.record.id);
    assert!(reason.contains("encode"));
}

#[tokio::test]
async fn stages_are_announced_in_order() {
    let (sink, _calls, _rx) = RecordingSink::ok();
    let service =
        GuestbookService::new_with_dependencies(Arc::new(OfflineClassifier), Some(Arc::new(sink)));
    let mut events = service.subscribe_events();

    let outcome = service
        .submit(submission("Sari", "Rapat komite"))
        .await
        .expect("submit");
    if let Some(task) = outcome.forwarding {
        task.await.expect("joined");
    }

    let mut stages = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ClientEvent::SubmissionStage(stage) = event {
            stages.push(stage);
        }
    }
    assert_eq!(
        stages,
        [SubmissionStage::Classifying, SubmissionStage::Forwarding]
    );
}

#[test]
fn service_without_credential_or_sink_url_is_offline() {
    let settings = Settings {
        classifier_api_key: None,
        sink_url: None,
        cloud_forwarding_enabled: false,
        ..Settings::default()
    };
    let service = GuestbookService::from_settings(&settings).expect("service");
    assert!(!service.cloud_forwarding_enabled());
}
