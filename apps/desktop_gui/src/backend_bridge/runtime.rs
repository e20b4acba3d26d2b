//! Backend worker: owns the tokio runtime and the guestbook service, turning
//! queued commands into UI events.

use std::thread;

use client_core::{ClientEvent, GuestbookService, Settings, SubmitError};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    settings: Settings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("guestbook-backend")
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let service = match GuestbookService::from_settings(&settings) {
                Ok(service) => service,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: {err:#}"),
                    )));
                    tracing::error!("failed to configure guestbook service: {err:#}");
                    return;
                }
            };

            let mut events = service.subscribe_events();
            let ui_tx_events = ui_tx.clone();
            let event_task = tokio::spawn(async move {
                while let Ok(event) = events.recv().await {
                    let evt = match event {
                        ClientEvent::SubmissionStage(stage) => UiEvent::StageChanged(stage),
                        ClientEvent::SinkFailed { visitor_id, reason } => {
                            UiEvent::Error(UiError::from_message(
                                UiErrorContext::CloudSync,
                                format!("sink delivery for {visitor_id} failed: {reason}"),
                            ))
                        }
                    };
                    let _ = ui_tx_events.try_send(evt);
                }
            });

            let _ = ui_tx.try_send(UiEvent::Info(if service.cloud_forwarding_enabled() {
                "Backend worker ready".to_string()
            } else {
                "Backend worker ready (offline)".to_string()
            }));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Submit(submission) => match service.submit(submission).await {
                        Ok(outcome) => {
                            // Delivery continues after the handle is dropped.
                            drop(outcome.forwarding);
                            let _ = ui_tx.try_send(UiEvent::VisitRecorded(Box::new(
                                outcome.record,
                            )));
                        }
                        Err(SubmitError::Validation(err)) => {
                            let _ = ui_tx.try_send(UiEvent::SubmissionRejected(err));
                        }
                    },
                }
            }

            event_task.abort();
            tracing::info!("backend worker stopped");
        });
    })
}
