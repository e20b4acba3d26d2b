//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` for the backend worker. Returns `false` and fills `status`
/// when the queue cannot take it.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "Antrian penuh, silakan coba lagi.".to_string();
            tracing::warn!(command = cmd_name, "backend command queue is full");
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure)"
                    .to_string();
            tracing::error!(command = cmd_name, "backend command processor disconnected");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use client_core::VisitSubmission;
    use crossbeam_channel::bounded;

    fn submit() -> BackendCommand {
        BackendCommand::Submit(VisitSubmission::default())
    }

    #[test]
    fn queues_command_when_space_is_available() {
        let (tx, rx) = bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(&tx, submit(), &mut status));
        assert!(status.is_empty());
        assert!(matches!(rx.try_recv(), Ok(BackendCommand::Submit(_))));
    }

    #[test]
    fn reports_full_and_disconnected_queues() {
        let (tx, rx) = bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(&tx, submit(), &mut status));
        assert!(!dispatch_backend_command(&tx, submit(), &mut status));
        assert!(status.contains("penuh"));

        drop(rx);
        assert!(!dispatch_backend_command(&tx, submit(), &mut status));
        assert!(status.contains("disconnected"));
    }
}
